//! Minimum-weight perfect matching over the odd-degree vertex set.
//!
//! Odd sets are small on neighbourhood-scale street graphs, so up to
//! [`MAX_EXACT_MATCHING`](crate::MAX_EXACT_MATCHING) vertices the matching
//! is solved exactly by branch-and-bound enumeration; larger sets fall back
//! to a greedy sorted-pairs approximation.

use crate::{Error, MAX_EXACT_MATCHING};

/// Compute a perfect matching over `weights.len()` vertices, given the full
/// pairwise weight matrix. Returns index pairs `(i, j)` with `i < j`
/// covering every vertex exactly once.
///
/// # Errors
///
/// `OddCardinality` when the vertex count is odd. A finite undirected graph
/// always has an even number of odd-degree vertices, so this indicates a
/// malformed input graph.
pub(crate) fn min_weight_matching(weights: &[Vec<f64>]) -> Result<Vec<(usize, usize)>, Error> {
    let k = weights.len();
    if k % 2 != 0 {
        return Err(Error::OddCardinality(k));
    }
    match k {
        0 => Ok(Vec::new()),
        2 => Ok(vec![(0, 1)]),
        _ if k <= MAX_EXACT_MATCHING => Ok(exact_matching(weights)),
        _ => Ok(greedy_matching(weights)),
    }
}

/// Branch-and-bound enumeration of all perfect matchings.
///
/// Fixes the lowest-indexed unmatched vertex and tries each partner in
/// ascending order; partial matchings whose cost already reaches the best
/// complete matching are pruned. The first discovered optimum wins ties.
fn exact_matching(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let k = weights.len();
    let mut matched = vec![false; k];
    let mut current = Vec::with_capacity(k / 2);
    let mut best = Vec::new();
    let mut best_cost = f64::INFINITY;
    search(weights, &mut matched, &mut current, 0.0, &mut best, &mut best_cost);
    best
}

fn search(
    weights: &[Vec<f64>],
    matched: &mut [bool],
    current: &mut Vec<(usize, usize)>,
    cost: f64,
    best: &mut Vec<(usize, usize)>,
    best_cost: &mut f64,
) {
    let Some(i) = matched.iter().position(|&m| !m) else {
        // Complete matching; strict improvement keeps the first optimum.
        if cost < *best_cost {
            *best_cost = cost;
            *best = current.clone();
        }
        return;
    };

    matched[i] = true;
    for j in i + 1..matched.len() {
        if matched[j] {
            continue;
        }
        let next_cost = cost + weights[i][j];
        if next_cost >= *best_cost {
            continue;
        }
        matched[j] = true;
        current.push((i, j));
        search(weights, matched, current, next_cost, best, best_cost);
        current.pop();
        matched[j] = false;
    }
    matched[i] = false;
}

/// Greedy approximation: scan all pairs by ascending weight and commit a
/// pair whenever both endpoints are still unmatched.
fn greedy_matching(weights: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let k = weights.len();
    let mut pairs: Vec<(usize, usize)> = (0..k)
        .flat_map(|i| (i + 1..k).map(move |j| (i, j)))
        .collect();
    pairs.sort_by(|&(ai, aj), &(bi, bj)| {
        weights[ai][aj]
            .total_cmp(&weights[bi][bj])
            .then_with(|| (ai, aj).cmp(&(bi, bj)))
    });

    let mut matched = vec![false; k];
    let mut result = Vec::with_capacity(k / 2);
    for (i, j) in pairs {
        if matched[i] || matched[j] {
            continue;
        }
        matched[i] = true;
        matched[j] = true;
        result.push((i, j));
        if result.len() == k / 2 {
            break;
        }
    }
    result
}
