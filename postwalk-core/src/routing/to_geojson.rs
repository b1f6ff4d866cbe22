//! GeoJSON export of computed routes.

use geojson::{Feature, FeatureCollection, Geometry};
use serde_json::json;

use crate::instructions::Instruction;
use crate::routing::RouteResult;
use crate::Error;

impl RouteResult {
    /// Convert the route to a `GeoJSON` `FeatureCollection`: one line
    /// feature for the walk geometry followed by one point feature per
    /// instruction.
    ///
    /// # Errors
    ///
    /// `GeoJsonError` when a feature fails to assemble.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.instructions.len() + 1);
        features.push(self.path_feature()?);
        for (idx, instruction) in self.instructions.iter().enumerate() {
            features.push(instruction_feature(instruction, idx)?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    /// Convert the route to a `GeoJSON` string; empty on failure.
    pub fn to_geojson_string(&self) -> String {
        self.to_geojson()
            .ok()
            .and_then(|collection| serde_json::to_string(&collection).ok())
            .unwrap_or_default()
    }

    /// Route polyline feature with the summary properties recognised by
    /// the route store.
    fn path_feature(&self) -> Result<Feature, Error> {
        let value = json!({
            "type": "Feature",
            "geometry": Geometry::new((&self.path).into()),
            "properties": {
                "total_distance_m": self.total_distance,
                "original_distance_m": self.original_distance,
                "traversal_count": self.edge_order.len(),
                "duplicate_edge_count": self.duplicate_edges.len(),
                "unreached_edge_count": self.unreached_edges.len(),
            }
        });
        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

/// Converts an instruction to a `GeoJSON` point Feature.
fn instruction_feature(instruction: &Instruction, idx: usize) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new((&instruction.location).into()),
        "properties": {
            "index": idx,
            "kind": instruction.kind.as_str(),
            "street_name": instruction.street_name,
            "distance_m": instruction.distance,
            "bearing": instruction.bearing,
        }
    });
    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::model::StreetGraphBuilder;
    use crate::routing::solve;
    use geo::{line_string, Point};

    #[test]
    fn feature_per_instruction_plus_path() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(1, Point::new(0.0, 0.0)).unwrap();
        b.add_node(2, Point::new(0.0, 0.001)).unwrap();
        b.add_edge(
            1,
            2,
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.001)],
            Some("Harbour Road".to_string()),
        )
        .unwrap();
        let g = b.build();
        let result = solve(&g, Some(1)).unwrap();

        let collection = result.to_geojson().unwrap();
        assert_eq!(collection.features.len(), result.instructions.len() + 1);

        let text = result.to_geojson_string();
        assert!(text.contains("\"FeatureCollection\""));
        assert!(text.contains("Harbour Road"));
        assert!(text.contains("u_turn"));
    }
}
