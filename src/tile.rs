//! Tile addressing and the GeoJSON-style envelope returned for a tile.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ZOOM_DEFAULT;

/// A slippy map tile in XYZ format. Values are handed to the database as-is;
/// no range checking happens here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoordinate {
    pub zoom: u8,
    pub x: i32,
    pub y: i32,
}

impl TileCoordinate {
    /// A tile at the default Soundscape zoom level.
    pub fn new(x: i32, y: i32) -> TileCoordinate {
        TileCoordinate::at_zoom(ZOOM_DEFAULT, x, y)
    }

    pub fn at_zoom(zoom: u8, x: i32, y: i32) -> TileCoordinate {
        TileCoordinate { zoom, x, y }
    }
}

/// One row of the tile query, keyed by column name in result column order.
pub type FeatureRow = Map<String, Value>;

/// `{"type": "FeatureCollection", "features": [...]}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<FeatureRow>,
}

impl FeatureCollection {
    pub fn new(features: Vec<FeatureRow>) -> FeatureCollection {
        FeatureCollection { features }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

impl From<Vec<FeatureRow>> for FeatureCollection {
    fn from(features: Vec<FeatureRow>) -> Self {
        FeatureCollection::new(features)
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use serde_json::json;

    use super::*;
    use crate::testing::feature;

    #[test]
    fn test_default_zoom() {
        let tile = TileCoordinate::new(10, 20);
        assert_eq!(ZOOM_DEFAULT, tile.zoom);
        assert_eq!(TileCoordinate::at_zoom(16, 10, 20), tile);
    }

    #[test]
    fn test_empty_collection_serializes_features_array() {
        let encoded = serde_json::to_value(FeatureCollection::default()).unwrap();
        assert_eq!(json!({"type": "FeatureCollection", "features": []}), encoded);
    }

    #[test]
    fn test_serialization_keeps_row_and_column_order() {
        let collection = FeatureCollection::from(vec![
            feature(json!({"name": "bench", "id": 1})),
            feature(json!({"name": "bell", "id": 2})),
        ]);

        let encoded = serde_json::to_string(&collection).unwrap();
        assert_eq!(
            r#"{"type":"FeatureCollection","features":[{"name":"bench","id":1},{"name":"bell","id":2}]}"#,
            encoded
        );
    }

    #[test]
    fn test_deserialize_feature_collection() {
        let data = r#"{
            "type": "FeatureCollection",
            "features": [
                {"feature_type": "highway", "geometry": {"type": "Point", "coordinates": [-122.3321, 47.6062]}}
            ]
        }"#;

        let collection: FeatureCollection = serde_json::from_str(data).unwrap();
        assert_eq!(1, collection.len());

        let lon = collection.features[0]["geometry"]["coordinates"][0]
            .as_f64()
            .unwrap();
        assert_approx_eq!(-122.3321, lon);
    }
}
