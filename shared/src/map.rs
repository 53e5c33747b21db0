//! Map catalog loading and platform layout.
//!
//! The catalog is a JSON document listing map variants. Each variant holds
//! two groups of platform templates whose offsets are applied relative to a
//! chosen origin when the map is built.

use crate::entity::{Rect, Vec2};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Size of a "small" platform template.
pub const SMALL_PLATFORM: (f64, f64) = (200.0, 100.0);
/// Size of a "large" platform template.
pub const LARGE_PLATFORM: (f64, f64) = (500.0, 100.0);

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed map catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map {selector} not found ({available} available)")]
    UnknownMap { selector: usize, available: usize },
}

/// Offset of one platform template from the map origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TemplateOffset {
    pub x: f64,
    pub y: f64,
}

/// One map variant as described in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescription {
    #[serde(default)]
    pub small_rects: Vec<TemplateOffset>,
    #[serde(default)]
    pub large_rects: Vec<TemplateOffset>,
}

/// Every map variant available to host and clients.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MapCatalog {
    pub maps: Vec<MapDescription>,
}

impl MapCatalog {
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses the catalog file once.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Lays out the selected variant's platforms around `origin`.
    ///
    /// Large platforms come first, then small ones, each in catalog order.
    pub fn build(&self, selector: usize, origin: Vec2) -> Result<Map, MapError> {
        let description = self.maps.get(selector).ok_or(MapError::UnknownMap {
            selector,
            available: self.maps.len(),
        })?;

        let large = description
            .large_rects
            .iter()
            .map(|offset| place(offset, origin, LARGE_PLATFORM));
        let small = description
            .small_rects
            .iter()
            .map(|offset| place(offset, origin, SMALL_PLATFORM));

        Ok(Map::new(origin, large.chain(small).collect()))
    }
}

fn place(offset: &TemplateOffset, origin: Vec2, (width, height): (f64, f64)) -> Rect {
    Rect::new(origin.x + offset.x, origin.y + offset.y, width, height)
}

/// Static platform layout for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub origin: Vec2,
    pub platforms: Vec<Rect>,
}

impl Map {
    pub fn new(origin: Vec2, platforms: Vec<Rect>) -> Self {
        Self { origin, platforms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "maps": [
            {
                "largeRects": [{"x": 0, "y": 50}, {"x": 700, "y": 50}],
                "smallRects": [{"x": 300, "y": -150}]
            },
            {
                "largeRects": [{"x": -250, "y": 0}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = MapCatalog::from_json_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.maps[0].large_rects.len(), 2);
        assert_eq!(catalog.maps[0].small_rects.len(), 1);
        assert!(catalog.maps[1].small_rects.is_empty());
    }

    #[test]
    fn test_build_places_templates_relative_to_origin() {
        let catalog = MapCatalog::from_json_str(CATALOG).unwrap();
        let map = catalog.build(0, Vec2::new(10.0, 20.0)).unwrap();

        assert_eq!(map.origin, Vec2::new(10.0, 20.0));
        assert_eq!(
            map.platforms,
            vec![
                Rect::new(10.0, 70.0, 500.0, 100.0),
                Rect::new(710.0, 70.0, 500.0, 100.0),
                Rect::new(310.0, -130.0, 200.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_unknown_selector() {
        let catalog = MapCatalog::from_json_str(CATALOG).unwrap();
        match catalog.build(5, Vec2::ZERO) {
            Err(MapError::UnknownMap {
                selector,
                available,
            }) => {
                assert_eq!(selector, 5);
                assert_eq!(available, 2);
            }
            other => panic!("Expected UnknownMap, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_catalog() {
        assert!(matches!(
            MapCatalog::from_json_str("{\"maps\": 3}"),
            Err(MapError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = MapCatalog::load("/definitely/not/here/maps.json");
        assert!(matches!(result, Err(MapError::Io(_))));
    }
}
