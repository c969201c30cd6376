//! Attribute → visual parameter mapping for flowers.

mod petal;
mod scale;

use std::collections::HashMap;

use eframe::egui::Color32;
use tracing::debug;

use crate::catalog::Entity;

pub use petal::PetalShape;
use scale::{LinearScale, OrdinalScale, QuantizeScale, extent};

/// Categories with a dedicated petal color, in palette order.
pub const KNOWN_CATEGORIES: [&str; 4] = ["Action", "Comedy", "Animation", "Drama"];
pub const PETAL_COLORS: [Color32; 4] = [
    Color32::from_rgb(0xff, 0xc8, 0xf0),
    Color32::from_rgb(0xcb, 0xf2, 0xbd),
    Color32::from_rgb(0xaf, 0xe9, 0xff),
    Color32::from_rgb(0xff, 0xb0, 0x9e),
];
pub const OVERFLOW_COLOR: Color32 = Color32::from_rgb(0xff, 0xf2, 0xb4);

const SCALE_RANGE: (f64, f64) = (0.2, 1.0);
const PETAL_COUNTS: [u8; 6] = [5, 6, 7, 8, 9, 10];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualEncoding {
    pub color: Color32,
    pub shape: PetalShape,
    /// In `[0.2, 1.0]` for well-formed ratings, NaN otherwise.
    pub scale: f32,
    /// In `5..=10`; zero when the vote count was malformed.
    pub petal_count: u8,
}

impl VisualEncoding {
    /// Used for entities the encoder never saw.
    pub fn fallback() -> Self {
        Self {
            color: OVERFLOW_COLOR,
            shape: PetalShape::ALL[0],
            scale: SCALE_RANGE.0 as f32,
            petal_count: PETAL_COUNTS[0],
        }
    }
}

/// Holds the dataset-wide statistics the per-entity encoding depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualEncoder {
    rating_extent: Option<(f64, f64)>,
    vote_extent: Option<(f64, f64)>,
}

impl VisualEncoder {
    pub fn new(entities: &[Entity]) -> Self {
        let rating_extent = extent(entities.iter().map(|entity| entity.rating));
        let vote_extent = extent(
            entities
                .iter()
                .filter_map(|entity| entity.votes.map(|votes| votes as f64)),
        );
        debug!(?rating_extent, ?vote_extent, "computed encoding extents");

        Self {
            rating_extent,
            vote_extent,
        }
    }

    /// Encodes every entity. Shape templates are handed out in the order rating
    /// codes first appear in `entities`, so callers pass the mapper's order.
    pub fn encode(&self, entities: &[Entity]) -> HashMap<String, VisualEncoding> {
        let undefined = (f64::NAN, f64::NAN);
        let mut color_scale =
            OrdinalScale::with_domain(KNOWN_CATEGORIES, PETAL_COLORS, OVERFLOW_COLOR);
        let mut shape_scale = OrdinalScale::implicit(PetalShape::ALL);
        let rating_scale = LinearScale::new(self.rating_extent.unwrap_or(undefined), SCALE_RANGE);
        let vote_scale = QuantizeScale::new(self.vote_extent.unwrap_or(undefined), PETAL_COUNTS);

        let mut encodings = HashMap::with_capacity(entities.len());
        for entity in entities {
            let color = entity
                .primary_category()
                .and_then(|category| color_scale.apply(&category))
                .unwrap_or(OVERFLOW_COLOR);
            let shape = shape_scale
                .apply(&entity.rating_code.as_str())
                .unwrap_or(PetalShape::ALL[0]);
            let petal_count = entity
                .votes
                .and_then(|votes| vote_scale.apply(votes as f64))
                .unwrap_or(0);

            encodings
                .entry(entity.title.clone())
                .or_insert(VisualEncoding {
                    color,
                    shape,
                    scale: rating_scale.apply(entity.rating) as f32,
                    petal_count,
                });
        }

        debug!(
            encoded = encodings.len(),
            rating_codes = shape_scale.domain_len(),
            "encoded entities"
        );
        encodings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(title: &str, categories: &[&str], rating: f64, votes: u64, code: &str) -> Entity {
        Entity {
            title: title.to_string(),
            release_date: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            rating,
            votes: Some(votes),
            rating_code: code.to_string(),
        }
    }

    fn fixture() -> Vec<Entity> {
        vec![
            entity("Heat", &["Action", "Crime"], 8.3, 600_000, "R"),
            entity("Up", &["Animation", "Comedy"], 5.0, 300_000, "PG"),
            entity("Amelie", &["Comedy", "Romance"], 1.0, 0, "R"),
            entity("Alien", &["Horror", "Sci-Fi"], 9.0, 450_000, "R"),
            entity("Babe", &["Family"], 6.1, 120_000, "G"),
            entity("Ran", &["Drama", "War"], 8.2, 110_000, "PG-13"),
            entity("Nameless", &[], 4.4, 12, "NR"),
        ]
    }

    #[test]
    fn scale_and_petals_stay_in_range() {
        let entities = fixture();
        let encodings = VisualEncoder::new(&entities).encode(&entities);

        assert_eq!(encodings.len(), entities.len());
        for encoding in encodings.values() {
            assert!((0.2..=1.0).contains(&encoding.scale), "{encoding:?}");
            assert!((5..=10).contains(&encoding.petal_count), "{encoding:?}");
        }
    }

    #[test]
    fn rating_maps_linearly_onto_scale() {
        let entities = fixture();
        let encoder = VisualEncoder::new(&entities);
        assert_eq!(encoder.rating_extent, Some((1.0, 9.0)));

        let encodings = encoder.encode(&entities);
        assert!((encodings["Up"].scale - 0.6).abs() < 1e-6);
        assert!((encodings["Amelie"].scale - 0.2).abs() < 1e-6);
        assert!((encodings["Alien"].scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn votes_quantize_into_petal_counts() {
        let entities = fixture();
        let encodings = VisualEncoder::new(&entities).encode(&entities);

        assert_eq!(encodings["Amelie"].petal_count, 5);
        assert_eq!(encodings["Up"].petal_count, 8);
        assert_eq!(encodings["Alien"].petal_count, 9);
        assert_eq!(encodings["Heat"].petal_count, 10);
    }

    #[test]
    fn primary_category_picks_the_color() {
        let entities = fixture();
        let encodings = VisualEncoder::new(&entities).encode(&entities);

        assert_eq!(encodings["Heat"].color, PETAL_COLORS[0]);
        assert_eq!(encodings["Amelie"].color, PETAL_COLORS[1]);
        assert_eq!(encodings["Up"].color, PETAL_COLORS[2]);
        assert_eq!(encodings["Ran"].color, PETAL_COLORS[3]);
        assert_eq!(encodings["Alien"].color, OVERFLOW_COLOR);
        assert_eq!(encodings["Nameless"].color, OVERFLOW_COLOR);
    }

    #[test]
    fn rating_codes_take_templates_in_first_seen_order() {
        let entities = fixture();
        let encodings = VisualEncoder::new(&entities).encode(&entities);

        assert_eq!(encodings["Heat"].shape, PetalShape::Round);
        assert_eq!(encodings["Up"].shape, PetalShape::Tulip);
        assert_eq!(encodings["Alien"].shape, PetalShape::Round);
        assert_eq!(encodings["Babe"].shape, PetalShape::Heart);
        assert_eq!(encodings["Ran"].shape, PetalShape::Almond);
        // Fifth distinct code wraps to the first template.
        assert_eq!(encodings["Nameless"].shape, PetalShape::Round);
    }

    #[test]
    fn identical_ratings_use_range_midpoint() {
        let entities = vec![
            entity("A", &["Drama"], 7.0, 10, "R"),
            entity("B", &["Drama"], 7.0, 20, "R"),
        ];
        let encodings = VisualEncoder::new(&entities).encode(&entities);
        assert!((encodings["A"].scale - 0.6).abs() < 1e-6);
    }

    #[test]
    fn malformed_values_degrade_visibly() {
        let mut entities = fixture();
        entities[1].rating = f64::NAN;
        entities[1].votes = None;

        let encodings = VisualEncoder::new(&entities).encode(&entities);
        assert!(encodings["Up"].scale.is_nan());
        assert_eq!(encodings["Up"].petal_count, 0);
        assert!((encodings["Heat"].scale - (0.2 + (8.3 - 1.0) / 8.0 * 0.8) as f32).abs() < 1e-6);
    }

    #[test]
    fn duplicate_titles_keep_first_encoding() {
        let entities = vec![
            entity("Twin", &["Action"], 2.0, 10, "R"),
            entity("Twin", &["Drama"], 8.0, 20, "PG"),
        ];
        let encodings = VisualEncoder::new(&entities).encode(&entities);
        assert_eq!(encodings.len(), 1);
        assert_eq!(encodings["Twin"].color, PETAL_COLORS[0]);
    }
}
