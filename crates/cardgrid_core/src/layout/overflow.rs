//! Content overflow warnings for rendered cards.
//!
//! Warnings are advisory. Nothing here mutates cards or blocks an edit.

use crate::model::card::{Card, CardId};
use serde::{Deserialize, Serialize};

/// Measured content may exceed its box by this much before a warning fires.
pub const OVERFLOW_TOLERANCE_PX: f64 = 1.0;

/// Rendered canvas cell geometry in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
}

/// Intrinsic content size reported by the host for one card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentMeasurement {
    pub card_id: CardId,
    pub content_width: f64,
    pub content_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverflowWarning {
    pub card_id: CardId,
    pub horizontal: bool,
    pub vertical: bool,
    pub overflow_x_px: f64,
    pub overflow_y_px: f64,
}

/// Pixel length covered by `span` cells including the gaps between them.
pub fn allocated_length(span: u32, cell: f64, gap: f64) -> f64 {
    let span = f64::from(span.max(1));
    span * cell + (span - 1.0) * gap
}

/// Returns one warning per measured card whose content does not fit its box.
///
/// Measurements for unknown cards and non-finite sizes are ignored. Output
/// follows the order of `measurements`.
pub fn detect_overflow(
    cards: &[Card],
    geometry: CanvasGeometry,
    measurements: &[ContentMeasurement],
) -> Vec<OverflowWarning> {
    measurements
        .iter()
        .filter(|m| m.content_width.is_finite() && m.content_height.is_finite())
        .filter_map(|m| {
            let card = cards.iter().find(|card| card.id == m.card_id)?;
            let width = allocated_length(card.column_span, geometry.cell_width, geometry.gap);
            let height = allocated_length(card.row_span, geometry.cell_height, geometry.gap);
            let overflow_x = (m.content_width - width).max(0.0);
            let overflow_y = (m.content_height - height).max(0.0);
            let horizontal = overflow_x > OVERFLOW_TOLERANCE_PX;
            let vertical = overflow_y > OVERFLOW_TOLERANCE_PX;
            (horizontal || vertical).then_some(OverflowWarning {
                card_id: card.id,
                horizontal,
                vertical,
                overflow_x_px: overflow_x,
                overflow_y_px: overflow_y,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{allocated_length, detect_overflow, CanvasGeometry, ContentMeasurement};
    use crate::model::card::Card;
    use uuid::Uuid;

    const GEOMETRY: CanvasGeometry = CanvasGeometry {
        cell_width: 100.0,
        cell_height: 50.0,
        gap: 10.0,
    };

    #[test]
    fn allocated_length_counts_inner_gaps() {
        assert_eq!(allocated_length(1, 100.0, 10.0), 100.0);
        assert_eq!(allocated_length(3, 100.0, 10.0), 320.0);
        assert_eq!(allocated_length(0, 100.0, 10.0), 100.0);
    }

    #[test]
    fn warns_per_axis_beyond_tolerance() {
        let card = Card::new("Budget", 2, 2);
        let fits = ContentMeasurement {
            card_id: card.id,
            content_width: 210.5,
            content_height: 110.0,
        };
        assert!(detect_overflow(&[card.clone()], GEOMETRY, &[fits]).is_empty());

        let tall = ContentMeasurement {
            card_id: card.id,
            content_width: 100.0,
            content_height: 150.0,
        };
        let warnings = detect_overflow(&[card.clone()], GEOMETRY, &[tall]);
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].horizontal);
        assert!(warnings[0].vertical);
        assert_eq!(warnings[0].overflow_y_px, 40.0);
    }

    #[test]
    fn ignores_unknown_cards_and_bad_measurements() {
        let card = Card::new("Team", 1, 1);
        let measurements = [
            ContentMeasurement {
                card_id: Uuid::new_v4(),
                content_width: 999.0,
                content_height: 999.0,
            },
            ContentMeasurement {
                card_id: card.id,
                content_width: f64::INFINITY,
                content_height: 10.0,
            },
        ];
        assert!(detect_overflow(&[card], GEOMETRY, &measurements).is_empty());
    }
}
