//! Places a starting eleven on the pitch diagram.
//!
//! A formation string such as "4-3-3" describes the outfield rows only; the
//! keeper is implicit and always occupies a row of his own in front of the
//! goal. Coordinates are percentages of the rendered pitch rectangle, so the
//! same layout drives any surface that can scale a pair of percentages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::PlayerSlot;

/// Why no layout could be produced. Both conditions are recoverable: callers
/// render a "lineup not available" placeholder instead of the pitch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("malformed formation string {0:?}")]
    MalformedFormation(String),
    #[error("no lineup available")]
    NoLineupAvailable,
}

/// Outfield row sizes parsed from a formation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormationSpec {
    rows: Vec<usize>,
}

/// Placement of one starting player: layout row (0 is the keeper row), slot
/// within the row, and the row's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    pub row: usize,
    pub slot: usize,
    pub row_size: usize,
}

/// Position on the pitch diagram as (top%, left%) of the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub top: f32,
    pub left: f32,
}

/// Computed layout for one side: the formation label plus a coordinate per
/// placed starting-eleven ordinal. Ordinals beyond the formation's capacity
/// are absent (providers occasionally append substitutes to the list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchLayout {
    pub formation: String,
    pub coordinates: BTreeMap<usize, Coordinate>,
}

impl FormationSpec {
    /// Parse a `-`-separated formation string. Every segment must be a
    /// positive integer; anything else is malformed.
    pub fn parse(raw: &str) -> Result<Self, LayoutError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::MalformedFormation(raw.to_string()));
        }
        let mut rows = Vec::new();
        for segment in trimmed.split('-') {
            let size = segment
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| LayoutError::MalformedFormation(raw.to_string()))?;
            rows.push(size);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Outfield capacity; the keeper sits on top of this.
    pub fn outfield_capacity(&self) -> usize {
        self.rows.iter().sum()
    }

    /// Layout rows including the keeper row.
    pub fn total_rows(&self) -> usize {
        self.rows.len() + 1
    }

    /// Placement for a flat starting-eleven ordinal. Index 0 is always the
    /// keeper. Indices past the formation's capacity get no placement.
    pub fn slot_for(&self, index: usize) -> Option<RowSlot> {
        if index == 0 {
            return Some(RowSlot {
                row: 0,
                slot: 0,
                row_size: 1,
            });
        }
        let p = index - 1;
        let mut cursor = 0usize;
        for (i, size) in self.rows.iter().enumerate() {
            if p < cursor + size {
                return Some(RowSlot {
                    row: i + 1,
                    slot: p - cursor,
                    row_size: *size,
                });
            }
            cursor += size;
        }
        None
    }
}

/// Lay out a starting eleven. A blank formation or an empty starting list is
/// reported as `NoLineupAvailable`; a present-but-unparseable formation as
/// `MalformedFormation`. Players beyond the formation's capacity are dropped
/// from the layout rather than treated as an error.
pub fn layout_lineup(formation: &str, starting: &[PlayerSlot]) -> Result<PitchLayout, LayoutError> {
    if formation.trim().is_empty() || starting.is_empty() {
        return Err(LayoutError::NoLineupAvailable);
    }
    let spec = FormationSpec::parse(formation)?;
    let total_rows = spec.total_rows();

    let mut coordinates = BTreeMap::new();
    for index in 0..starting.len() {
        if let Some(slot) = spec.slot_for(index) {
            coordinates.insert(index, coordinate_for(slot, total_rows));
        }
    }

    Ok(PitchLayout {
        formation: formation.trim().to_string(),
        coordinates,
    })
}

/// Vertical spacing keeps a 10% margin at each edge; the keeper row lands
/// near one edge and the last outfield row near the other.
fn coordinate_for(slot: RowSlot, total_rows: usize) -> Coordinate {
    let top = (slot.row as f32 * 120.0) / (total_rows as f32 + 1.0) + 10.0;
    let left = match slot.row_size {
        1 => 50.0,
        2 => {
            if slot.slot == 0 {
                30.0
            } else {
                70.0
            }
        }
        3 => 20.0 + slot.slot as f32 * 30.0,
        4 => 15.0 + slot.slot as f32 * 23.33,
        // Rows of 5+ never occur in the provider's formation strings but must
        // not crash: spread evenly over the same band the size-4 table uses.
        size => 15.0 + slot.slot as f32 * (70.0 / (size as f32 - 1.0)),
    };
    Coordinate {
        top: top.clamp(0.0, 100.0),
        left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_formations() {
        assert_eq!(FormationSpec::parse("4-3-3").unwrap().rows(), &[4, 3, 3]);
        assert_eq!(
            FormationSpec::parse("4-2-3-1").unwrap().rows(),
            &[4, 2, 3, 1]
        );
        assert_eq!(FormationSpec::parse(" 3-5-2 ").unwrap().rows(), &[3, 5, 2]);
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "  ", "4-x-3", "4--3", "-4-3", "4-3-", "4.5-3"] {
            assert!(
                matches!(
                    FormationSpec::parse(raw),
                    Err(LayoutError::MalformedFormation(_))
                ),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_zero_rows() {
        assert!(FormationSpec::parse("4-0-3").is_err());
    }

    #[test]
    fn keeper_is_always_row_zero() {
        let spec = FormationSpec::parse("4-4-2").unwrap();
        let slot = spec.slot_for(0).unwrap();
        assert_eq!(slot.row, 0);
        assert_eq!(slot.slot, 0);
        assert_eq!(slot.row_size, 1);
    }

    #[test]
    fn outfield_indices_walk_rows_in_order() {
        let spec = FormationSpec::parse("4-4-2").unwrap();
        // Indices 1..=4 are the back four.
        for i in 1..=4 {
            let slot = spec.slot_for(i).unwrap();
            assert_eq!(slot.row, 1);
            assert_eq!(slot.slot, i - 1);
            assert_eq!(slot.row_size, 4);
        }
        // Index 9 is the first of the front two.
        let slot = spec.slot_for(9).unwrap();
        assert_eq!(slot.row, 3);
        assert_eq!(slot.slot, 0);
        assert_eq!(slot.row_size, 2);
    }

    #[test]
    fn overflow_indices_have_no_placement() {
        let spec = FormationSpec::parse("4-4-2").unwrap();
        assert_eq!(spec.outfield_capacity(), 10);
        assert!(spec.slot_for(10).is_some());
        assert!(spec.slot_for(11).is_none());
        assert!(spec.slot_for(20).is_none());
    }

    #[test]
    fn single_slot_rows_are_centered() {
        let spec = FormationSpec::parse("4-4-1-1").unwrap();
        let total = spec.total_rows();
        for index in [9, 10] {
            let slot = spec.slot_for(index).unwrap();
            assert_eq!(slot.row_size, 1);
            assert_eq!(coordinate_for(slot, total).left, 50.0);
        }
    }

    #[test]
    fn wide_rows_spread_across_the_band() {
        let slot = |s| RowSlot {
            row: 1,
            slot: s,
            row_size: 5,
        };
        let first = coordinate_for(slot(0), 4);
        let last = coordinate_for(slot(4), 4);
        assert_eq!(first.left, 15.0);
        assert_eq!(last.left, 85.0);
    }

    #[test]
    fn top_is_clamped_for_degenerate_row_counts() {
        let spec = FormationSpec::parse("1-1-1-1-1-1-1-1-1-1").unwrap();
        let total = spec.total_rows();
        let slot = spec.slot_for(10).unwrap();
        let coord = coordinate_for(slot, total);
        assert!(coord.top <= 100.0);
    }
}
