use std::collections::BTreeMap;

use pitchside::formation::{FormationSpec, LayoutError, layout_lineup};
use pitchside::state::PlayerSlot;

fn players(count: usize) -> Vec<PlayerSlot> {
    (0..count)
        .map(|i| PlayerSlot {
            id: Some(i as u32 + 1),
            name: format!("Player {}", i + 1),
            number: Some(i as u32 + 1),
            pos: None,
        })
        .collect()
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn four_three_three_places_every_row() {
    let layout = layout_lineup("4-3-3", &players(11)).expect("valid lineup");
    assert_eq!(layout.formation, "4-3-3");
    assert_eq!(layout.coordinates.len(), 11);

    // Keeper: centered, top margin row.
    let keeper = layout.coordinates[&0];
    assert_close(keeper.top, 10.0);
    assert_close(keeper.left, 50.0);

    // Back four at top 34, spread over the wide band.
    let expected_left = [15.0, 38.33, 61.66, 84.99];
    for (offset, expected) in expected_left.iter().enumerate() {
        let coord = layout.coordinates[&(1 + offset)];
        assert_close(coord.top, 34.0);
        assert_close(coord.left, *expected);
    }

    // Midfield three and front three at 20/50/80.
    for (row_start, expected_top) in [(5usize, 58.0f32), (8, 82.0)] {
        for offset in 0..3 {
            let coord = layout.coordinates[&(row_start + offset)];
            assert_close(coord.top, expected_top);
            assert_close(coord.left, 20.0 + offset as f32 * 30.0);
        }
    }
}

#[test]
fn empty_formation_reports_no_lineup() {
    assert_eq!(
        layout_lineup("", &players(11)).unwrap_err(),
        LayoutError::NoLineupAvailable
    );
    assert_eq!(
        layout_lineup("   ", &players(11)).unwrap_err(),
        LayoutError::NoLineupAvailable
    );
}

#[test]
fn empty_roster_reports_no_lineup() {
    assert_eq!(
        layout_lineup("4-3-3", &[]).unwrap_err(),
        LayoutError::NoLineupAvailable
    );
}

#[test]
fn unreadable_formation_reports_malformed() {
    let err = layout_lineup("4-x-3", &players(11)).unwrap_err();
    assert!(matches!(err, LayoutError::MalformedFormation(_)));
}

#[test]
fn extra_players_are_dropped_without_error() {
    let layout = layout_lineup("4-4-2", &players(13)).expect("valid lineup");
    assert_eq!(layout.coordinates.len(), 11);
    assert!(layout.coordinates.contains_key(&10));
    assert!(!layout.coordinates.contains_key(&11));
    assert!(!layout.coordinates.contains_key(&12));
}

#[test]
fn short_roster_places_what_it_has() {
    let layout = layout_lineup("4-3-3", &players(6)).expect("valid lineup");
    assert_eq!(layout.coordinates.len(), 6);
}

#[test]
fn layout_is_idempotent() {
    let roster = players(11);
    let first = layout_lineup("4-2-3-1", &roster).expect("valid lineup");
    let second = layout_lineup("4-2-3-1", &roster).expect("valid lineup");
    assert_eq!(first, second);
}

#[test]
fn no_two_players_share_a_spot_within_a_row() {
    for formation in ["4-3-3", "4-4-2", "3-5-2", "4-2-3-1", "5-4-1", "4-1-4-1"] {
        let layout = layout_lineup(formation, &players(11)).expect("valid lineup");
        assert_eq!(layout.coordinates.len(), 11, "formation {formation}");

        let mut rows: BTreeMap<i64, Vec<f32>> = BTreeMap::new();
        for coord in layout.coordinates.values() {
            rows.entry((coord.top * 100.0) as i64)
                .or_default()
                .push(coord.left);
        }
        for (top, lefts) in rows {
            let mut sorted = lefts.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sorted.dedup();
            assert_eq!(
                sorted.len(),
                lefts.len(),
                "duplicate left% in {formation} at top {top}"
            );
        }
    }
}

#[test]
fn single_slot_rows_stack_down_the_middle() {
    let layout = layout_lineup("4-4-1-1", &players(11)).expect("valid lineup");
    let ten = layout.coordinates[&9];
    let striker = layout.coordinates[&10];
    assert_close(ten.left, 50.0);
    assert_close(striker.left, 50.0);
    assert!(striker.top > ten.top, "rows must descend the pitch in order");
}

#[test]
fn parser_accepts_digit_dash_strings() {
    for (raw, segments) in [("4", 1), ("4-4-2", 3), ("4-2-3-1", 4), ("10-1", 2)] {
        let spec = FormationSpec::parse(raw).expect("parseable");
        assert_eq!(spec.rows().len(), segments, "formation {raw}");
        assert!(spec.rows().iter().all(|n| *n > 0));
    }
}

#[test]
fn coordinates_stay_in_percentage_range() {
    for formation in ["4-3-3", "3-5-2", "1-1-1-1-1-1-1-1-1-1", "9-1"] {
        let layout = layout_lineup(formation, &players(11)).expect("valid lineup");
        for coord in layout.coordinates.values() {
            assert!((0.0..=100.0).contains(&coord.top), "top {}", coord.top);
            assert!((0.0..=100.0).contains(&coord.left), "left {}", coord.left);
        }
    }
}
