use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use pitchside::fixture_fetch::parse_match_details_json;
use pitchside::formation::layout_lineup;
use pitchside::state::PlayerSlot;

fn starting_eleven() -> Vec<PlayerSlot> {
    (0..11)
        .map(|i| PlayerSlot {
            id: Some(i + 1),
            name: format!("Player {}", i + 1),
            number: Some(i + 1),
            pos: None,
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let roster = starting_eleven();
    c.bench_function("layout_433", |b| {
        b.iter(|| {
            let layout = layout_lineup(black_box("4-3-3"), black_box(&roster)).unwrap();
            black_box(layout.coordinates.len());
        })
    });
    c.bench_function("layout_4231_overflow", |b| {
        let mut padded = starting_eleven();
        padded.extend(starting_eleven());
        b.iter(|| {
            let layout = layout_lineup(black_box("4-2-3-1"), black_box(&padded)).unwrap();
            black_box(layout.coordinates.len());
        })
    });
}

fn bench_detail_parse(c: &mut Criterion) {
    c.bench_function("match_details_parse", |b| {
        b.iter(|| {
            let detail = parse_match_details_json(black_box(DETAILS_JSON)).unwrap();
            black_box(detail.events.len());
        })
    });
}

criterion_group!(benches, bench_layout, bench_detail_parse);
criterion_main!(benches);

const DETAILS_JSON: &str = r#"{
  "results": 1,
  "response": [
    {
      "fixture": { "id": 1001, "date": "2026-08-07T19:30:00+00:00", "status": { "short": "2H", "elapsed": 67 } },
      "league": { "id": 39, "name": "Premier League" },
      "teams": { "home": { "id": 42, "name": "Home FC" }, "away": { "id": 49, "name": "Away FC" } },
      "goals": { "home": 1, "away": 0 },
      "events": [
        {
          "time": { "elapsed": 12 },
          "team": { "name": "Home FC" },
          "player": { "name": "A. Striker" },
          "assist": { "name": "B. Winger" },
          "type": "Goal",
          "detail": "Normal Goal"
        },
        {
          "time": { "elapsed": 40 },
          "team": { "name": "Away FC" },
          "player": { "name": "C. Midfielder" },
          "type": "Card",
          "detail": "Yellow Card"
        }
      ],
      "lineups": [
        {
          "team": { "name": "Home FC" },
          "formation": "4-3-3",
          "startXI": [
            { "player": { "id": 1, "name": "P One", "number": 1, "pos": "G" } },
            { "player": { "id": 2, "name": "P Two", "number": 2, "pos": "D" } },
            { "player": { "id": 3, "name": "P Three", "number": 3, "pos": "D" } },
            { "player": { "id": 4, "name": "P Four", "number": 4, "pos": "D" } },
            { "player": { "id": 5, "name": "P Five", "number": 5, "pos": "D" } },
            { "player": { "id": 6, "name": "P Six", "number": 6, "pos": "M" } },
            { "player": { "id": 7, "name": "P Seven", "number": 7, "pos": "M" } },
            { "player": { "id": 8, "name": "P Eight", "number": 8, "pos": "M" } },
            { "player": { "id": 9, "name": "P Nine", "number": 9, "pos": "F" } },
            { "player": { "id": 10, "name": "P Ten", "number": 10, "pos": "F" } },
            { "player": { "id": 11, "name": "P Eleven", "number": 11, "pos": "F" } }
          ],
          "substitutes": [],
          "coach": { "name": "The Coach" }
        }
      ],
      "statistics": [
        {
          "team": { "name": "Home FC" },
          "statistics": [
            { "type": "Ball Possession", "value": "61%" },
            { "type": "Total Shots", "value": 12 }
          ]
        },
        {
          "team": { "name": "Away FC" },
          "statistics": [
            { "type": "Ball Possession", "value": "39%" },
            { "type": "Total Shots", "value": 6 }
          ]
        }
      ]
    }
  ]
}"#;
