use std::fs;
use std::path::PathBuf;

use pitchside::fixture_fetch::{
    parse_fixtures_json, parse_match_details_json, parse_upcoming_json,
};
use pitchside::league_fetch::{parse_squad_json, parse_standings_json};
use pitchside::positions::Role;
use pitchside::state::{EventKind, MatchStatus};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_day_fixtures() {
    let raw = read_fixture("fixtures_day.json");
    let rows = parse_fixtures_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].id, "1001");
    assert_eq!(rows[0].status, MatchStatus::Live);
    assert_eq!(rows[0].minute, 67);
    assert_eq!(rows[0].score_home, 2);
    assert_eq!(rows[0].score_away, 1);
    assert_eq!(rows[0].league_id, Some(39));
    assert_eq!(rows[0].kickoff, "2026-08-07T19:30");

    assert_eq!(rows[1].status, MatchStatus::NotStarted);
    assert_eq!(rows[1].minute, 0);
}

#[test]
fn upcoming_keeps_only_unstarted_fixtures() {
    let raw = read_fixture("fixtures_day.json");
    let upcoming = parse_upcoming_json(&raw).expect("fixture should parse");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, "1002");
    assert_eq!(upcoming[0].round, "Regular Season - 1");
    assert_eq!(upcoming[0].home, "LIV");
    assert_eq!(upcoming[0].away, "MC");
}

#[test]
fn parses_match_details_fixture() {
    let raw = read_fixture("match_details.json");
    let detail = parse_match_details_json(&raw).expect("fixture should parse");

    assert_eq!(detail.home_team.as_deref(), Some("Arsenal"));
    assert_eq!(detail.away_team.as_deref(), Some("Chelsea"));

    assert_eq!(detail.events.len(), 3);
    assert_eq!(detail.events[0].minute, 12);
    assert_eq!(detail.events[0].kind, EventKind::Goal);
    assert_eq!(detail.events[0].player.as_deref(), Some("B. Saka"));
    assert_eq!(detail.events[0].assist.as_deref(), Some("M. Odegaard"));
    assert_eq!(detail.events[1].kind, EventKind::Card);
    assert_eq!(detail.events[1].assist, None);
    assert_eq!(detail.events[2].kind, EventKind::Sub);

    let lineups = detail.lineups.expect("lineups present");
    assert_eq!(lineups.sides.len(), 2);
    let home = &lineups.sides[0];
    assert_eq!(home.formation, "4-3-3");
    assert_eq!(home.starting.len(), 11);
    assert_eq!(home.subs.len(), 3);
    assert_eq!(home.coach.as_deref(), Some("M. Arteta"));
    assert_eq!(home.starting[0].name, "D. Raya");
    assert_eq!(home.starting[0].number, Some(22));
    assert_eq!(home.starting[0].pos.as_deref(), Some("G"));
    assert_eq!(lineups.sides[1].formation, "4-2-3-1");

    assert_eq!(detail.stats.len(), 5);
    assert_eq!(detail.stats[0].name, "Ball Possession");
    assert_eq!(detail.stats[0].home, "58%");
    assert_eq!(detail.stats[0].away, "42%");
    assert_eq!(detail.stats[1].home, "6");
    // Null away value renders as a dash.
    assert_eq!(detail.stats[4].away, "-");
}

#[test]
fn parses_standings_fixture() {
    let raw = read_fixture("standings.json");
    let rows = parse_standings_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].team, "Arsenal");
    assert_eq!(rows[0].team_id, 42);
    assert_eq!(rows[0].played, 4);
    assert_eq!(rows[0].win, 3);
    assert_eq!(rows[0].draw, 1);
    assert_eq!(rows[0].lose, 0);
    assert_eq!(rows[0].goals_for, 12);
    assert_eq!(rows[0].goals_against, 4);
    assert_eq!(rows[0].goal_diff, 8);
    assert_eq!(rows[0].points, 10);
    assert_eq!(rows[0].form.as_deref(), Some("WWDW"));
    assert_eq!(rows[2].team, "Chelsea");
}

#[test]
fn parses_squad_fixture() {
    let raw = read_fixture("squad.json");
    let (team, members) = parse_squad_json(&raw).expect("fixture should parse");
    assert_eq!(team, "Arsenal");
    assert_eq!(members.len(), 5);
    assert_eq!(members[0].name, "D. Raya");
    assert_eq!(members[0].role, Role::Goalkeeper);
    assert_eq!(members[0].number, Some(22));
    assert_eq!(members[3].role, Role::Attacker);
    // Missing position falls back to midfielder.
    assert_eq!(members[4].role, Role::Midfielder);
}

#[test]
fn null_bodies_parse_to_empty() {
    assert!(parse_fixtures_json("null").expect("null parses").is_empty());
    assert!(parse_upcoming_json("").expect("empty parses").is_empty());
    assert!(parse_standings_json("null").expect("null parses").is_empty());

    let detail = parse_match_details_json("null").expect("null parses");
    assert!(detail.events.is_empty());
    assert!(detail.lineups.is_none());
    assert!(detail.stats.is_empty());

    let (team, members) = parse_squad_json("null").expect("null parses");
    assert!(team.is_empty());
    assert!(members.is_empty());
}

#[test]
fn missing_response_array_is_tolerated() {
    let detail = parse_match_details_json(r#"{"results":0,"response":[]}"#).expect("parses");
    assert!(detail.lineups.is_none());

    let rows = parse_standings_json(r#"{"results":0,"response":[]}"#).expect("parses");
    assert!(rows.is_empty());
}
