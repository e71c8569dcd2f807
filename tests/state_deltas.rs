use pitchside::positions::Role;
use pitchside::state::{
    AppState, Delta, Event, EventKind, LineupSide, MatchDetail, MatchLineups, MatchStatus,
    MatchSummary, PlayerSlot, SquadMember, StatRow, apply_delta,
};

fn summary(id: &str, minute: u16, score_home: u8) -> MatchSummary {
    MatchSummary {
        id: id.to_string(),
        league_id: Some(39),
        league_name: "Premier League".to_string(),
        home: "HOM".to_string(),
        away: "AWY".to_string(),
        kickoff: "2026-08-07T19:30".to_string(),
        minute,
        score_home,
        score_away: 0,
        status: MatchStatus::Live,
    }
}

fn rich_detail() -> MatchDetail {
    MatchDetail {
        home_team: Some("HOME".to_string()),
        away_team: Some("AWAY".to_string()),
        events: vec![Event {
            minute: 12,
            kind: EventKind::Goal,
            team: "HOME".to_string(),
            player: Some("P1".to_string()),
            assist: None,
            description: "Goal".to_string(),
        }],
        lineups: Some(MatchLineups {
            sides: vec![LineupSide {
                team: "HOME".to_string(),
                team_abbr: "HOM".to_string(),
                formation: "4-3-3".to_string(),
                coach: None,
                starting: vec![PlayerSlot {
                    id: Some(1),
                    name: "P1".to_string(),
                    number: Some(1),
                    pos: Some("G".to_string()),
                }],
                subs: Vec::new(),
            }],
        }),
        stats: vec![StatRow {
            name: "Ball Possession".to_string(),
            home: "55%".to_string(),
            away: "45%".to_string(),
        }],
    }
}

#[test]
fn sparse_refresh_does_not_clobber_richer_detail() {
    let mut state = AppState::new();
    let id = "m1".to_string();
    apply_delta(
        &mut state,
        Delta::SetMatchDetails {
            id: id.clone(),
            detail: rich_detail(),
        },
    );

    apply_delta(
        &mut state,
        Delta::SetMatchDetails {
            id: id.clone(),
            detail: MatchDetail::empty(),
        },
    );

    let out = state.match_detail.get(&id).expect("detail should exist");
    assert_eq!(out.home_team.as_deref(), Some("HOME"));
    assert!(!out.events.is_empty());
    assert!(out.lineups.is_some());
    assert!(!out.stats.is_empty());
}

#[test]
fn richer_refresh_replaces_panels() {
    let mut state = AppState::new();
    let id = "m1".to_string();
    apply_delta(
        &mut state,
        Delta::SetMatchDetails {
            id: id.clone(),
            detail: rich_detail(),
        },
    );

    let mut incoming = rich_detail();
    incoming.events.push(Event {
        minute: 60,
        kind: EventKind::Card,
        team: "AWAY".to_string(),
        player: None,
        assist: None,
        description: "Yellow Card".to_string(),
    });
    apply_delta(
        &mut state,
        Delta::SetMatchDetails {
            id: id.clone(),
            detail: incoming,
        },
    );

    let out = state.match_detail.get(&id).expect("detail should exist");
    assert_eq!(out.events.len(), 2);
}

#[test]
fn set_matches_preserves_selection_by_id() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetMatches(vec![
            summary("m1", 80, 0),
            summary("m2", 30, 0),
            summary("m3", 10, 0),
        ]),
    );
    // Time sort puts m1 first; select m2.
    state.select_next();
    assert_eq!(state.selected_match().map(|m| m.id.clone()), Some("m2".to_string()));

    // m2's clock advances past m1's; selection follows the id, not the index.
    apply_delta(
        &mut state,
        Delta::SetMatches(vec![
            summary("m1", 81, 0),
            summary("m2", 85, 0),
            summary("m3", 11, 0),
        ]),
    );
    assert_eq!(state.selected_match().map(|m| m.id.clone()), Some("m2".to_string()));
}

#[test]
fn upsert_updates_score_in_place() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetMatches(vec![summary("m1", 10, 0)]));
    apply_delta(&mut state, Delta::UpsertMatch(summary("m1", 11, 1)));
    assert_eq!(state.matches.len(), 1);
    assert_eq!(state.matches[0].score_home, 1);
}

#[test]
fn add_event_creates_detail_when_missing() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::AddEvent {
            id: "m9".to_string(),
            event: Event {
                minute: 5,
                kind: EventKind::Goal,
                team: "HOM".to_string(),
                player: None,
                assist: None,
                description: "Goal".to_string(),
            },
        },
    );
    let detail = state.match_detail.get("m9").expect("detail created");
    assert_eq!(detail.events.len(), 1);
}

#[test]
fn log_ring_is_bounded() {
    let mut state = AppState::new();
    for i in 0..400 {
        apply_delta(&mut state, Delta::Log(format!("line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 200"));
}

#[test]
fn squad_delta_fills_cache_and_current_team() {
    let mut state = AppState::new();
    state.squad_team_id = Some(42);
    state.squad_loading = true;

    apply_delta(
        &mut state,
        Delta::SetSquad {
            team_id: 42,
            team_name: "Arsenal".to_string(),
            members: vec![SquadMember {
                id: 1,
                name: "D. Raya".to_string(),
                role: Role::Goalkeeper,
                age: Some(30),
                number: Some(22),
            }],
        },
    );

    assert!(!state.squad_loading);
    assert_eq!(state.squad_team.as_deref(), Some("Arsenal"));
    let squad = state.current_squad().expect("squad cached");
    assert_eq!(squad.members.len(), 1);
}

#[test]
fn squad_delta_for_other_team_only_fills_cache() {
    let mut state = AppState::new();
    state.squad_team_id = Some(42);
    state.squad_loading = true;

    apply_delta(
        &mut state,
        Delta::SetSquad {
            team_id: 49,
            team_name: "Chelsea".to_string(),
            members: Vec::new(),
        },
    );

    assert!(state.squad_loading);
    assert!(state.squad_cache.contains_key(&49));
    assert!(state.current_squad().is_none());
}
