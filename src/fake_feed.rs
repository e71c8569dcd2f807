//! Offline provider used when `APP_OFFLINE=1` or no API key is configured:
//! seeded fixtures with full lineups plus light score/clock jitter, so every
//! screen has data without a network in reach.

use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use rand::Rng;

use crate::state::{
    Delta, Event, EventKind, LineupSide, MatchDetail, MatchLineups, MatchStatus, MatchSummary,
    PlayerSlot, ProviderCommand, SquadMember, StandingRow, StatRow, TeamSquad, UpcomingMatch,
};
use crate::positions::Role;

pub fn spawn_fake_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let details: HashMap<String, MatchDetail> = seed_details();
        let squads: HashMap<u32, TeamSquad> = seed_squads();
        let mut matches = seed_matches();

        let _ = tx.send(Delta::Log("[INFO] Offline feed active".to_string()));
        let _ = tx.send(Delta::SetMatches(matches.clone()));

        let minute_interval = Duration::from_secs(60);
        let mut last_minute_tick = Instant::now();

        loop {
            thread::sleep(Duration::from_millis(900));

            if last_minute_tick.elapsed() >= minute_interval {
                let mut updated = false;
                for summary in &mut matches {
                    if summary.status.is_live() && summary.minute < 90 {
                        summary.minute = summary.minute.saturating_add(1);
                        updated = true;
                    }
                }
                if updated {
                    for summary in matches.iter().cloned() {
                        let _ = tx.send(Delta::UpsertMatch(summary));
                    }
                }
                last_minute_tick = Instant::now();
            } else if !matches.is_empty() && rng.gen_bool(0.08) {
                let idx = rng.gen_range(0..matches.len());
                let summary = &mut matches[idx];
                if summary.status.is_live() {
                    let kind = match rng.gen_range(0..6) {
                        0 => EventKind::Goal,
                        1 | 2 => EventKind::Card,
                        _ => EventKind::Sub,
                    };
                    let (team, description) = match kind {
                        EventKind::Goal => {
                            if rng.gen_bool(0.5) {
                                summary.score_home = summary.score_home.saturating_add(1);
                                (summary.home.clone(), "Goal".to_string())
                            } else {
                                summary.score_away = summary.score_away.saturating_add(1);
                                (summary.away.clone(), "Goal".to_string())
                            }
                        }
                        EventKind::Card => (summary.home.clone(), "Yellow card".to_string()),
                        _ => (summary.away.clone(), "Substitution".to_string()),
                    };
                    let event = Event {
                        minute: summary.minute,
                        kind,
                        team,
                        player: None,
                        assist: None,
                        description,
                    };
                    if kind == EventKind::Goal {
                        let _ = tx.send(Delta::Log(format!(
                            "[ALERT] Goal: {} {}-{} {}",
                            summary.home, summary.score_home, summary.score_away, summary.away
                        )));
                    }
                    let _ = tx.send(Delta::UpsertMatch(summary.clone()));
                    let _ = tx.send(Delta::AddEvent {
                        id: summary.id.clone(),
                        event,
                    });
                }
            }

            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::FetchMatchDetails { fixture_id } => {
                        match details.get(&fixture_id) {
                            Some(detail) => {
                                let _ = tx.send(Delta::SetMatchDetails {
                                    id: fixture_id,
                                    detail: detail.clone(),
                                });
                            }
                            None => {
                                let _ = tx.send(Delta::SetMatchDetails {
                                    id: fixture_id,
                                    detail: MatchDetail::empty(),
                                });
                            }
                        }
                    }
                    ProviderCommand::FetchUpcoming => {
                        let _ = tx.send(Delta::SetUpcoming(seed_upcoming()));
                    }
                    ProviderCommand::FetchStandings { mode } => {
                        let _ = tx.send(Delta::SetStandings {
                            mode,
                            rows: seed_standings(),
                        });
                    }
                    ProviderCommand::FetchSquad { team_id, team_name } => {
                        match squads.get(&team_id) {
                            Some(squad) => {
                                let _ = tx.send(Delta::SetSquad {
                                    team_id,
                                    team_name: squad.team_name.clone(),
                                    members: squad.members.clone(),
                                });
                            }
                            None => {
                                let _ = tx.send(Delta::SetSquad {
                                    team_id,
                                    team_name,
                                    members: Vec::new(),
                                });
                            }
                        }
                    }
                }
            }
        }
    });
}

fn seed_matches() -> Vec<MatchSummary> {
    vec![
        MatchSummary {
            id: "off-1".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            home: "NOR".to_string(),
            away: "EAS".to_string(),
            kickoff: "2026-08-07T19:30".to_string(),
            minute: 54,
            score_home: 2,
            score_away: 1,
            status: MatchStatus::Live,
        },
        MatchSummary {
            id: "off-2".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            home: "HAR".to_string(),
            away: "MIL".to_string(),
            kickoff: "2026-08-07T19:30".to_string(),
            minute: 23,
            score_home: 0,
            score_away: 0,
            status: MatchStatus::Live,
        },
        MatchSummary {
            id: "off-3".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            home: "SOU".to_string(),
            away: "WES".to_string(),
            kickoff: "2026-08-07T14:00".to_string(),
            minute: 90,
            score_home: 1,
            score_away: 3,
            status: MatchStatus::Finished,
        },
    ]
}

fn seed_details() -> HashMap<String, MatchDetail> {
    let mut details = HashMap::new();

    let home = LineupSide {
        team: "Northbridge".to_string(),
        team_abbr: "NOR".to_string(),
        formation: "4-3-3".to_string(),
        coach: Some("A. Keller".to_string()),
        starting: vec![
            player(1, "A. Stone", 1, "G"),
            player(2, "R. Vega", 2, "D"),
            player(3, "M. Holt", 4, "D"),
            player(4, "C. Brandt", 5, "D"),
            player(5, "L. Ferro", 3, "D"),
            player(6, "J. Nox", 6, "M"),
            player(7, "T. Vale", 8, "M"),
            player(8, "D. Iver", 10, "M"),
            player(9, "K. Rook", 7, "F"),
            player(10, "S. Marsh", 9, "F"),
            player(11, "P. Lune", 11, "F"),
        ],
        subs: vec![
            player(12, "E. Ward", 13, "G"),
            player(13, "O. Flint", 15, "D"),
            player(14, "B. Crane", 18, "F"),
        ],
    };
    let away = LineupSide {
        team: "Eastvale".to_string(),
        team_abbr: "EAS".to_string(),
        formation: "4-2-3-1".to_string(),
        coach: Some("H. Duarte".to_string()),
        starting: vec![
            player(21, "L. Park", 1, "G"),
            player(22, "D. Moss", 2, "D"),
            player(23, "I. Noor", 5, "D"),
            player(24, "F. Abel", 6, "D"),
            player(25, "G. Sorel", 3, "D"),
            player(26, "C. Hale", 4, "M"),
            player(27, "M. Rys", 8, "M"),
            player(28, "V. Ash", 10, "M"),
            player(29, "T. Noble", 7, "M"),
            player(30, "J. Quill", 11, "M"),
            player(31, "E. Pike", 9, "F"),
        ],
        subs: vec![
            player(32, "N. Gray", 14, "M"),
            player(33, "O. Reed", 19, "F"),
        ],
    };

    details.insert(
        "off-1".to_string(),
        MatchDetail {
            home_team: Some("Northbridge".to_string()),
            away_team: Some("Eastvale".to_string()),
            events: vec![
                Event {
                    minute: 6,
                    kind: EventKind::Goal,
                    team: "NOR".to_string(),
                    player: Some("K. Rook".to_string()),
                    assist: Some("T. Vale".to_string()),
                    description: "Normal Goal".to_string(),
                },
                Event {
                    minute: 27,
                    kind: EventKind::Card,
                    team: "EAS".to_string(),
                    player: Some("C. Hale".to_string()),
                    assist: None,
                    description: "Yellow Card".to_string(),
                },
                Event {
                    minute: 39,
                    kind: EventKind::Goal,
                    team: "EAS".to_string(),
                    player: Some("E. Pike".to_string()),
                    assist: None,
                    description: "Normal Goal".to_string(),
                },
                Event {
                    minute: 41,
                    kind: EventKind::Goal,
                    team: "NOR".to_string(),
                    player: Some("S. Marsh".to_string()),
                    assist: Some("P. Lune".to_string()),
                    description: "Normal Goal".to_string(),
                },
            ],
            lineups: Some(MatchLineups {
                sides: vec![home, away],
            }),
            stats: vec![
                stat("Ball Possession", "58%", "42%"),
                stat("Total Shots", "14", "9"),
                stat("Shots on Goal", "6", "3"),
                stat("Expected Goals", "1.72", "0.86"),
                stat("Passes", "412", "298"),
                stat("Corner Kicks", "5", "2"),
            ],
        },
    );

    details
}

fn seed_standings() -> Vec<StandingRow> {
    let rows = [
        (1, 101, "Northbridge", 4, 3, 1, 0, 12, 4, "WWDW"),
        (2, 102, "Eastvale", 4, 3, 0, 1, 9, 4, "WLWW"),
        (3, 103, "Harborview", 4, 2, 1, 1, 7, 5, "DWLW"),
        (4, 104, "Milldale", 4, 1, 2, 1, 5, 5, "DLDW"),
        (5, 105, "Southgate", 4, 1, 0, 3, 4, 9, "LLWL"),
        (6, 106, "Westmoor", 4, 0, 2, 2, 3, 8, "DLDL"),
    ];
    rows.into_iter()
        .map(
            |(rank, team_id, team, played, win, draw, lose, gf, ga, form)| StandingRow {
                rank,
                team_id,
                team: team.to_string(),
                played,
                win,
                draw,
                lose,
                goals_for: gf,
                goals_against: ga,
                goal_diff: gf as i32 - ga as i32,
                points: (win * 3 + draw) as i32,
                form: Some(form.to_string()),
            },
        )
        .collect()
}

fn seed_squads() -> HashMap<u32, TeamSquad> {
    let mut squads = HashMap::new();
    squads.insert(
        101,
        TeamSquad {
            team_name: "Northbridge".to_string(),
            members: vec![
                member(1, "A. Stone", Role::Goalkeeper, 29, 1),
                member(2, "R. Vega", Role::Defender, 24, 2),
                member(3, "M. Holt", Role::Defender, 27, 4),
                member(6, "J. Nox", Role::Midfielder, 22, 6),
                member(7, "T. Vale", Role::Midfielder, 26, 8),
                member(9, "K. Rook", Role::Attacker, 23, 7),
                member(10, "S. Marsh", Role::Attacker, 30, 9),
            ],
        },
    );
    squads.insert(
        102,
        TeamSquad {
            team_name: "Eastvale".to_string(),
            members: vec![
                member(21, "L. Park", Role::Goalkeeper, 31, 1),
                member(22, "D. Moss", Role::Defender, 25, 2),
                member(26, "C. Hale", Role::Midfielder, 28, 4),
                member(28, "V. Ash", Role::Midfielder, 21, 10),
                member(31, "E. Pike", Role::Attacker, 26, 9),
            ],
        },
    );
    squads
}

fn seed_upcoming() -> Vec<UpcomingMatch> {
    vec![
        UpcomingMatch {
            id: "off-up-1".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            round: "Matchday 5".to_string(),
            kickoff: "2026-08-09T14:00".to_string(),
            home: "NOR".to_string(),
            away: "HAR".to_string(),
        },
        UpcomingMatch {
            id: "off-up-2".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            round: "Matchday 5".to_string(),
            kickoff: "2026-08-09T16:30".to_string(),
            home: "MIL".to_string(),
            away: "EAS".to_string(),
        },
        UpcomingMatch {
            id: "off-up-3".to_string(),
            league_id: Some(39),
            league_name: "Premier League".to_string(),
            round: "Matchday 5".to_string(),
            kickoff: "2026-08-10T19:45".to_string(),
            home: "WES".to_string(),
            away: "SOU".to_string(),
        },
    ]
}

fn player(id: u32, name: &str, number: u32, pos: &str) -> PlayerSlot {
    PlayerSlot {
        id: Some(id),
        name: name.to_string(),
        number: Some(number),
        pos: Some(pos.to_string()),
    }
}

fn member(id: u32, name: &str, role: Role, age: u32, number: u32) -> SquadMember {
    SquadMember {
        id,
        name: name.to_string(),
        role,
        age: Some(age),
        number: Some(number),
    }
}

fn stat(name: &str, home: &str, away: &str) -> StatRow {
    StatRow {
        name: name.to_string(),
        home: home.to_string(),
        away: away.to_string(),
    }
}
