use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::state::{
    Delta, Event, EventKind, LeagueMode, MatchStatus, MatchSummary, ProviderCommand,
    league_ids_from_env,
};
use crate::{fixture_fetch, league_fetch};

/// Background provider: polls the day's fixtures on an interval, synthesizes
/// the match clock between polls, and serves on-demand fetches. Every failure
/// degrades to a console line; the thread never dies on a provider error.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let pulse_date = opt_env("APP_PULSE_DATE");
        let upcoming_date = opt_env("APP_UPCOMING_DATE");

        let live_interval = Duration::from_secs(
            env::var("APP_LIVE_POLL_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(15)
                .max(5),
        );
        let upcoming_interval = Duration::from_secs(
            env::var("APP_UPCOMING_POLL_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(60)
                .max(10),
        );
        let inflight_max = env::var("APP_DETAILS_INFLIGHT_MAX")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(4)
            .clamp(1, 16);

        let league_ids = league_ids_from_env();
        let inflight_details: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        let mut last_live_fetch = Instant::now() - live_interval;
        let mut last_upcoming = Instant::now() - upcoming_interval;
        let mut last_minute_tick = Instant::now();
        let minute_interval = Duration::from_secs(60);
        let mut matches: Vec<MatchSummary> = Vec::new();

        loop {
            thread::sleep(Duration::from_millis(900));

            if last_live_fetch.elapsed() >= live_interval {
                if let Err(err) = refresh_live_matches(&mut matches, pulse_date.as_deref(), &tx) {
                    let _ = tx.send(Delta::Log(format!("[WARN] Live fetch error: {err}")));
                }
                last_live_fetch = Instant::now();
            }

            // The provider clock only moves on refresh; advance it locally so
            // live rows do not look frozen between polls.
            if last_minute_tick.elapsed() >= minute_interval {
                for summary in &mut matches {
                    if summary.status.is_live() && summary.minute < 90 {
                        summary.minute = summary.minute.saturating_add(1);
                        let _ = tx.send(Delta::UpsertMatch(summary.clone()));
                    }
                }
                last_minute_tick = Instant::now();
            }

            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    ProviderCommand::FetchMatchDetails { fixture_id } => {
                        {
                            let mut inflight = inflight_details
                                .lock()
                                .expect("inflight details lock poisoned");
                            if inflight.contains(&fixture_id) || inflight.len() >= inflight_max {
                                continue;
                            }
                            inflight.insert(fixture_id.clone());
                        }

                        let tx = tx.clone();
                        let inflight_details = inflight_details.clone();
                        thread::spawn(move || {
                            match fixture_fetch::fetch_match_details(&fixture_id) {
                                Ok(detail) => {
                                    let _ = tx.send(Delta::SetMatchDetails {
                                        id: fixture_id.clone(),
                                        detail,
                                    });
                                }
                                Err(err) => {
                                    let _ = tx.send(Delta::Log(format!(
                                        "[WARN] Match details error: {err}"
                                    )));
                                }
                            }
                            let mut inflight = inflight_details
                                .lock()
                                .expect("inflight details lock poisoned");
                            inflight.remove(&fixture_id);
                        });
                    }
                    ProviderCommand::FetchUpcoming => {
                        if last_upcoming.elapsed() < upcoming_interval {
                            let _ = tx.send(Delta::Log(format!(
                                "[INFO] Upcoming throttled ({}s)",
                                upcoming_interval.as_secs()
                            )));
                            continue;
                        }
                        match fixture_fetch::fetch_upcoming(upcoming_date.as_deref()) {
                            Ok(items) => {
                                let _ = tx.send(Delta::SetUpcoming(items));
                            }
                            Err(err) => {
                                let _ =
                                    tx.send(Delta::Log(format!("[WARN] Upcoming error: {err}")));
                            }
                        }
                        last_upcoming = Instant::now();
                    }
                    ProviderCommand::FetchStandings { mode } => {
                        let Some(league_id) = primary_league_id(&league_ids, mode) else {
                            let _ = tx.send(Delta::Log(
                                "[WARN] No league id configured for standings".to_string(),
                            ));
                            continue;
                        };
                        let tx = tx.clone();
                        thread::spawn(move || {
                            match league_fetch::fetch_standings(
                                league_id,
                                league_fetch::current_season(),
                            ) {
                                Ok(rows) => {
                                    let _ = tx.send(Delta::SetStandings { mode, rows });
                                }
                                Err(err) => {
                                    let _ = tx.send(Delta::Log(format!(
                                        "[WARN] Standings error: {err}"
                                    )));
                                    let _ = tx.send(Delta::SetStandings {
                                        mode,
                                        rows: Vec::new(),
                                    });
                                }
                            }
                        });
                    }
                    ProviderCommand::FetchSquad { team_id, team_name } => {
                        let tx = tx.clone();
                        thread::spawn(move || match league_fetch::fetch_squad(team_id) {
                            Ok((fetched_name, members)) => {
                                let name = if fetched_name.is_empty() {
                                    team_name
                                } else {
                                    fetched_name
                                };
                                let _ = tx.send(Delta::SetSquad {
                                    team_id,
                                    team_name: name,
                                    members,
                                });
                            }
                            Err(err) => {
                                let _ =
                                    tx.send(Delta::Log(format!("[WARN] Squad error: {err}")));
                                let _ = tx.send(Delta::SetSquad {
                                    team_id,
                                    team_name,
                                    members: Vec::new(),
                                });
                            }
                        });
                    }
                }
            }
        }
    });
}

fn refresh_live_matches(
    matches: &mut Vec<MatchSummary>,
    date: Option<&str>,
    tx: &Sender<Delta>,
) -> anyhow::Result<()> {
    let rows = fixture_fetch::fetch_fixtures(date)?;
    let updated = merge_fixture_rows(rows, std::mem::take(matches), tx);
    *matches = updated;
    let _ = tx.send(Delta::SetMatches(matches.clone()));
    Ok(())
}

/// Carry the synthesized clock across refreshes and turn score changes into
/// goal events on the tape.
fn merge_fixture_rows(
    rows: Vec<MatchSummary>,
    existing: Vec<MatchSummary>,
    tx: &Sender<Delta>,
) -> Vec<MatchSummary> {
    let mut previous: HashMap<String, MatchSummary> =
        existing.into_iter().map(|m| (m.id.clone(), m)).collect();
    let mut output = Vec::new();

    for mut row in rows {
        if let Some(prev) = previous.remove(&row.id) {
            if row.status.is_live() && row.minute < prev.minute {
                row.minute = prev.minute;
            }
            if row.score_home != prev.score_home || row.score_away != prev.score_away {
                let scoring_team = if row.score_home > prev.score_home {
                    row.home.clone()
                } else {
                    row.away.clone()
                };
                let event = Event {
                    minute: row.minute,
                    kind: EventKind::Goal,
                    team: scoring_team.clone(),
                    player: None,
                    assist: None,
                    description: "Goal".to_string(),
                };
                let _ = tx.send(Delta::AddEvent {
                    id: row.id.clone(),
                    event,
                });
                let _ = tx.send(Delta::Log(format!(
                    "[ALERT] Goal: {} {}-{} {}",
                    row.home, row.score_home, row.score_away, row.away
                )));
            }
        } else if row.status == MatchStatus::Live {
            let _ = tx.send(Delta::Log(format!(
                "[INFO] Live: {} vs {} ({})",
                row.home, row.away, row.league_name
            )));
        }
        output.push(row);
    }

    output
}

fn primary_league_id(ids: &HashMap<LeagueMode, Vec<u32>>, mode: LeagueMode) -> Option<u32> {
    ids.get(&mode).and_then(|list| list.first()).copied()
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}
