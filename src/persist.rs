use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::state::{AppState, LeagueMode, MatchDetail, StandingRow, TeamSquad, UpcomingMatch};

const CACHE_DIR: &str = "pitchside";
const CACHE_FILE: &str = "snapshot.json";
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SnapshotFile {
    version: u32,
    leagues: HashMap<String, LeagueSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct LeagueSnapshot {
    #[serde(default)]
    standings: Vec<StandingRow>,
    #[serde(default)]
    standings_fetched_at: Option<u64>,
    #[serde(default)]
    upcoming: Vec<UpcomingMatch>,
    #[serde(default)]
    upcoming_fetched_at: Option<u64>,
    #[serde(default)]
    match_details: HashMap<String, MatchDetail>,
    #[serde(default)]
    match_detail_fetched_at: HashMap<String, u64>,
    #[serde(default)]
    squads: HashMap<u32, TeamSquad>,
    #[serde(default)]
    squads_fetched_at: HashMap<u32, u64>,
}

/// Rehydrate the current league's cached panels so the UI has data before the
/// first fetch completes.
pub fn load_into_state(state: &mut AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return;
    };
    let Ok(cache) = serde_json::from_str::<SnapshotFile>(&raw) else {
        return;
    };
    if cache.version != CACHE_VERSION {
        return;
    }

    let key = league_key(state.league_mode);
    let Some(league) = cache.leagues.get(key) else {
        return;
    };

    state.standings = league.standings.clone();
    state.standings_cached_at = league.standings_fetched_at.and_then(system_time_from_secs);
    state.upcoming = league.upcoming.clone();
    state.upcoming_cached_at = league.upcoming_fetched_at.and_then(system_time_from_secs);
    state.match_detail = league.match_details.clone();
    state.match_detail_cached_at = league
        .match_detail_fetched_at
        .iter()
        .filter_map(|(id, ts)| system_time_from_secs(*ts).map(|t| (id.clone(), t)))
        .collect();
    state.squad_cache = league.squads.clone();
    state.squad_cache_at = league
        .squads_fetched_at
        .iter()
        .filter_map(|(id, ts)| system_time_from_secs(*ts).map(|t| (*id, t)))
        .collect();
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let mut cache = load_snapshot_file(&path).unwrap_or_else(|| SnapshotFile {
        version: CACHE_VERSION,
        leagues: HashMap::new(),
    });
    cache.version = CACHE_VERSION;

    let key = league_key(state.league_mode).to_string();
    cache.leagues.insert(
        key,
        LeagueSnapshot {
            standings: state.standings.clone(),
            standings_fetched_at: state.standings_cached_at.and_then(system_time_to_secs),
            upcoming: state.upcoming.clone(),
            upcoming_fetched_at: state.upcoming_cached_at.and_then(system_time_to_secs),
            match_details: state.match_detail.clone(),
            match_detail_fetched_at: state
                .match_detail_cached_at
                .iter()
                .filter_map(|(id, ts)| system_time_to_secs(*ts).map(|t| (id.clone(), t)))
                .collect(),
            squads: state.squad_cache.clone(),
            squads_fetched_at: state
                .squad_cache_at
                .iter()
                .filter_map(|(id, ts)| system_time_to_secs(*ts).map(|t| (*id, t)))
                .collect(),
        },
    );

    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn load_snapshot_file(path: &Path) -> Option<SnapshotFile> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str::<SnapshotFile>(&raw).ok()
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache, fall back to ~/.cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}

fn system_time_from_secs(secs: u64) -> Option<SystemTime> {
    UNIX_EPOCH.checked_add(std::time::Duration::from_secs(secs))
}

fn league_key(mode: LeagueMode) -> &'static str {
    match mode {
        LeagueMode::PremierLeague => "premier_league",
        LeagueMode::LaLiga => "laliga",
        LeagueMode::Bundesliga => "bundesliga",
        LeagueMode::SerieA => "serie_a",
        LeagueMode::Ligue1 => "ligue1",
        LeagueMode::ChampionsLeague => "champions_league",
        LeagueMode::WorldCup => "worldcup",
    }
}
