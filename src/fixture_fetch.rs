use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::{api_headers, http_client};
use crate::state::{
    Event, EventKind, LineupSide, MatchDetail, MatchLineups, MatchStatus, MatchSummary, PlayerSlot,
    StatRow, UpcomingMatch,
};

pub fn api_base() -> String {
    std::env::var("APP_FOOTBALL_API_BASE")
        .ok()
        .filter(|base| !base.trim().is_empty())
        .unwrap_or_else(|| "https://v3.football.api-sports.io".to_string())
}

/// All fixtures for a date (today when `None`), every status. Callers bucket
/// them into live/upcoming/finished themselves.
pub fn fetch_fixtures(date: Option<&str>) -> Result<Vec<MatchSummary>> {
    let body = fetch_fixtures_body(date)?;
    parse_fixtures_json(&body)
}

/// Not-yet-started fixtures for a date, as upcoming rows.
pub fn fetch_upcoming(date: Option<&str>) -> Result<Vec<UpcomingMatch>> {
    let body = fetch_fixtures_body(date)?;
    parse_upcoming_json(&body)
}

fn fetch_fixtures_body(date: Option<&str>) -> Result<String> {
    let client = http_client()?;
    let url = if let Some(date) = date.and_then(non_empty) {
        format!("{}/fixtures?date={date}", api_base())
    } else {
        format!("{}/fixtures?date={}", api_base(), today())
    };
    fetch_json_cached(client, &url, &api_headers()).context("fixtures request failed")
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Fixture record with lineups grafted on. The single-fixture endpoint embeds
/// events/lineups/statistics, but lineups are published separately 20-40 min
/// before kickoff, so an empty embed gets one more chance via the dedicated
/// lineups endpoint.
pub fn fetch_match_details(fixture_id: &str) -> Result<MatchDetail> {
    let client = http_client()?;
    let url = format!("{}/fixtures?id={fixture_id}", api_base());
    let body = fetch_json_cached(client, &url, &api_headers()).context("fixture request failed")?;
    let mut detail = parse_match_details_json(&body)?;

    if detail.lineups.is_none() {
        let url = format!("{}/fixtures/lineups?fixture={fixture_id}", api_base());
        if let Ok(body) = fetch_json_cached(client, &url, &api_headers()) {
            detail.lineups = parse_lineups_json(&body)?;
        }
    }

    Ok(detail)
}

#[derive(Debug, Deserialize)]
struct ApiFixturesResponse {
    #[serde(default)]
    response: Vec<FixtureEntry>,
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    fixture: FixtureInfo,
    league: LeagueInfo,
    teams: TeamPair,
    #[serde(default)]
    goals: Option<GoalPair>,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    id: u64,
    #[serde(default)]
    date: String,
    status: FixtureStatusInfo,
}

#[derive(Debug, Deserialize)]
struct FixtureStatusInfo {
    #[serde(default)]
    short: String,
    #[serde(default)]
    elapsed: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct LeagueInfo {
    id: u32,
    name: String,
    #[serde(default)]
    round: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TeamPair {
    home: TeamInfo,
    away: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct GoalPair {
    #[serde(default)]
    home: Option<u8>,
    #[serde(default)]
    away: Option<u8>,
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<MatchSummary>> {
    let data = parse_fixtures_response(raw)?;
    let mut out = Vec::new();
    for entry in data.response {
        let status = status_from_short(&entry.fixture.status.short);
        let goals = entry.goals.unwrap_or_default();
        let minute = entry.fixture.status.elapsed.unwrap_or(match status {
            MatchStatus::Finished => 90,
            _ => 0,
        });
        out.push(MatchSummary {
            id: entry.fixture.id.to_string(),
            league_id: Some(entry.league.id),
            league_name: entry.league.name.clone(),
            home: abbreviate_team(&entry.teams.home.name),
            away: abbreviate_team(&entry.teams.away.name),
            kickoff: normalize_kickoff(&entry.fixture.date),
            minute,
            score_home: goals.home.unwrap_or(0),
            score_away: goals.away.unwrap_or(0),
            status,
        });
    }
    Ok(out)
}

pub fn parse_upcoming_json(raw: &str) -> Result<Vec<UpcomingMatch>> {
    let data = parse_fixtures_response(raw)?;
    let mut out = Vec::new();
    for entry in data.response {
        if status_from_short(&entry.fixture.status.short) != MatchStatus::NotStarted {
            continue;
        }
        out.push(UpcomingMatch {
            id: entry.fixture.id.to_string(),
            league_id: Some(entry.league.id),
            league_name: entry.league.name.clone(),
            round: entry.league.round.clone().unwrap_or_default(),
            kickoff: normalize_kickoff(&entry.fixture.date),
            home: abbreviate_team(&entry.teams.home.name),
            away: abbreviate_team(&entry.teams.away.name),
        });
    }
    Ok(out)
}

fn parse_fixtures_response(raw: &str) -> Result<ApiFixturesResponse> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ApiFixturesResponse {
            response: Vec::new(),
        });
    }
    serde_json::from_str(trimmed).context("invalid fixtures json")
}

/// Provider status shorts bucketed into the four states the app tracks.
pub fn status_from_short(short: &str) -> MatchStatus {
    match short {
        "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "SUSP" | "INT" | "LIVE" => MatchStatus::Live,
        "FT" | "AET" | "PEN" => MatchStatus::Finished,
        "CANC" | "ABD" | "AWD" | "WO" => MatchStatus::Cancelled,
        _ => MatchStatus::NotStarted,
    }
}

pub fn parse_match_details_json(raw: &str) -> Result<MatchDetail> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(MatchDetail::empty());
    }

    let root: Value = serde_json::from_str(trimmed).context("invalid fixture json")?;
    let Some(entry) = root
        .get("response")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
    else {
        return Ok(MatchDetail::empty());
    };

    let teams = entry.get("teams").unwrap_or(&Value::Null);
    let home_name = teams
        .get("home")
        .and_then(|t| pick_string(t, &["name"]))
        .unwrap_or_default();
    let away_name = teams
        .get("away")
        .and_then(|t| pick_string(t, &["name"]))
        .unwrap_or_default();

    let events = parse_events(entry.get("events"));
    let lineups = parse_lineup_sides(entry.get("lineups"));
    let stats = parse_stats(entry.get("statistics"), &home_name, &away_name);

    Ok(MatchDetail {
        home_team: non_empty(&home_name).map(str::to_string),
        away_team: non_empty(&away_name).map(str::to_string),
        events,
        lineups,
        stats,
    })
}

/// Standalone lineups endpoint: the response array is the sides list.
pub fn parse_lineups_json(raw: &str) -> Result<Option<MatchLineups>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid lineups json")?;
    Ok(parse_lineup_sides(root.get("response")))
}

fn parse_lineup_sides(value: Option<&Value>) -> Option<MatchLineups> {
    let list = value?.as_array()?;
    let mut sides = Vec::new();
    for entry in list {
        if let Some(side) = parse_lineup_side(entry) {
            sides.push(side);
        }
    }
    if sides.is_empty() { None } else { Some(MatchLineups { sides }) }
}

fn parse_lineup_side(value: &Value) -> Option<LineupSide> {
    let name = value
        .get("team")
        .and_then(|t| pick_string(t, &["name"]))
        .unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    let formation = pick_string(value, &["formation"]).unwrap_or_default();
    let coach = value
        .get("coach")
        .and_then(|c| pick_string(c, &["name"]));
    let starting = parse_players(value.get("startXI"));
    let subs = parse_players(
        value
            .get("substitutes")
            .or_else(|| value.get("bench"))
            .or_else(|| value.get("subs")),
    );

    Some(LineupSide {
        team: name.clone(),
        team_abbr: abbreviate_team(&name),
        formation,
        coach,
        starting,
        subs,
    })
}

fn parse_players(value: Option<&Value>) -> Vec<PlayerSlot> {
    let mut out = Vec::new();
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return out;
    };
    for entry in list {
        // Entries are wrapped: { "player": { id, name, number, pos } }.
        let inner = entry.get("player").unwrap_or(entry);
        if let Some(player) = parse_player(inner) {
            out.push(player);
        }
    }
    out
}

fn parse_player(value: &Value) -> Option<PlayerSlot> {
    let name = pick_string(value, &["name", "playerName", "fullName"]).unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    let id = pick_u32(value, &["id"]);
    let number = pick_u32(value, &["number", "shirtNumber"]);
    let pos = pick_string(value, &["pos", "position"]);
    Some(PlayerSlot {
        id,
        name,
        number,
        pos,
    })
}

fn parse_events(value: Option<&Value>) -> Vec<Event> {
    let mut out = Vec::new();
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return out;
    };
    for entry in list {
        let Some(kind) = parse_event_kind(entry.get("type").and_then(|v| v.as_str())) else {
            continue;
        };
        let minute = entry
            .get("time")
            .and_then(|t| t.get("elapsed"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u16;
        let team = entry
            .get("team")
            .and_then(|t| pick_string(t, &["name"]))
            .unwrap_or_default();
        let player = entry
            .get("player")
            .and_then(|p| pick_string(p, &["name"]));
        let assist = entry
            .get("assist")
            .and_then(|a| pick_string(a, &["name"]));
        let description = pick_string(entry, &["detail", "comments"])
            .unwrap_or_else(|| event_fallback_label(kind).to_string());
        out.push(Event {
            minute,
            kind,
            team,
            player,
            assist,
            description,
        });
    }
    out
}

fn parse_event_kind(event_type: Option<&str>) -> Option<EventKind> {
    let lowered = event_type?.to_lowercase();
    if lowered.contains("goal") {
        Some(EventKind::Goal)
    } else if lowered.contains("card") {
        Some(EventKind::Card)
    } else if lowered.contains("subst") {
        Some(EventKind::Sub)
    } else if lowered.contains("var") {
        Some(EventKind::Var)
    } else {
        None
    }
}

fn event_fallback_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Goal => "Goal",
        EventKind::Card => "Card",
        EventKind::Sub => "Substitution",
        EventKind::Var => "VAR",
    }
}

/// Statistics arrive per team; pair them up by stat name, keeping the home
/// side's ordering.
fn parse_stats(value: Option<&Value>, home_name: &str, away_name: &str) -> Vec<StatRow> {
    let mut rows = Vec::new();
    let Some(list) = value.and_then(|v| v.as_array()) else {
        return rows;
    };

    let mut home_stats: Vec<(String, String)> = Vec::new();
    let mut away_stats: Vec<(String, String)> = Vec::new();
    for entry in list {
        let team = entry
            .get("team")
            .and_then(|t| pick_string(t, &["name"]))
            .unwrap_or_default();
        let Some(stats) = entry.get("statistics").and_then(|v| v.as_array()) else {
            continue;
        };
        let bucket = if team == away_name && team != home_name {
            &mut away_stats
        } else {
            &mut home_stats
        };
        for stat in stats {
            let name = pick_string(stat, &["type", "name"]).unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            bucket.push((name, value_to_string(stat.get("value"))));
        }
    }

    for (name, home) in home_stats {
        let away = away_stats
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| "-".to_string());
        rows.push(StatRow { name, home, away });
    }
    rows
}

fn value_to_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => {
            if *b {
                "yes".to_string()
            } else {
                "no".to_string()
            }
        }
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

fn normalize_kickoff(raw: &str) -> String {
    let cleaned = raw.trim().replace(' ', "T");
    if cleaned.len() >= 16 {
        cleaned[..16].to_string()
    } else {
        cleaned
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

pub fn abbreviate_team(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.len() <= 3 {
        return trimmed.to_uppercase();
    }
    let mut abbr = String::new();
    for part in trimmed.split_whitespace() {
        if let Some(ch) = part.chars().next() {
            abbr.push(ch);
        }
        if abbr.len() >= 3 {
            break;
        }
    }
    if abbr.len() >= 2 {
        return abbr.to_uppercase();
    }
    trimmed.chars().take(3).collect::<String>().to_uppercase()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key)
            && let Some(text) = as_string(v)
        {
            return Some(text);
        }
    }
    None
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(num) = v.as_u64() {
                return Some(num as u32);
            }
            if let Some(s) = v.as_str()
                && let Ok(num) = s.parse::<u32>()
            {
                return Some(num);
            }
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
