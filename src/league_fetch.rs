use anyhow::{Context, Result};
use chrono::Datelike;
use serde_json::Value;

use crate::http_cache::fetch_json_cached;
use crate::http_client::{api_headers, http_client};
use crate::positions::Role;
use crate::state::{SquadMember, StandingRow};

/// League table for one competition and season.
pub fn fetch_standings(league_id: u32, season: u32) -> Result<Vec<StandingRow>> {
    let client = http_client()?;
    let url = format!(
        "{}/standings?league={league_id}&season={season}",
        crate::fixture_fetch::api_base()
    );
    let body = fetch_json_cached(client, &url, &api_headers()).context("standings request failed")?;
    parse_standings_json(&body)
}

/// Squad roster for one team.
pub fn fetch_squad(team_id: u32) -> Result<(String, Vec<SquadMember>)> {
    let client = http_client()?;
    let url = format!(
        "{}/players/squads?team={team_id}",
        crate::fixture_fetch::api_base()
    );
    let body = fetch_json_cached(client, &url, &api_headers()).context("squad request failed")?;
    parse_squad_json(&body)
}

/// Season start year: seasons roll over in summer, and the provider labels a
/// season by its starting year. Overridable for historical queries.
pub fn current_season() -> u32 {
    if let Ok(raw) = std::env::var("APP_SEASON")
        && let Ok(season) = raw.trim().parse::<u32>()
    {
        return season;
    }
    let now = chrono::Utc::now().date_naive();
    if now.month() >= 7 {
        now.year() as u32
    } else {
        (now.year() - 1) as u32
    }
}

/// Standings arrive as `response[0].league.standings`, a list of tables (one
/// per group stage group, a single table for round-robin leagues). The first
/// table is the one the league pages show.
pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid standings json")?;
    let Some(table) = root
        .get("response")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
        .and_then(|entry| entry.get("league"))
        .and_then(|league| league.get("standings"))
        .and_then(|s| s.as_array())
        .and_then(|groups| groups.first())
        .and_then(|t| t.as_array())
    else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::new();
    for entry in table {
        let team = entry.get("team").unwrap_or(&Value::Null);
        let name = string_at(team, "name").unwrap_or_default();
        if name.is_empty() {
            continue;
        }
        let all = entry.get("all").unwrap_or(&Value::Null);
        let goals = all.get("goals").unwrap_or(&Value::Null);
        rows.push(StandingRow {
            rank: u32_at(entry, "rank").unwrap_or(0),
            team_id: u32_at(team, "id").unwrap_or(0),
            team: name,
            played: u32_at(all, "played").unwrap_or(0),
            win: u32_at(all, "win").unwrap_or(0),
            draw: u32_at(all, "draw").unwrap_or(0),
            lose: u32_at(all, "lose").unwrap_or(0),
            goals_for: u32_at(goals, "for").unwrap_or(0),
            goals_against: u32_at(goals, "against").unwrap_or(0),
            goal_diff: i32_at(entry, "goalsDiff").unwrap_or(0),
            points: i32_at(entry, "points").unwrap_or(0),
            form: string_at(entry, "form"),
        });
    }
    Ok(rows)
}

pub fn parse_squad_json(raw: &str) -> Result<(String, Vec<SquadMember>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok((String::new(), Vec::new()));
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid squad json")?;
    let Some(entry) = root
        .get("response")
        .and_then(|v| v.as_array())
        .and_then(|list| list.first())
    else {
        return Ok((String::new(), Vec::new()));
    };

    let team_name = entry
        .get("team")
        .and_then(|t| string_at(t, "name"))
        .unwrap_or_default();

    let mut members = Vec::new();
    if let Some(players) = entry.get("players").and_then(|v| v.as_array()) {
        for player in players {
            let name = string_at(player, "name").unwrap_or_default();
            let Some(id) = u32_at(player, "id") else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let role = string_at(player, "position")
                .map(|pos| Role::from_provider(&pos))
                .unwrap_or(Role::Midfielder);
            members.push(SquadMember {
                id,
                name,
                role,
                age: u32_at(player, "age"),
                number: u32_at(player, "number"),
            });
        }
    }
    Ok((team_name, members))
}

fn string_at(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn u32_at(value: &Value, key: &str) -> Option<u32> {
    value.get(key).and_then(|v| v.as_u64()).map(|n| n as u32)
}

fn i32_at(value: &Value, key: &str) -> Option<i32> {
    value.get(key).and_then(|v| v.as_i64()).map(|n| n as i32)
}
