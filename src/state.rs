use std::collections::{HashMap, VecDeque};
use std::env;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::positions::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Pulse,
    Terminal { match_id: Option<String> },
    Standings,
    Squad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseView {
    Live,
    Upcoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Time,
    Kickoff,
    League,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueMode {
    PremierLeague,
    LaLiga,
    Bundesliga,
    SerieA,
    Ligue1,
    ChampionsLeague,
    WorldCup,
}

pub const LEAGUE_MODES: [LeagueMode; 7] = [
    LeagueMode::PremierLeague,
    LeagueMode::LaLiga,
    LeagueMode::Bundesliga,
    LeagueMode::SerieA,
    LeagueMode::Ligue1,
    LeagueMode::ChampionsLeague,
    LeagueMode::WorldCup,
];

pub fn league_label(mode: LeagueMode) -> &'static str {
    match mode {
        LeagueMode::PremierLeague => "Premier League",
        LeagueMode::LaLiga => "La Liga",
        LeagueMode::Bundesliga => "Bundesliga",
        LeagueMode::SerieA => "Serie A",
        LeagueMode::Ligue1 => "Ligue 1",
        LeagueMode::ChampionsLeague => "Champions League",
        LeagueMode::WorldCup => "World Cup",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    NotStarted,
    Live,
    Finished,
    Cancelled,
}

impl MatchStatus {
    pub fn is_live(self) -> bool {
        self == MatchStatus::Live
    }
}

#[derive(Debug, Clone)]
pub struct MatchSummary {
    pub id: String,
    pub league_id: Option<u32>,
    pub league_name: String,
    pub home: String,
    pub away: String,
    pub kickoff: String,
    pub minute: u16,
    pub score_home: u8,
    pub score_away: u8,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingMatch {
    pub id: String,
    pub league_id: Option<u32>,
    pub league_name: String,
    pub round: String,
    pub kickoff: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Goal,
    Card,
    Sub,
    Var,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub minute: u16,
    pub kind: EventKind,
    pub team: String,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub assist: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSlot {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    pub number: Option<u32>,
    pub pos: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupSide {
    pub team: String,
    pub team_abbr: String,
    pub formation: String,
    #[serde(default)]
    pub coach: Option<String>,
    pub starting: Vec<PlayerSlot>,
    pub subs: Vec<PlayerSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchLineups {
    pub sides: Vec<LineupSide>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRow {
    pub name: String,
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    pub events: Vec<Event>,
    pub lineups: Option<MatchLineups>,
    pub stats: Vec<StatRow>,
}

impl MatchDetail {
    pub fn empty() -> Self {
        Self {
            home_team: None,
            away_team: None,
            events: Vec::new(),
            lineups: None,
            stats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    pub rank: u32,
    pub team_id: u32,
    pub team: String,
    pub played: u32,
    pub win: u32,
    pub draw: u32,
    pub lose: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: i32,
    #[serde(default)]
    pub form: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadMember {
    pub id: u32,
    pub name: String,
    pub role: Role,
    pub age: Option<u32>,
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSquad {
    pub team_name: String,
    pub members: Vec<SquadMember>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub sort: SortMode,
    pub league_mode: LeagueMode,
    pub pulse_view: PulseView,
    pub selected: usize,
    pub league_ids: HashMap<LeagueMode, Vec<u32>>,
    pub matches: Vec<MatchSummary>,
    pub upcoming: Vec<UpcomingMatch>,
    pub upcoming_scroll: u16,
    pub upcoming_cached_at: Option<SystemTime>,
    pub match_detail: HashMap<String, MatchDetail>,
    pub match_detail_cached_at: HashMap<String, SystemTime>,
    pub standings: Vec<StandingRow>,
    pub standings_selected: usize,
    pub standings_loading: bool,
    pub standings_cached_at: Option<SystemTime>,
    pub squad_cache: HashMap<u32, TeamSquad>,
    pub squad_cache_at: HashMap<u32, SystemTime>,
    pub squad_selected: usize,
    pub squad_loading: bool,
    pub squad_team: Option<String>,
    pub squad_team_id: Option<u32>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Pulse,
            sort: SortMode::Time,
            league_mode: LeagueMode::PremierLeague,
            pulse_view: PulseView::Live,
            selected: 0,
            league_ids: league_ids_from_env(),
            matches: Vec::with_capacity(32),
            upcoming: Vec::with_capacity(32),
            upcoming_scroll: 0,
            upcoming_cached_at: None,
            match_detail: HashMap::with_capacity(16),
            match_detail_cached_at: HashMap::with_capacity(16),
            standings: Vec::new(),
            standings_selected: 0,
            standings_loading: false,
            standings_cached_at: None,
            squad_cache: HashMap::with_capacity(8),
            squad_cache_at: HashMap::with_capacity(8),
            squad_selected: 0,
            squad_loading: false,
            squad_team: None,
            squad_team_id: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn selected_match_id(&self) -> Option<String> {
        match &self.screen {
            // Terminal can be pinned to an id that is no longer in `matches`
            // (e.g. a fixture that finished between refreshes).
            Screen::Terminal { match_id: Some(id) } => Some(id.clone()),
            _ => self.selected_match().map(|m| m.id.clone()),
        }
    }

    pub fn selected_match(&self) -> Option<&MatchSummary> {
        match &self.screen {
            Screen::Terminal { match_id: Some(id) } => self.matches.iter().find(|m| &m.id == id),
            _ => {
                let filtered = self.filtered_indices();
                filtered
                    .get(self.selected)
                    .and_then(|idx| self.matches.get(*idx))
            }
        }
    }

    pub fn filtered_indices(&self) -> Vec<usize> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| self.matches_mode(m))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_matches(&self) -> Vec<&MatchSummary> {
        self.filtered_indices()
            .into_iter()
            .filter_map(|idx| self.matches.get(idx))
            .collect()
    }

    pub fn filtered_upcoming(&self) -> Vec<&UpcomingMatch> {
        self.upcoming
            .iter()
            .filter(|m| {
                league_matches(
                    self.mode_ids(),
                    mode_patterns(self.league_mode),
                    m.league_id,
                    &m.league_name,
                )
            })
            .collect()
    }

    fn mode_ids(&self) -> &[u32] {
        self.league_ids
            .get(&self.league_mode)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    fn matches_mode(&self, m: &MatchSummary) -> bool {
        league_matches(
            self.mode_ids(),
            mode_patterns(self.league_mode),
            m.league_id,
            &m.league_name,
        )
    }

    pub fn cycle_league_mode(&mut self) {
        let pos = LEAGUE_MODES
            .iter()
            .position(|mode| *mode == self.league_mode)
            .unwrap_or(0);
        self.league_mode = LEAGUE_MODES[(pos + 1) % LEAGUE_MODES.len()];

        self.selected = 0;
        self.upcoming_scroll = 0;
        self.upcoming.clear();
        self.upcoming_cached_at = None;
        self.matches.clear();
        self.match_detail.clear();
        self.match_detail_cached_at.clear();
        self.standings.clear();
        self.standings_selected = 0;
        self.standings_loading = false;
        self.standings_cached_at = None;
        self.squad_cache.clear();
        self.squad_cache_at.clear();
        self.squad_selected = 0;
        self.squad_loading = false;
        self.squad_team = None;
        self.squad_team_id = None;
        self.push_log(format!(
            "[INFO] League mode: {}",
            league_label(self.league_mode)
        ));
    }

    pub fn toggle_pulse_view(&mut self) {
        self.pulse_view = match self.pulse_view {
            PulseView::Live => PulseView::Upcoming,
            PulseView::Upcoming => PulseView::Live,
        };
        self.selected = 0;
        self.upcoming_scroll = 0;
    }

    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            SortMode::Time => SortMode::Kickoff,
            SortMode::Kickoff => SortMode::League,
            SortMode::League => SortMode::Time,
        };
        self.sort_matches();
    }

    pub fn sort_matches(&mut self) {
        self.sort_matches_with_selected_id(None);
    }

    pub fn sort_matches_with_selected_id(&mut self, selected_id: Option<String>) {
        let selected_id = selected_id.or_else(|| self.selected_match_id());
        match self.sort {
            // Live matches first, most advanced clock on top.
            SortMode::Time => self
                .matches
                .sort_by(|a, b| match (a.status.is_live(), b.status.is_live()) {
                    (true, false) => std::cmp::Ordering::Less,
                    (false, true) => std::cmp::Ordering::Greater,
                    _ => b.minute.cmp(&a.minute),
                }),
            SortMode::Kickoff => self.matches.sort_by(|a, b| a.kickoff.cmp(&b.kickoff)),
            SortMode::League => self.matches.sort_by(|a, b| {
                a.league_name
                    .cmp(&b.league_name)
                    .then(a.kickoff.cmp(&b.kickoff))
            }),
        }

        if let Some(id) = selected_id {
            let filtered = self.filtered_indices();
            if let Some(pos) = filtered.iter().position(|idx| self.matches[*idx].id == id) {
                self.selected = pos;
                return;
            }
        }
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if matches!(self.screen, Screen::Pulse) && self.pulse_view == PulseView::Upcoming {
            self.scroll_upcoming_down();
            return;
        }
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        if matches!(self.screen, Screen::Pulse) && self.pulse_view == PulseView::Upcoming {
            self.scroll_upcoming_up();
            return;
        }
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    fn scroll_upcoming_down(&mut self) {
        let max_lines = self.filtered_upcoming().len();
        if max_lines == 0 {
            self.upcoming_scroll = 0;
            return;
        }
        let max_scroll = (max_lines - 1).min(u16::MAX as usize) as u16;
        if self.upcoming_scroll < max_scroll {
            self.upcoming_scroll += 1;
        }
    }

    fn scroll_upcoming_up(&mut self) {
        self.upcoming_scroll = self.upcoming_scroll.saturating_sub(1);
    }

    pub fn selected_standing(&self) -> Option<&StandingRow> {
        self.standings.get(self.standings_selected)
    }

    pub fn select_standing_next(&mut self) {
        let total = self.standings.len();
        if total == 0 {
            self.standings_selected = 0;
            return;
        }
        self.standings_selected = (self.standings_selected + 1) % total;
    }

    pub fn select_standing_prev(&mut self) {
        let total = self.standings.len();
        if total == 0 {
            self.standings_selected = 0;
            return;
        }
        if self.standings_selected == 0 {
            self.standings_selected = total - 1;
        } else {
            self.standings_selected -= 1;
        }
    }

    pub fn current_squad(&self) -> Option<&TeamSquad> {
        self.squad_team_id.and_then(|id| self.squad_cache.get(&id))
    }

    pub fn select_squad_next(&mut self) {
        let total = self.current_squad().map(|s| s.members.len()).unwrap_or(0);
        if total == 0 {
            self.squad_selected = 0;
            return;
        }
        self.squad_selected = (self.squad_selected + 1) % total;
    }

    pub fn select_squad_prev(&mut self) {
        let total = self.current_squad().map(|s| s.members.len()).unwrap_or(0);
        if total == 0 {
            self.squad_selected = 0;
            return;
        }
        if self.squad_selected == 0 {
            self.squad_selected = total - 1;
        } else {
            self.squad_selected -= 1;
        }
    }
}

/// Per-league fixture filter: provider league ids take precedence, league-name
/// substrings catch feeds that report a different id for the same competition.
fn league_matches(
    ids: &[u32],
    patterns: &[&str],
    league_id: Option<u32>,
    league_name: &str,
) -> bool {
    if let Some(id) = league_id
        && ids.contains(&id)
    {
        return true;
    }
    let lowered = league_name.to_lowercase();
    patterns.iter().any(|p| lowered.contains(p))
}

fn mode_patterns(mode: LeagueMode) -> &'static [&'static str] {
    match mode {
        LeagueMode::PremierLeague => &["premier league", "epl"],
        LeagueMode::LaLiga => &["la liga", "laliga", "primera division"],
        LeagueMode::Bundesliga => &["bundesliga"],
        LeagueMode::SerieA => &["serie a"],
        LeagueMode::Ligue1 => &["ligue 1", "ligue1"],
        LeagueMode::ChampionsLeague => &["champions league", "ucl"],
        LeagueMode::WorldCup => &["world cup", "worldcup"],
    }
}

/// Provider league ids for each mode, overridable via env for seasons where
/// the provider renumbers a competition.
pub fn league_ids_from_env() -> HashMap<LeagueMode, Vec<u32>> {
    let mut ids = HashMap::new();
    ids.insert(
        LeagueMode::PremierLeague,
        parse_ids_env_or_default("APP_LEAGUE_PREMIER_IDS", &[39]),
    );
    ids.insert(
        LeagueMode::LaLiga,
        parse_ids_env_or_default("APP_LEAGUE_LALIGA_IDS", &[140]),
    );
    ids.insert(
        LeagueMode::Bundesliga,
        parse_ids_env_or_default("APP_LEAGUE_BUNDESLIGA_IDS", &[78]),
    );
    ids.insert(
        LeagueMode::SerieA,
        parse_ids_env_or_default("APP_LEAGUE_SERIE_A_IDS", &[135]),
    );
    ids.insert(
        LeagueMode::Ligue1,
        parse_ids_env_or_default("APP_LEAGUE_LIGUE1_IDS", &[61]),
    );
    ids.insert(
        LeagueMode::ChampionsLeague,
        parse_ids_env_or_default("APP_LEAGUE_CHAMPIONS_LEAGUE_IDS", &[2]),
    );
    ids.insert(
        LeagueMode::WorldCup,
        parse_ids_env_or_default("APP_LEAGUE_WORLDCUP_IDS", &[1]),
    );
    ids
}

fn parse_ids_env_or_default(key: &str, defaults: &[u32]) -> Vec<u32> {
    match env::var(key) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            trimmed
                .split([',', ';', ' '])
                .filter_map(|part| part.trim().parse::<u32>().ok())
                .collect()
        }
        Err(_) => defaults.to_vec(),
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetMatches(Vec<MatchSummary>),
    UpsertMatch(MatchSummary),
    SetMatchDetails {
        id: String,
        detail: MatchDetail,
    },
    AddEvent {
        id: String,
        event: Event,
    },
    SetUpcoming(Vec<UpcomingMatch>),
    SetStandings {
        mode: LeagueMode,
        rows: Vec<StandingRow>,
    },
    SetSquad {
        team_id: u32,
        team_name: String,
        members: Vec<SquadMember>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchMatchDetails {
        fixture_id: String,
    },
    FetchUpcoming,
    FetchStandings {
        mode: LeagueMode,
    },
    FetchSquad {
        team_id: u32,
        team_name: String,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetMatches(matches) => {
            let selected_id = state.selected_match_id();
            state.matches = matches;
            state.sort_matches_with_selected_id(selected_id);
            state.clamp_selection();
        }
        Delta::UpsertMatch(summary) => {
            let selected_id = state.selected_match_id();
            if let Some(existing) = state.matches.iter_mut().find(|m| m.id == summary.id) {
                *existing = summary;
            } else {
                state.matches.push(summary);
            }
            state.sort_matches_with_selected_id(selected_id);
            state.clamp_selection();
        }
        Delta::SetMatchDetails { id, detail } => {
            let merged = match state.match_detail.remove(&id) {
                Some(existing) => merge_detail(existing, detail),
                None => detail,
            };
            state.match_detail.insert(id.clone(), merged);
            state.match_detail_cached_at.insert(id, SystemTime::now());
        }
        Delta::AddEvent { id, event } => {
            let detail = state
                .match_detail
                .entry(id)
                .or_insert_with(MatchDetail::empty);
            detail.events.push(event);
        }
        Delta::SetUpcoming(items) => {
            state.upcoming = items;
            state.upcoming_cached_at = Some(SystemTime::now());
            let max = state.filtered_upcoming().len().saturating_sub(1);
            if state.upcoming_scroll as usize > max {
                state.upcoming_scroll = max.min(u16::MAX as usize) as u16;
            }
        }
        Delta::SetStandings { mode, rows } => {
            // A league switch may race a fetch that was already in flight.
            if mode != state.league_mode {
                return;
            }
            state.standings = rows;
            state.standings_loading = false;
            state.standings_cached_at = Some(SystemTime::now());
            if state.standings_selected >= state.standings.len() {
                state.standings_selected = state.standings.len().saturating_sub(1);
            }
        }
        Delta::SetSquad {
            team_id,
            team_name,
            members,
        } => {
            state.squad_cache.insert(
                team_id,
                TeamSquad {
                    team_name: team_name.clone(),
                    members,
                },
            );
            state.squad_cache_at.insert(team_id, SystemTime::now());
            if state.squad_team_id == Some(team_id) {
                state.squad_team = Some(team_name);
                state.squad_loading = false;
                state.squad_selected = 0;
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

/// A refresh that lost a panel (lineups pulled, stats endpoint hiccup) must
/// not clobber richer data we already hold for the fixture.
fn merge_detail(existing: MatchDetail, incoming: MatchDetail) -> MatchDetail {
    MatchDetail {
        home_team: incoming.home_team.or(existing.home_team),
        away_team: incoming.away_team.or(existing.away_team),
        events: if incoming.events.is_empty() {
            existing.events
        } else {
            incoming.events
        },
        lineups: incoming.lineups.or(existing.lineups),
        stats: if incoming.stats.is_empty() {
            existing.stats
        } else {
            incoming.stats
        },
    }
}
