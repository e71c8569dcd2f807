use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use chrono::NaiveDateTime;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pitchside::formation::{self, Coordinate, LayoutError};
use pitchside::positions::Role;
use pitchside::state::{
    self, AppState, LineupSide, PulseView, Screen, apply_delta, league_label,
};
use pitchside::{fake_feed, feed, persist};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>,
    upcoming_refresh: Duration,
    last_upcoming_refresh: Instant,
    detail_refresh: Duration,
    last_detail_refresh: HashMap<String, Instant>,
    standings_ttl: Duration,
    squad_ttl: Duration,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<state::ProviderCommand>>) -> Self {
        let upcoming_refresh = std::env::var("APP_UPCOMING_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(10);
        let detail_refresh = std::env::var("APP_DETAILS_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(30);
        let standings_ttl = std::env::var("APP_STANDINGS_TTL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(6 * 3600)
            .max(60);
        let squad_ttl = std::env::var("APP_SQUAD_TTL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(24 * 3600)
            .max(60);
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            upcoming_refresh: Duration::from_secs(upcoming_refresh),
            last_upcoming_refresh: Instant::now(),
            detail_refresh: Duration::from_secs(detail_refresh),
            last_detail_refresh: HashMap::new(),
            standings_ttl: Duration::from_secs(standings_ttl),
            squad_ttl: Duration::from_secs(squad_ttl),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('1') => self.state.screen = Screen::Pulse,
            KeyCode::Char('2') => {
                self.state.screen = Screen::Standings;
                self.maybe_request_standings(true);
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.state.cycle_league_mode();
                if self.state.pulse_view == PulseView::Upcoming {
                    self.request_upcoming(true);
                }
                if matches!(self.state.screen, Screen::Standings | Screen::Squad) {
                    self.state.screen = Screen::Standings;
                    self.maybe_request_standings(true);
                }
            }
            KeyCode::Char('j') | KeyCode::Down => match self.state.screen {
                Screen::Standings => self.state.select_standing_next(),
                Screen::Squad => self.state.select_squad_next(),
                _ => self.state.select_next(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.state.screen {
                Screen::Standings => self.state.select_standing_prev(),
                Screen::Squad => self.state.select_squad_prev(),
                _ => self.state.select_prev(),
            },
            KeyCode::Char('d') | KeyCode::Enter => match self.state.screen {
                Screen::Pulse if self.state.pulse_view == PulseView::Live => {
                    let match_id = self.state.selected_match_id();
                    self.state.screen = Screen::Terminal { match_id };
                    self.request_match_details(true);
                }
                Screen::Standings => self.open_squad_for_selected(),
                _ => {}
            },
            KeyCode::Char('b') | KeyCode::Esc => {
                self.state.screen = match self.state.screen {
                    Screen::Squad => Screen::Standings,
                    _ => Screen::Pulse,
                };
            }
            KeyCode::Char('s') => {
                if matches!(self.state.screen, Screen::Pulse) {
                    self.state.cycle_sort();
                }
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                if matches!(self.state.screen, Screen::Pulse) {
                    let to_upcoming = self.state.pulse_view == PulseView::Live;
                    self.state.toggle_pulse_view();
                    if to_upcoming {
                        self.request_upcoming(true);
                    }
                }
            }
            KeyCode::Char('i') | KeyCode::Char('I') => self.request_match_details(true),
            _ => {}
        }
    }

    fn open_squad_for_selected(&mut self) {
        let Some(row) = self.state.selected_standing().cloned() else {
            self.state.push_log("[INFO] No team selected");
            return;
        };
        if row.team_id == 0 {
            self.state.push_log("[WARN] Team id missing for squad fetch");
            return;
        }
        self.state.squad_team_id = Some(row.team_id);
        self.state.squad_team = Some(row.team.clone());
        self.state.squad_selected = 0;
        self.state.screen = Screen::Squad;

        let fresh = self
            .state
            .squad_cache_at
            .get(&row.team_id)
            .and_then(|at| SystemTime::now().duration_since(*at).ok())
            .map(|age| age < self.squad_ttl)
            .unwrap_or(false);
        if fresh && self.state.squad_cache.contains_key(&row.team_id) {
            return;
        }

        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Squad fetch unavailable");
            return;
        };
        self.state.squad_loading = true;
        if tx
            .send(state::ProviderCommand::FetchSquad {
                team_id: row.team_id,
                team_name: row.team,
            })
            .is_err()
        {
            self.state.squad_loading = false;
            self.state.push_log("[WARN] Squad request failed");
        }
    }

    fn maybe_request_standings(&mut self, announce: bool) {
        let fresh = self
            .state
            .standings_cached_at
            .and_then(|at| SystemTime::now().duration_since(at).ok())
            .map(|age| age < self.standings_ttl)
            .unwrap_or(false);
        if fresh && !self.state.standings.is_empty() {
            return;
        }
        if self.state.standings_loading {
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Standings fetch unavailable");
            }
            return;
        };
        self.state.standings_loading = true;
        if tx
            .send(state::ProviderCommand::FetchStandings {
                mode: self.state.league_mode,
            })
            .is_err()
        {
            self.state.standings_loading = false;
            if announce {
                self.state.push_log("[WARN] Standings request failed");
            }
        } else if announce {
            self.state.push_log("[INFO] Standings request sent");
        }
    }

    fn request_match_details(&mut self, announce: bool) {
        let Some(match_id) = self.state.selected_match_id() else {
            if announce {
                self.state.push_log("[INFO] No match selected for details");
            }
            return;
        };
        self.request_match_details_for(&match_id, announce);
    }

    fn request_match_details_for(&mut self, match_id: &str, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Match details fetch unavailable");
            }
            return;
        };
        if tx
            .send(state::ProviderCommand::FetchMatchDetails {
                fixture_id: match_id.to_string(),
            })
            .is_err()
        {
            if announce {
                self.state.push_log("[WARN] Match details request failed");
            }
        } else {
            if announce {
                self.state.push_log("[INFO] Match details request sent");
            }
            self.last_detail_refresh
                .insert(match_id.to_string(), Instant::now());
        }
    }

    fn request_upcoming(&mut self, announce: bool) {
        let Some(tx) = &self.cmd_tx else {
            if announce {
                self.state.push_log("[INFO] Upcoming fetch unavailable");
            }
            return;
        };
        if tx.send(state::ProviderCommand::FetchUpcoming).is_err() {
            if announce {
                self.state.push_log("[WARN] Upcoming request failed");
            }
        } else {
            if announce {
                self.state.push_log("[INFO] Upcoming request sent");
            }
            self.last_upcoming_refresh = Instant::now();
        }
    }

    fn maybe_refresh_upcoming(&mut self) {
        if !matches!(self.state.screen, Screen::Pulse) {
            return;
        }
        if self.state.pulse_view != PulseView::Upcoming {
            return;
        }
        if self.last_upcoming_refresh.elapsed() >= self.upcoming_refresh {
            self.request_upcoming(false);
        }
    }

    fn maybe_refresh_match_details(&mut self) {
        let live_matches: Vec<String> = self
            .state
            .filtered_matches()
            .into_iter()
            .filter(|m| m.status.is_live())
            .map(|m| m.id.clone())
            .collect();

        for match_id in live_matches {
            let last = self.last_detail_refresh.get(&match_id);
            let should_fetch = last
                .map(|t| t.elapsed() >= self.detail_refresh)
                .unwrap_or(true);
            if should_fetch {
                self.request_match_details_for(&match_id, false);
            }
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    if offline_mode() {
        fake_feed::spawn_fake_provider(tx, cmd_rx);
    } else {
        feed::spawn_provider(tx, cmd_rx);
    }

    let mut app = App::new(Some(cmd_tx));
    persist::load_into_state(&mut app.state);
    let res = run_app(&mut terminal, &mut app, rx);
    persist::save_from_state(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn offline_mode() -> bool {
    let forced = std::env::var("APP_OFFLINE")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if forced {
        return true;
    }
    std::env::var("APP_FOOTBALL_API_KEY")
        .map(|v| v.trim().is_empty())
        .unwrap_or(true)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_refresh_upcoming();
        app.maybe_refresh_match_details();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Pulse => render_pulse(frame, chunks[1], &app.state),
        Screen::Terminal { .. } => render_terminal(frame, chunks[1], &app.state),
        Screen::Standings => render_standings(frame, chunks[1], &app.state),
        Screen::Squad => render_squad(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Pulse => format!(
            "PITCHSIDE | {} | {} | Sort: {}",
            league_label(state.league_mode),
            pulse_view_label(state.pulse_view),
            sort_label(state.sort)
        ),
        Screen::Terminal { .. } => "PITCHSIDE TERMINAL".to_string(),
        Screen::Standings => format!("PITCHSIDE | {} | STANDINGS", league_label(state.league_mode)),
        Screen::Squad => format!(
            "PITCHSIDE | SQUAD | {}",
            state.squad_team.as_deref().unwrap_or("-")
        ),
    };
    let line1 = format!("  __   {}", title);
    let line2 = " |__|".to_string();
    let line3 = " |__|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Pulse => match state.pulse_view {
            PulseView::Live => {
                "1 Pulse | 2 Standings | Enter/d Match | j/k Move | s Sort | l League | u Upcoming | i Details | ? Help | q Quit"
                    .to_string()
            }
            PulseView::Upcoming => {
                "1 Pulse | 2 Standings | u Live | j/k Scroll | l League | ? Help | q Quit".to_string()
            }
        },
        Screen::Terminal { .. } => {
            "1 Pulse | b/Esc Back | i Details | ? Help | q Quit".to_string()
        }
        Screen::Standings => {
            "1 Pulse | Enter Squad | j/k Move | l League | ? Help | q Quit".to_string()
        }
        Screen::Squad => "b/Esc Standings | j/k Move | ? Help | q Quit".to_string(),
    }
}

fn render_pulse(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.pulse_view {
        PulseView::Live => render_pulse_live(frame, area, state),
        PulseView::Upcoming => render_pulse_upcoming(frame, area, state),
    }
}

fn render_pulse_live(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = pulse_columns();
    render_pulse_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let filtered = state.filtered_matches();
    if filtered.is_empty() {
        let empty = Paragraph::new("No matches for this league")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    if list_area.height == 0 {
        return;
    }
    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, filtered.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let m = filtered[idx];
        let time = match m.status {
            state::MatchStatus::Live => format!("{}'", m.minute),
            state::MatchStatus::Finished => "FT".to_string(),
            state::MatchStatus::Cancelled => "CANC".to_string(),
            state::MatchStatus::NotStarted => "KO".to_string(),
        };
        let match_name = format!("{}-{}", m.home, m.away);
        let score = format!("{}-{}", m.score_home, m.score_away);
        let kickoff = format_kickoff(&m.kickoff);

        let time_style = if m.status.is_live() {
            row_style.fg(Color::Green)
        } else {
            row_style
        };
        render_cell_text(frame, cols[0], &time, time_style);
        render_cell_text(frame, cols[1], &match_name, row_style);
        render_cell_text(frame, cols[2], &score, row_style);
        render_cell_text(frame, cols[3], &m.league_name, row_style);
        render_cell_text(frame, cols[4], &kickoff, row_style);
    }
}

fn render_pulse_upcoming(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = upcoming_columns();
    render_upcoming_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let upcoming = state.filtered_upcoming();
    if upcoming.is_empty() {
        let empty = Paragraph::new("No upcoming matches for this league")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let total = upcoming.len();
    let max_start = total.saturating_sub(visible);
    let start = (state.upcoming_scroll as usize).min(max_start);
    let end = (start + visible).min(total);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let m = upcoming[idx];
        let kickoff = format_kickoff(&m.kickoff);
        let match_name = format!("{} vs {}", m.home, m.away);
        let league = if m.league_name.is_empty() {
            "-".to_string()
        } else {
            m.league_name.clone()
        };
        let round = if m.round.is_empty() {
            "-".to_string()
        } else {
            m.round.clone()
        };

        render_cell_text(frame, cols[0], &kickoff, Style::default());
        render_cell_text(frame, cols[1], &match_name, Style::default());
        render_cell_text(frame, cols[2], &league, Style::default());
        render_cell_text(frame, cols[3], &round, Style::default());
    }
}

fn pulse_columns() -> [Constraint; 5] {
    [
        Constraint::Length(6),
        Constraint::Length(11),
        Constraint::Length(7),
        Constraint::Min(16),
        Constraint::Length(17),
    ]
}

fn upcoming_columns() -> [Constraint; 4] {
    [
        Constraint::Length(17),
        Constraint::Min(16),
        Constraint::Length(18),
        Constraint::Min(10),
    ]
}

fn render_pulse_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Time", style);
    render_cell_text(frame, cols[1], "Match", style);
    render_cell_text(frame, cols[2], "Score", style);
    render_cell_text(frame, cols[3], "League", style);
    render_cell_text(frame, cols[4], "Kickoff", style);
}

fn render_upcoming_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Kickoff", style);
    render_cell_text(frame, cols[1], "Match", style);
    render_cell_text(frame, cols[2], "League", style);
    render_cell_text(frame, cols[3], "Round", style);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_terminal(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22),
            Constraint::Min(34),
            Constraint::Length(32),
        ])
        .split(rows[0]);

    let middle_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(14), Constraint::Length(8)])
        .split(columns[1]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(1)])
        .split(columns[2]);

    let match_list = Paragraph::new(match_list_text(state))
        .block(Block::default().title("Match List").borders(Borders::ALL));
    frame.render_widget(match_list, columns[0]);

    render_pitch(frame, middle_chunks[0], state);

    let tape = Paragraph::new(event_tape_text(state))
        .block(Block::default().title("Event Tape").borders(Borders::ALL));
    frame.render_widget(tape, middle_chunks[1]);

    let stats = Paragraph::new(stats_text(state))
        .block(Block::default().title("Stats").borders(Borders::ALL));
    frame.render_widget(stats, right_chunks[0]);

    render_lineups(frame, right_chunks[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[1]);
}

/// The pitch panel: home side on the upper half attacking down, away side
/// mirrored on the lower half, markers placed by the layout engine.
fn render_pitch(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Pitch").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 8 || inner.width < 16 {
        let cramped =
            Paragraph::new("Pitch needs more room").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(cramped, inner);
        return;
    }

    let lineups = state
        .selected_match_id()
        .and_then(|id| state.match_detail.get(&id))
        .and_then(|detail| detail.lineups.as_ref());
    let Some(lineups) = lineups else {
        let empty = Paragraph::new("No lineups yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    };

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    render_pitch_half(frame, halves[0], lineups.sides.first(), false);
    render_pitch_half(frame, halves[1], lineups.sides.get(1), true);
}

fn render_pitch_half(frame: &mut Frame, area: Rect, side: Option<&LineupSide>, mirrored: bool) {
    let Some(side) = side else {
        let empty = Paragraph::new("No lineup").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    match formation::layout_lineup(&side.formation, &side.starting) {
        Ok(layout) => {
            let caption = format!("{} {}", side.team_abbr, layout.formation);
            let caption_y = if mirrored {
                area.y + area.height.saturating_sub(1)
            } else {
                area.y
            };
            render_marker(frame, area, area.x, caption_y, &caption, caption_style());

            for (idx, coord) in &layout.coordinates {
                let Some(player) = side.starting.get(*idx) else {
                    continue;
                };
                let label = player
                    .number
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "--".to_string());
                let (x, y) = project_marker(area, *coord, mirrored);
                render_marker(frame, area, x, y, &label, marker_style(mirrored));
            }
        }
        Err(LayoutError::NoLineupAvailable) => {
            let empty =
                Paragraph::new("Lineup not available").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, area);
        }
        Err(LayoutError::MalformedFormation(raw)) => {
            let text = format!("{} formation unreadable ({raw})", side.team_abbr);
            let broken = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(broken, area);
        }
    }
}

/// Scale the engine's percentages into the half's cell grid. The away half is
/// mirrored so both keepers hug the outer edges.
fn project_marker(area: Rect, coord: Coordinate, mirrored: bool) -> (u16, u16) {
    let height = area.height.saturating_sub(1) as f32;
    let width = area.width.saturating_sub(1) as f32;
    let top_frac = (coord.top / 100.0).clamp(0.0, 1.0);
    let top_frac = if mirrored { 1.0 - top_frac } else { top_frac };
    let left_frac = (coord.left / 100.0).clamp(0.0, 1.0);
    let y = area.y + (top_frac * height).round() as u16;
    let x = area.x + (left_frac * width).round() as u16;
    (x, y)
}

fn render_marker(frame: &mut Frame, bounds: Rect, x: u16, y: u16, label: &str, style: Style) {
    if y < bounds.y || y >= bounds.y + bounds.height {
        return;
    }
    let right = bounds.x + bounds.width;
    if x >= right {
        return;
    }
    let width = (label.len() as u16).min(right - x);
    if width == 0 {
        return;
    }
    let marker_area = Rect {
        x,
        y,
        width,
        height: 1,
    };
    frame.render_widget(Paragraph::new(label).style(style), marker_area);
}

fn marker_style(mirrored: bool) -> Style {
    if mirrored {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }
}

fn caption_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn match_list_text(state: &AppState) -> String {
    let filtered = state.filtered_matches();
    if filtered.is_empty() {
        return "No matches yet".to_string();
    }

    let current = state.selected_match_id();
    let mut lines = Vec::new();
    for m in filtered {
        let prefix = if current.as_deref() == Some(m.id.as_str()) {
            "> "
        } else {
            "  "
        };
        lines.push(format!(
            "{prefix}{}-{} {}-{}",
            m.home, m.away, m.score_home, m.score_away
        ));
    }
    lines.join("\n")
}

fn stats_text(state: &AppState) -> String {
    match state.selected_match() {
        Some(m) => {
            let time = if m.status.is_live() {
                format!("{}'", m.minute)
            } else {
                "FT".to_string()
            };
            let mut lines = vec![
                format!("Time: {time}"),
                format!("Score: {}-{}", m.score_home, m.score_away),
            ];
            if let Some(detail) = state.match_detail.get(&m.id) {
                for row in detail.stats.iter().take(6) {
                    lines.push(format!("{}: {}-{}", row.name, row.home, row.away));
                }
            }
            lines.join("\n")
        }
        None => "No match selected".to_string(),
    }
}

fn render_lineups(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Lineups").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let detail = state
        .selected_match_id()
        .and_then(|id| state.match_detail.get(&id).cloned());
    let Some(detail) = detail else {
        frame.render_widget(Paragraph::new("No lineups yet"), inner);
        return;
    };
    let Some(lineups) = &detail.lineups else {
        frame.render_widget(Paragraph::new("No lineups yet"), inner);
        return;
    };

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    render_lineup_side(frame, cols[0], lineups.sides.first());
    render_lineup_side(frame, cols[1], lineups.sides.get(1));
}

fn render_lineup_side(frame: &mut Frame, area: Rect, side: Option<&LineupSide>) {
    let text = if let Some(side) = side {
        lineup_text(side)
    } else {
        "No lineup".to_string()
    };
    frame.render_widget(Paragraph::new(text), area);
}

fn lineup_text(side: &LineupSide) -> String {
    let mut lines = Vec::new();
    let heading = if side.formation.is_empty() {
        side.team_abbr.clone()
    } else {
        format!("{} ({})", side.team_abbr, side.formation)
    };
    lines.push(heading);
    if let Some(coach) = &side.coach {
        lines.push(format!("Coach {coach}"));
    }
    lines.push("Starters:".to_string());
    for player in &side.starting {
        lines.push(format_player(player));
    }
    lines.push("Subs:".to_string());
    for player in &side.subs {
        lines.push(format_player(player));
    }
    lines.join("\n")
}

fn format_player(player: &state::PlayerSlot) -> String {
    let num = player
        .number
        .map(|n| format!("{n:>2}"))
        .unwrap_or_else(|| "--".to_string());
    match player.pos.as_deref() {
        Some(pos) if !pos.is_empty() => {
            format!("{num} {} {}", player.name, Role::from_provider(pos).short())
        }
        _ => format!("{num} {}", player.name),
    }
}

fn event_tape_text(state: &AppState) -> String {
    let Some(match_id) = state.selected_match_id() else {
        return "No match selected".to_string();
    };
    let Some(detail) = state.match_detail.get(&match_id) else {
        return "No events yet".to_string();
    };
    if detail.events.is_empty() {
        return "No events yet".to_string();
    }

    let start = detail.events.len().saturating_sub(6);
    detail.events[start..]
        .iter()
        .map(|event| {
            let who = match (&event.player, &event.assist) {
                (Some(player), Some(assist)) => format!(" {player} ({assist})"),
                (Some(player), None) => format!(" {player}"),
                _ => String::new(),
            };
            format!(
                "{}' {} {}{} {}",
                event.minute,
                event_kind_label(event.kind),
                event.team,
                who,
                event.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = standings_columns();
    render_standings_header(frame, sections[0], &widths);

    let list_area = sections[1];
    if state.standings.is_empty() {
        let text = if state.standings_loading {
            "Loading standings..."
        } else {
            "No standings yet"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.standings_selected, state.standings.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.standings_selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let Some(row) = state.standings.get(idx) else {
            continue;
        };
        render_cell_text(frame, cols[0], &row.rank.to_string(), row_style);
        render_cell_text(frame, cols[1], &row.team, row_style);
        render_cell_text(frame, cols[2], &row.played.to_string(), row_style);
        render_cell_text(
            frame,
            cols[3],
            &format!("{}-{}-{}", row.win, row.draw, row.lose),
            row_style,
        );
        render_cell_text(frame, cols[4], &format!("{:+}", row.goal_diff), row_style);
        render_cell_text(frame, cols[5], &row.points.to_string(), row_style);
        render_cell_text(frame, cols[6], row.form.as_deref().unwrap_or("-"), row_style);
    }
}

fn standings_columns() -> [Constraint; 7] {
    [
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(4),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(8),
    ]
}

fn render_standings_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "#", style);
    render_cell_text(frame, cols[1], "Team", style);
    render_cell_text(frame, cols[2], "P", style);
    render_cell_text(frame, cols[3], "W-D-L", style);
    render_cell_text(frame, cols[4], "GD", style);
    render_cell_text(frame, cols[5], "Pts", style);
    render_cell_text(frame, cols[6], "Form", style);
}

fn render_squad(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .squad_team
        .as_deref()
        .map(|team| format!("Squad - {team}"))
        .unwrap_or_else(|| "Squad".to_string());
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let Some(squad) = state.current_squad() else {
        let text = if state.squad_loading {
            "Loading squad..."
        } else {
            "No squad loaded"
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };
    if squad.members.is_empty() {
        let text = if state.squad_loading {
            "Loading squad..."
        } else {
            "Squad unavailable"
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.squad_selected, squad.members.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let selected = idx == state.squad_selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let Some(member) = squad.members.get(idx) else {
            continue;
        };
        let number = member
            .number
            .map(|n| format!("{n:>2}"))
            .unwrap_or_else(|| "--".to_string());
        let age = member
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!(
            "{number} {:<24} {} age {age}",
            member.name,
            member.role.short()
        );
        render_cell_text(frame, row_area, &line, row_style);
    }
}

fn event_kind_label(kind: state::EventKind) -> &'static str {
    match kind {
        state::EventKind::Goal => "GOAL",
        state::EventKind::Card => "CARD",
        state::EventKind::Sub => "SUB",
        state::EventKind::Var => "VAR",
    }
}

fn sort_label(sort: state::SortMode) -> &'static str {
    match sort {
        state::SortMode::Time => "TIME",
        state::SortMode::Kickoff => "KICKOFF",
        state::SortMode::League => "LEAGUE",
    }
}

fn pulse_view_label(view: PulseView) -> &'static str {
    match view {
        PulseView::Live => "LIVE",
        PulseView::Upcoming => "UPCOMING",
    }
}

fn format_kickoff(raw: &str) -> String {
    if raw.is_empty() {
        return "TBD".to_string();
    }
    let cleaned = raw.trim();
    if let Some(dt) = parse_kickoff(cleaned) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if cleaned.len() >= 16 {
        return cleaned[..16].replace('T', " ");
    }
    cleaned.replace('T', " ")
}

fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
    ];

    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    None
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Pitchside - Help",
        "",
        "Global:",
        "  1            Pulse",
        "  2            Standings",
        "  Enter / d    Open match / squad",
        "  b / Esc      Back",
        "  l            League toggle",
        "  u            Upcoming view",
        "  i            Fetch match details",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  j/k or arrows  Move/scroll",
        "  s              Cycle sort mode (Pulse)",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
