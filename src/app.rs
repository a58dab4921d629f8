use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;
use tracing::debug;

use crate::grid::{build_grid, valid_rounds, GridScroll, GridView};
use crate::model::{Court, Round};
use crate::parser::collect_teams;
use crate::refresh::LoadEvent;
use crate::theme::Theme;

pub const RETRY_MESSAGE: &str = "Connection problem, retrying…";

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Live { updated: DateTime<Local> },
    Error,
}

impl Status {
    pub fn text(&self) -> String {
        match self {
            Status::Idle => "Waiting…".to_string(),
            Status::Loading => "Loading…".to_string(),
            Status::Live { updated } => format!("Live · updated {}", updated.format("%-I:%M:%S %p")),
            Status::Error => RETRY_MESSAGE.to_string(),
        }
    }
}

/// What the key handler wants the outside world to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Refresh,
    SaveTheme(Theme),
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub title: String,
    pub courts: Vec<Court>,
    pub rounds: Vec<Round>,
    pub teams: Vec<String>,
    /// Index 0 is "All teams", `i` is `teams[i - 1]`.
    pub team_state: ListState,
    pub status: Status,
    pub load_error: Option<String>,
    pub scroll: GridScroll,
    pub theme: Theme,
    pending_req: Option<u64>,
}

impl App {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        let mut team_state = ListState::default();
        team_state.select(Some(0));
        Self {
            should_quit: false,
            title: title.into(),
            courts: Vec::new(),
            rounds: Vec::new(),
            teams: Vec::new(),
            team_state,
            status: Status::Idle,
            load_error: None,
            scroll: GridScroll::default(),
            theme,
            pending_req: None,
        }
    }

    pub fn filter(&self) -> &str {
        match self.team_state.selected() {
            Some(i) if i > 0 => self.teams.get(i - 1).map(String::as_str).unwrap_or(""),
            _ => "",
        }
    }

    pub fn grid(&self) -> GridView {
        build_grid(&self.rounds, self.filter())
    }

    pub fn apply(&mut self, event: LoadEvent) {
        debug!(req_id = event.req_id(), pending = ?self.pending_req, "load event");
        match event {
            LoadEvent::Started { req_id } => {
                self.pending_req = Some(req_id);
                self.status = Status::Loading;
            }
            LoadEvent::Loaded { req_id, schedule } => {
                if self.pending_req != Some(req_id) {
                    debug!(req_id, "dropping stale load");
                    return;
                }
                self.pending_req = None;
                let filter = self.filter().to_string();
                self.courts = schedule.courts;
                self.rounds = schedule.rounds;
                self.teams = collect_teams(&self.rounds);
                let selected = self
                    .teams
                    .iter()
                    .position(|t| *t == filter)
                    .map(|i| i + 1)
                    .unwrap_or(0);
                self.team_state.select(Some(selected));
                self.load_error = None;
                self.status = Status::Live { updated: Local::now() };
            }
            LoadEvent::Failed { req_id, error } => {
                if self.pending_req != Some(req_id) {
                    debug!(req_id, "dropping stale failure");
                    return;
                }
                self.pending_req = None;
                self.load_error = Some(error);
                self.status = Status::Error;
            }
        }
    }

    pub fn on_key(&mut self, code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => return Some(Action::Refresh),
            KeyCode::Char('d') => {
                self.theme = self.theme.toggled();
                return Some(Action::SaveTheme(self.theme));
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Right | KeyCode::Char('l') => self.scroll_cols(1),
            KeyCode::Left | KeyCode::Char('h') => self.scroll_cols(-1),
            KeyCode::PageDown => self.scroll_rows(1),
            KeyCode::PageUp => self.scroll_rows(-1),
            _ => {}
        }
        None
    }

    fn option_count(&self) -> usize {
        self.teams.len() + 1
    }

    fn next(&mut self) {
        let i = match self.team_state.selected() {
            Some(i) => {
                if i >= self.option_count() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.team_state.select(Some(i));
    }

    fn previous(&mut self) {
        let i = match self.team_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.option_count() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.team_state.select(Some(i));
    }

    fn grid_size(&self) -> (usize, usize) {
        match self.grid() {
            GridView::Grid { times, rows } => (rows.len(), times.len()),
            _ => (0, valid_rounds(&self.rounds).len()),
        }
    }

    fn scroll_cols(&mut self, delta: isize) {
        let (_, cols) = self.grid_size();
        self.scroll.scroll_cols(delta, cols);
    }

    fn scroll_rows(&mut self, delta: isize) {
        let (rows, _) = self.grid_size();
        self.scroll.scroll_rows(delta, rows);
    }
}
