//! Turns parsed rounds into the transposed schedule grid: one row per court,
//! one column per time slot. Drawing lives in `ui`; this module only decides
//! what goes in each cell.

use crate::model::{Matchup, Round};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    /// Both teams empty: nothing scheduled here.
    Unscheduled,
    /// Hidden by the active team filter.
    Filtered,
    Game {
        team_a: String,
        team_b: String,
        score_a: String,
        score_b: String,
        has_scores: bool,
        winner: Option<Side>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtRow {
    pub court: String,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridView {
    /// No round has a time label.
    NoRounds,
    /// The filter team plays on no court.
    NoMatches { team: String },
    Grid {
        times: Vec<String>,
        rows: Vec<CourtRow>,
    },
}

pub fn valid_rounds(rounds: &[Round]) -> Vec<&Round> {
    rounds.iter().filter(|r| r.is_valid()).collect()
}

/// A game is treated as decided only once the following valid round has any
/// team entered.
pub fn show_winner(valid: &[&Round], index: usize) -> bool {
    valid.get(index + 1).is_some_and(|next| next.has_teams())
}

pub fn winner(score_a: &str, score_b: &str) -> Option<Side> {
    if score_a.is_empty() || score_b.is_empty() {
        return None;
    }
    let a: f64 = score_a.trim().parse().ok()?;
    let b: f64 = score_b.trim().parse().ok()?;
    if a > b {
        Some(Side::A)
    } else if b > a {
        Some(Side::B)
    } else {
        None
    }
}

fn cell_for(matchup: &Matchup, filter: &str, decided: bool) -> GridCell {
    if matchup.is_empty() {
        return GridCell::Unscheduled;
    }
    if !filter.is_empty() && !matchup.involves(filter) {
        return GridCell::Filtered;
    }
    GridCell::Game {
        team_a: matchup.team_a.clone(),
        team_b: matchup.team_b.clone(),
        score_a: matchup.score_a.clone(),
        score_b: matchup.score_b.clone(),
        has_scores: matchup.has_scores,
        winner: if decided {
            winner(&matchup.score_a, &matchup.score_b)
        } else {
            None
        },
    }
}

pub fn build_grid(rounds: &[Round], filter: &str) -> GridView {
    let valid = valid_rounds(rounds);
    let Some(first) = valid.first() else {
        return GridView::NoRounds;
    };

    let times = valid.iter().map(|r| r.time.clone()).collect();
    let decided: Vec<bool> = (0..valid.len()).map(|i| show_winner(&valid, i)).collect();

    let rows: Vec<CourtRow> = first
        .matchups
        .iter()
        .enumerate()
        .filter(|(court_idx, _)| {
            filter.is_empty()
                || valid
                    .iter()
                    .any(|r| r.matchups.get(*court_idx).is_some_and(|m| m.involves(filter)))
        })
        .map(|(court_idx, m)| CourtRow {
            court: m.court.clone(),
            cells: valid
                .iter()
                .zip(&decided)
                .map(|(round, &decided)| match round.matchups.get(court_idx) {
                    Some(matchup) => cell_for(matchup, filter, decided),
                    None => GridCell::Unscheduled,
                })
                .collect(),
        })
        .collect();

    if rows.is_empty() && !filter.is_empty() {
        return GridView::NoMatches {
            team: filter.to_string(),
        };
    }

    GridView::Grid { times, rows }
}

/// Scroll position of the grid, kept across refreshes and clamped to
/// whatever the newest grid holds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GridScroll {
    pub row: usize,
    pub col: usize,
}

impl GridScroll {
    pub fn clamped(self, rows: usize, cols: usize) -> Self {
        Self {
            row: self.row.min(rows.saturating_sub(1)),
            col: self.col.min(cols.saturating_sub(1)),
        }
    }

    pub fn scroll_cols(&mut self, delta: isize, cols: usize) {
        self.col = step(self.col, delta, cols);
    }

    pub fn scroll_rows(&mut self, delta: isize, rows: usize) {
        self.row = step(self.row, delta, rows);
    }
}

fn step(pos: usize, delta: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    pos.saturating_add_signed(delta).min(max)
}
