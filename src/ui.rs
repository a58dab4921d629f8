use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Status};
use crate::grid::{CourtRow, GridCell, GridScroll, GridView, Side};
use crate::theme::Palette;

const COURT_COL_WIDTH: u16 = 10;
const TIME_COL_WIDTH: u16 = 22;
const HELP: &str = " q quit  j/k team  h/l time  PgUp/PgDn courts  r refresh  d theme ";

pub fn ui(f: &mut Frame, app: &mut App) {
    let palette = app.theme.palette();
    let size = f.area();
    f.render_widget(Block::default().style(palette.base), size);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(size);

    draw_sidebar(f, app, chunks[0], &palette);
    draw_main_panel(f, app, chunks[1], &palette);
}

fn draw_sidebar(f: &mut Frame, app: &mut App, area: Rect, palette: &Palette) {
    let items: Vec<ListItem> = std::iter::once(ListItem::new("All teams"))
        .chain(app.teams.iter().map(|t| ListItem::new(t.as_str())))
        .collect();

    let title = if app.filter().is_empty() { " TEAMS " } else { " TEAM FILTER " };

    let teams_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(palette.highlight);

    f.render_stateful_widget(teams_list, area, &mut app.team_state);
}

fn draw_main_panel(f: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let title = match app.courts.len() {
        0 => format!(" {} ", app.title),
        n => format!(" {} · {} courts ", app.title, n),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // Status
                Constraint::Length(1), // Spacer
                Constraint::Min(0),    // Schedule
                Constraint::Length(1), // Help
            ]
            .as_ref(),
        )
        .split(inner_area);

    f.render_widget(Paragraph::new(status_line(&app.status, palette)), chunks[0]);

    if let Some(err) = &app.load_error {
        let p = Paragraph::new(format!("Could not load the schedule: {}", err))
            .style(Style::default().fg(palette.error))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(p, chunks[2]);
    } else {
        match app.grid() {
            GridView::NoRounds => {
                let message = match app.status {
                    Status::Idle | Status::Loading if app.rounds.is_empty() => "Loading schedule…",
                    _ => "No games scheduled yet.",
                };
                empty_state(f, chunks[2], message, palette);
            }
            GridView::NoMatches { team } => {
                empty_state(f, chunks[2], &format!("No matches for {}.", team), palette);
            }
            GridView::Grid { times, rows } => {
                draw_grid(f, chunks[2], &times, &rows, app.scroll, palette);
            }
        }
    }

    f.render_widget(Paragraph::new(HELP).style(palette.muted), chunks[3]);
}

fn status_line<'a>(status: &Status, palette: &Palette) -> Line<'a> {
    let color = match status {
        Status::Idle => palette.muted.fg.unwrap_or_default(),
        Status::Loading => palette.loading,
        Status::Live { .. } => palette.live,
        Status::Error => palette.error,
    };
    Line::from(vec![
        Span::styled(" ● ", Style::default().fg(color)),
        Span::styled(status.text(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn empty_state(f: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let p = Paragraph::new(message.to_string())
        .style(palette.muted)
        .alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn draw_grid(f: &mut Frame, area: Rect, times: &[String], rows: &[CourtRow], scroll: GridScroll, palette: &Palette) {
    let scroll = scroll.clamped(rows.len(), times.len());
    let fit = (area.width.saturating_sub(COURT_COL_WIDTH) / (TIME_COL_WIDTH + 1)).max(1) as usize;
    let first_col = scroll.col;
    let last_col = (first_col + fit).min(times.len());

    let header = Row::new(
        std::iter::once(Cell::from("Court"))
            .chain(times[first_col..last_col].iter().map(|t| Cell::from(t.as_str())))
            .collect::<Vec<_>>(),
    )
    .style(palette.header)
    .bottom_margin(1);

    let body: Vec<Row> = rows
        .iter()
        .skip(scroll.row)
        .map(|row| {
            let cells = std::iter::once(Cell::from(Span::styled(row.court.as_str(), palette.court)))
                .chain(row.cells[first_col..last_col.min(row.cells.len())].iter().map(|c| grid_cell(c, palette)));
            Row::new(cells.collect::<Vec<_>>()).height(2).bottom_margin(1)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(COURT_COL_WIDTH))
        .chain((first_col..last_col).map(|_| Constraint::Length(TIME_COL_WIDTH)))
        .collect::<Vec<_>>();

    let title = if times.len() > fit || scroll.row > 0 {
        format!(
            " times {}-{} of {} · courts from {} ",
            first_col + 1,
            last_col,
            times.len(),
            scroll.row + 1
        )
    } else {
        String::new()
    };

    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).title_style(palette.muted));
    f.render_widget(table, area);
}

fn grid_cell<'a>(cell: &'a GridCell, palette: &Palette) -> Cell<'a> {
    match cell {
        GridCell::Unscheduled => Cell::from(Span::styled("—", palette.muted)),
        GridCell::Filtered => Cell::from(""),
        GridCell::Game {
            team_a,
            team_b,
            score_a,
            score_b,
            has_scores,
            winner,
        } => {
            let side = |team: &'a str, score: &'a str, won: bool| {
                let style = if won { palette.winner } else { Style::default() };
                let mut spans = vec![Span::styled(team, style)];
                if *has_scores && !score.is_empty() {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(score, style));
                }
                Line::from(spans)
            };
            Cell::from(Text::from(vec![
                side(team_a.as_str(), score_a.as_str(), *winner == Some(Side::A)),
                side(team_b.as_str(), score_b.as_str(), *winner == Some(Side::B)),
            ]))
        }
    }
}
