use std::cmp::Ordering;
use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::model::{Court, Matchup, RawCell, RawRow, RawTable, Round, Schedule};

const TIME_COL: usize = 1;
const FIRST_COURT_COL: usize = 2;

static COURT_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Court\s+\d+)\s+(.+)$").expect("valid court header pattern"));
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits pattern"));

enum CourtField {
    TeamA,
    TeamB,
    ScoreA,
    ScoreB,
}

fn classify(suffix: &str) -> Option<CourtField> {
    match suffix.trim().to_lowercase().as_str() {
        "team a" | "a" => Some(CourtField::TeamA),
        "team b" | "b" => Some(CourtField::TeamB),
        "score a" => Some(CourtField::ScoreA),
        "score b" => Some(CourtField::ScoreB),
        _ => None,
    }
}

fn court_number(name: &str) -> u64 {
    DIGITS
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Maps header labels to courts, sorted by court number.
pub fn parse_courts(headers: &[String]) -> Vec<Court> {
    let mut courts: Vec<Court> = Vec::new();

    for (index, header) in headers.iter().enumerate().skip(FIRST_COURT_COL) {
        let Some(caps) = COURT_HEADER.captures(header.trim()) else {
            continue;
        };
        let name = caps[1].to_string();
        let Some(field) = classify(&caps[2]) else {
            continue;
        };

        let pos = match courts.iter().position(|c| c.name == name) {
            Some(pos) => pos,
            None => {
                courts.push(Court {
                    name,
                    ..Court::default()
                });
                courts.len() - 1
            }
        };
        let court = &mut courts[pos];

        let slot = match field {
            CourtField::TeamA => &mut court.team_a_col,
            CourtField::TeamB => &mut court.team_b_col,
            CourtField::ScoreA => {
                court.has_scores = true;
                &mut court.score_a_col
            }
            CourtField::ScoreB => {
                court.has_scores = true;
                &mut court.score_b_col
            }
        };
        slot.get_or_insert(index);
    }

    courts.sort_by_key(|c| court_number(&c.name));
    courts
}

/// Decodes every row of the table against a court schema derived once from
/// its headers.
pub fn parse_schedule(table: &RawTable) -> Schedule {
    let courts = parse_courts(&table.headers());
    let rounds = table
        .rows
        .iter()
        .map(|row| parse_row(row, &courts))
        .collect();
    Schedule { courts, rounds }
}

pub fn parse_rounds(table: &RawTable) -> Vec<Round> {
    parse_schedule(table).rounds
}

fn parse_row(row: &RawRow, courts: &[Court]) -> Round {
    let matchups = courts
        .iter()
        .map(|court| {
            let (score_a, score_b) = if court.has_scores {
                (cell_text(row, court.score_a_col), cell_text(row, court.score_b_col))
            } else {
                (String::new(), String::new())
            };
            Matchup {
                court: court.name.clone(),
                has_scores: court.has_scores,
                team_a: cell_text(row, court.team_a_col),
                team_b: cell_text(row, court.team_b_col),
                score_a,
                score_b,
            }
        })
        .collect();

    Round {
        time: time_text(row.cell(TIME_COL)),
        matchups,
    }
}

fn cell_text(row: &RawRow, col: Option<usize>) -> String {
    col.and_then(|c| row.cell(c))
        .and_then(|cell| cell.v.as_ref())
        .map(|v| value_text(v).trim().to_string())
        .unwrap_or_default()
}

fn time_text(cell: Option<&RawCell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    if let Some(formatted) = &cell.f {
        return formatted.trim().to_string();
    }
    match &cell.v {
        Some(v) => time_of_day(v).unwrap_or_else(|| value_text(v).trim().to_string()),
        None => String::new(),
    }
}

/// Renders a `[hour, minute, second, millisecond]` value as `9AM` or `1:30PM`.
pub fn time_of_day(value: &Value) -> Option<String> {
    let parts = value.as_array()?;
    if parts.len() != 4 {
        return None;
    }
    let hour = parts[0].as_f64()? as i64;
    let minute = parts[1].as_f64()? as i64;

    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let h12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    if minute == 0 {
        Some(format!("{}{}", h12, suffix))
    } else {
        Some(format!("{}:{:02}{}", h12, minute, suffix))
    }
}

/// Stringifies a cell value the way the sheet displays it: `21.0` as `21`.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Distinct non-empty team names in display order.
pub fn collect_teams(rounds: &[Round]) -> Vec<String> {
    let names: BTreeSet<&str> = rounds
        .iter()
        .flat_map(|r| r.matchups.iter())
        .flat_map(|m| [m.team_a.as_str(), m.team_b.as_str()])
        .filter(|name| !name.is_empty())
        .collect();

    let mut teams: Vec<String> = names.into_iter().map(str::to_string).collect();
    teams.sort_by(|a, b| locale_cmp(a, b));
    teams
}

/// Case-insensitive ordering with an exact tie-break, close to how a
/// user-facing locale sorts names.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn table(value: Value) -> RawTable {
        serde_json::from_value(value).expect("valid table fixture")
    }

    #[test]
    fn test_parse_courts_orders_numerically() {
        let courts = parse_courts(&headers(&[
            "",
            "Time",
            "Court 2 Team A",
            "Court 2 Score A",
            "Court 2 Team B",
            "Court 2 Score B",
            "Court 10 A",
            "Court 10 B",
        ]));

        assert_eq!(courts.len(), 2);
        assert_eq!(courts[0].name, "Court 2");
        assert!(courts[0].has_scores);
        assert_eq!(courts[0].team_a_col, Some(2));
        assert_eq!(courts[0].score_a_col, Some(3));
        assert_eq!(courts[0].team_b_col, Some(4));
        assert_eq!(courts[0].score_b_col, Some(5));
        assert_eq!(courts[1].name, "Court 10");
        assert!(!courts[1].has_scores);
        assert_eq!(courts[1].team_a_col, Some(6));
        assert_eq!(courts[1].team_b_col, Some(7));
    }

    #[test]
    fn test_parse_courts_skips_reserved_and_unknown_columns() {
        let courts = parse_courts(&headers(&[
            "Court 9 Team A",
            "Court 8 Team A",
            "Notes",
            "court 3 team a",
            "Court 3 Referee",
            "Court 4",
        ]));
        assert_eq!(courts.len(), 1);
        assert_eq!(courts[0].name, "court 3");
        assert_eq!(courts[0].team_a_col, Some(3));
        assert_eq!(courts[0].team_b_col, None);
    }

    #[test]
    fn test_parse_courts_first_column_wins() {
        let courts = parse_courts(&headers(&["", "Time", "Court 1 A", "Court 1 Team A"]));
        assert_eq!(courts.len(), 1);
        assert_eq!(courts[0].team_a_col, Some(2));
    }

    #[test]
    fn test_time_of_day_formatting() {
        assert_eq!(time_of_day(&json!([9, 0, 0, 0])).as_deref(), Some("9AM"));
        assert_eq!(time_of_day(&json!([13, 30, 0, 0])).as_deref(), Some("1:30PM"));
        assert_eq!(time_of_day(&json!([0, 0, 0, 0])).as_deref(), Some("12AM"));
        assert_eq!(time_of_day(&json!([12, 5, 0, 0])).as_deref(), Some("12:05PM"));
        assert_eq!(time_of_day(&json!([9, 0])), None);
        assert_eq!(time_of_day(&json!("9AM")), None);
    }

    #[test]
    fn test_time_cell_tiers() {
        let t = table(json!({
            "cols": [{"label": ""}, {"label": "Time"}],
            "rows": [
                {"c": [null, {"v": [9, 0, 0, 0], "f": " 9:00 AM "}]},
                {"c": [null, {"v": [14, 15, 0, 0]}]},
                {"c": [null, {"v": " Noon "}]},
                {"c": [null, null]},
                {"c": [null]}
            ]
        }));
        let times: Vec<String> = parse_rounds(&t).into_iter().map(|r| r.time).collect();
        assert_eq!(times, vec!["9:00 AM", "2:15PM", "Noon", "", ""]);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!(21.0)), "21");
        assert_eq!(value_text(&json!(21)), "21");
        assert_eq!(value_text(&json!(2.5)), "2.5");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!("Red")), "Red");
        assert_eq!(value_text(&Value::Null), "");
    }

    #[test]
    fn test_parse_rounds_matches_schema() {
        let t = table(json!({
            "cols": [
                {"label": "Notes"}, {"label": "Time"},
                {"label": "Court 1 Team A"}, {"label": "Court 1 Score A"},
                {"label": "Court 1 Team B"}, {"label": "Court 1 Score B"},
                {"label": "Court 2 A"}, {"label": "Court 2 B"}
            ],
            "rows": [
                {"c": [null, {"v": [10, 0, 0, 0]}, {"v": " Red "}, {"v": 21.0}, {"v": "Blue"}, {"v": 18.0}, {"v": "Green"}, {"v": "Gold"}]},
                {"c": [null, {"v": [11, 0, 0, 0]}, {"v": "Gold"}]},
                {"c": []}
            ]
        }));

        let schedule = parse_schedule(&t);
        assert_eq!(schedule.courts.len(), 2);
        assert_eq!(schedule.rounds.len(), 3);
        for round in &schedule.rounds {
            assert_eq!(round.matchups.len(), schedule.courts.len());
            assert_eq!(round.matchups[0].court, "Court 1");
            assert_eq!(round.matchups[1].court, "Court 2");
        }

        let first = &schedule.rounds[0];
        assert_eq!(first.time, "10AM");
        assert_eq!(first.matchups[0].team_a, "Red");
        assert_eq!(first.matchups[0].score_a, "21");
        assert_eq!(first.matchups[0].team_b, "Blue");
        assert_eq!(first.matchups[0].score_b, "18");
        assert!(first.matchups[0].has_scores);
        assert_eq!(first.matchups[1].team_a, "Green");
        assert!(!first.matchups[1].has_scores);
        assert_eq!(first.matchups[1].score_a, "");

        let second = &schedule.rounds[1];
        assert_eq!(second.matchups[0].team_a, "Gold");
        assert_eq!(second.matchups[0].team_b, "");
        assert_eq!(second.matchups[0].score_a, "");

        assert_eq!(schedule.rounds[2].time, "");
        assert!(!schedule.rounds[2].is_valid());
    }

    #[test]
    fn test_courts_without_score_columns_ignore_score_like_cells() {
        let t = table(json!({
            "cols": [{"label": ""}, {"label": "Time"}, {"label": "Court 5 A"}, {"label": "Court 5 B"}, {"label": "Court 5 Points"}],
            "rows": [{"c": [null, {"v": "9AM"}, {"v": "Red"}, {"v": "Blue"}, {"v": 3}]}]
        }));
        let rounds = parse_rounds(&t);
        assert_eq!(rounds[0].matchups[0].score_a, "");
        assert_eq!(rounds[0].matchups[0].score_b, "");
    }

    #[test]
    fn test_collect_teams_sorted_and_distinct() {
        let round = |pairs: &[(&str, &str)]| Round {
            time: "9AM".into(),
            matchups: pairs
                .iter()
                .map(|(a, b)| Matchup {
                    team_a: a.to_string(),
                    team_b: b.to_string(),
                    ..Matchup::default()
                })
                .collect(),
        };
        let rounds = vec![
            round(&[("Red", "blue"), ("", "")]),
            round(&[("Blue", "Red"), ("amber", "")]),
        ];
        assert_eq!(collect_teams(&rounds), vec!["amber", "blue", "Blue", "Red"]);
    }
}
