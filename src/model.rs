use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub req_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub errors: Vec<QueryError>,
    #[serde(default)]
    pub table: Option<RawTable>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryError {
    pub reason: Option<String>,
    pub message: Option<String>,
    pub detailed_message: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    #[serde(default)]
    pub cols: Vec<RawColumn>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub id: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_field: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    #[serde(default)]
    pub c: Vec<Option<RawCell>>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCell {
    pub v: Option<Value>,
    pub f: Option<String>,
}

impl RawTable {
    /// Column labels in order, missing labels as empty strings.
    pub fn headers(&self) -> Vec<String> {
        self.cols
            .iter()
            .map(|c| c.label.clone().unwrap_or_default())
            .collect()
    }
}

impl RawRow {
    pub fn cell(&self, index: usize) -> Option<&RawCell> {
        self.c.get(index).and_then(|c| c.as_ref())
    }
}

/// A playing area and the sheet columns that carry its data.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Court {
    pub name: String,
    pub has_scores: bool,
    pub team_a_col: Option<usize>,
    pub team_b_col: Option<usize>,
    pub score_a_col: Option<usize>,
    pub score_b_col: Option<usize>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub court: String,
    pub has_scores: bool,
    pub team_a: String,
    pub team_b: String,
    pub score_a: String,
    pub score_b: String,
}

impl Matchup {
    pub fn is_empty(&self) -> bool {
        self.team_a.is_empty() && self.team_b.is_empty()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.team_a == team || self.team_b == team
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub time: String,
    pub matchups: Vec<Matchup>,
}

impl Round {
    pub fn is_valid(&self) -> bool {
        !self.time.is_empty()
    }

    pub fn has_teams(&self) -> bool {
        self.matchups.iter().any(|m| !m.is_empty())
    }
}

/// One parse pass: the court schema and every row decoded against it.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub courts: Vec<Court>,
    pub rounds: Vec<Round>,
}
