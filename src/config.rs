use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::SheetSource;

const APP_DIR: &str = "court-tui";

static DOC_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("valid sheet url pattern"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Live tournament schedule from a shared spreadsheet", long_about = None)]
pub struct Args {
    /// Spreadsheet id, or the sheet's share URL
    pub doc: String,

    /// Tab (sheet) name to read instead of the first one
    #[arg(long)]
    pub sheet: Option<String>,

    /// Update interval in seconds
    #[arg(short, long, default_value_t = 30)]
    pub interval: u64,

    /// Seconds to wait for the spreadsheet before giving up on a load
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Preferences file (theme)
    #[arg(long)]
    pub prefs: Option<PathBuf>,

    /// Diagnostics log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn source(&self) -> SheetSource {
        SheetSource {
            doc_id: doc_id(&self.doc),
            sheet: self.sheet.clone().filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(1))
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.prefs.clone().unwrap_or_else(|| app_dir().join("prefs.json"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| app_dir().join("court-tui.log"))
    }
}

/// Accepts a bare id or a full share URL.
pub fn doc_id(input: &str) -> String {
    let input = input.trim();
    DOC_URL
        .captures(input)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| input.to_string())
}

fn app_dir() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_from_url_or_id() {
        assert_eq!(
            doc_id("https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=0"),
            "1AbC-d_9"
        );
        assert_eq!(doc_id(" 1AbC-d_9 "), "1AbC-d_9");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["court-tui", "DOC"]);
        assert_eq!(args.interval(), Duration::from_secs(30));
        assert_eq!(args.timeout(), Duration::from_secs(10));
        assert_eq!(
            args.source(),
            SheetSource {
                doc_id: "DOC".into(),
                sheet: None
            }
        );
        assert!(args.prefs_path().ends_with("court-tui/prefs.json"));
    }

    #[test]
    fn test_args_sheet_override() {
        let args = Args::parse_from(["court-tui", "DOC", "--sheet", "Day 2", "-i", "0", "--prefs", "/tmp/p.json"]);
        assert_eq!(args.source().sheet.as_deref(), Some("Day 2"));
        assert_eq!(args.interval(), Duration::from_secs(1));
        assert_eq!(args.prefs_path(), PathBuf::from("/tmp/p.json"));
    }
}
