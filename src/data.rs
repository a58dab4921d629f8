use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;
use crate::model::{QueryError, QueryResponse, RawTable};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Which spreadsheet (and optionally which tab) to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSource {
    pub doc_id: String,
    pub sheet: Option<String>,
}

pub struct SheetClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl SheetClient {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(SHEETS_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn query_url(&self, source: &SheetSource) -> String {
        format!("{}/{}/gviz/tq", self.base_url.trim_end_matches('/'), source.doc_id)
    }

    /// One read of the sheet. `req_id` is echoed by the service and tags the
    /// request in the logs.
    pub async fn fetch_table(&self, source: &SheetSource, req_id: u64) -> Result<RawTable, FetchError> {
        with_timeout(self.timeout, self.request(source, req_id)).await
    }

    async fn request(&self, source: &SheetSource, req_id: u64) -> Result<RawTable, FetchError> {
        let url = self.query_url(source);
        let mut query = vec![("tqx", format!("out:json;reqId:{}", req_id))];
        if let Some(sheet) = &source.sheet {
            query.push(("sheet", sheet.clone()));
        }
        debug!(%url, req_id, "requesting sheet");

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Remote(format!("HTTP {}", status.as_u16())));
        }
        let body = resp.text().await?;
        decode_response(&body)
    }
}

/// Races `fut` against `limit`. The losing request future is dropped, which
/// cancels it.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| FetchError::Timeout(limit))?
}

/// Decodes a query response body, which may arrive wrapped in a
/// `setResponse(...)` call.
pub fn decode_response(body: &str) -> Result<RawTable, FetchError> {
    let json = unwrap_envelope(body)
        .ok_or_else(|| FetchError::Malformed("no JSON object in response".to_string()))?;
    let resp: QueryResponse = serde_json::from_str(json)?;
    if resp.status != "ok" {
        return Err(FetchError::Remote(remote_message(&resp.errors)));
    }
    Ok(resp.table.unwrap_or_default())
}

fn unwrap_envelope(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

pub fn remote_message(errors: &[QueryError]) -> String {
    errors
        .first()
        .and_then(|e| {
            e.detailed_message
                .as_deref()
                .filter(|m| !m.is_empty())
                .or(e.message.as_deref().filter(|m| !m.is_empty()))
        })
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
