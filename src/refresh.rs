use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::data::{SheetClient, SheetSource};
use crate::model::Schedule;
use crate::parser::parse_schedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    /// Skip the rest of the wait and load now.
    Now,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Started { req_id: u64 },
    Loaded { req_id: u64, schedule: Schedule },
    Failed { req_id: u64, error: String },
}

impl LoadEvent {
    pub fn req_id(&self) -> u64 {
        match self {
            LoadEvent::Started { req_id }
            | LoadEvent::Loaded { req_id, .. }
            | LoadEvent::Failed { req_id, .. } => *req_id,
        }
    }
}

/// Load, wait, repeat. The wait only starts once a load has finished, so two
/// loads never overlap; a `Now` command cuts the wait short and the next wait
/// is measured from that load. Ends when either channel closes.
pub async fn run_refresh_loop(
    client: SheetClient,
    source: SheetSource,
    interval: Duration,
    mut commands: mpsc::Receiver<RefreshCommand>,
    events: mpsc::Sender<LoadEvent>,
) {
    let mut req_id = 0u64;

    loop {
        req_id += 1;
        if events.send(LoadEvent::Started { req_id }).await.is_err() {
            break;
        }

        let event = match client.fetch_table(&source, req_id).await {
            Ok(table) => {
                let schedule = parse_schedule(&table);
                info!(
                    req_id,
                    courts = schedule.courts.len(),
                    rounds = schedule.rounds.len(),
                    "schedule loaded"
                );
                LoadEvent::Loaded { req_id, schedule }
            }
            Err(e) => {
                warn!(req_id, error = %e, "schedule load failed");
                LoadEvent::Failed {
                    req_id,
                    error: e.to_string(),
                }
            }
        };
        if events.send(event).await.is_err() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            cmd = commands.recv() => match cmd {
                Some(RefreshCommand::Now) => {
                    // Presses queued during the load collapse into this one.
                    while commands.try_recv().is_ok() {}
                    debug!(req_id, "manual refresh");
                }
                None => break,
            },
        }
    }
}
