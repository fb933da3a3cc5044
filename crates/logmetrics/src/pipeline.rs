//! Async driver: one task owns the session, reads the source in order and
//! forwards records through a bounded channel.
//!
//! Reading and classification stay on the session task; only finished
//! records cross the channel, so downstream printing runs concurrently
//! without ever touching parser state. Cancelling stops reading but still
//! finishes the session, so the summary is available for endless sources.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{SourceError, SourceResult};
use crate::machine::Record;
use crate::metrics::SessionMetrics;
use crate::session::{Session, SessionSummary};
use crate::source::LineSource;

pub struct Pipeline {
    pub records: mpsc::Receiver<Record>,
    pub handle: JoinHandle<SourceResult<SessionSummary>>,
    pub metrics: Arc<SessionMetrics>,
    /// Cancel to stop reading; `handle` then resolves with the summary.
    pub cancel: CancellationToken,
}

impl Pipeline {
    /// Stream view over the record channel.
    pub fn into_stream(self) -> (ReceiverStream<Record>, JoinHandle<SourceResult<SessionSummary>>) {
        (ReceiverStream::new(self.records), self.handle)
    }
}

/// Spawn the session task. Dropping the receiver stops reading at the next
/// record; the task then finishes the session as if the stream had ended.
pub fn spawn(source: LineSource, mut session: Session, capacity: usize) -> Pipeline {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let metrics = session.metrics();
    let description = source.describe();
    let cancel = CancellationToken::new();
    let cancelled = cancel.clone();

    let handle = tokio::spawn(async move {
        info!(source = %description, "pipeline: reading");
        let mut lines = source.open(session.max_line_size());

        'read: loop {
            let next = tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    debug!("pipeline: cancelled, stop reading");
                    break 'read;
                }
                next = lines.next() => next,
            };
            let Some(line) = next else { break };
            let line = line?;
            for record in session.feed_bytes(&line) {
                if tx.send(record).await.is_err() {
                    debug!("pipeline: receiver dropped, stop reading");
                    break 'read;
                }
            }
        }

        // a spawned process is killed with its stream
        drop(lines);
        let summary = session.finish();
        debug!(lines = summary.metrics.lines_read, "pipeline: session finished");
        Ok(summary)
    });

    Pipeline { records: rx, handle, metrics, cancel }
}

/// Run a whole source to completion, collecting every record.
pub async fn collect(source: LineSource, session: Session) -> SourceResult<(Vec<Record>, SessionSummary)> {
    let (mut stream, handle) = spawn(source, session, 64).into_stream();
    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        records.push(record);
    }
    let summary = handle.await.map_err(|e| SourceError::Task(e.to_string()))??;
    Ok((records, summary))
}
