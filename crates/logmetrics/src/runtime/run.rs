//! Run — wire source, session and printer together until the stream ends or
//! the process is asked to stop.

use std::io;

use termcolor::StandardStream;
use tracing::{info, warn};

use crate::error::{ConfigError, SourceError};
use crate::metrics::MetricsSnapshot;
use crate::output::{color_choice, Printer};
use crate::pipeline::{self, Pipeline};
use crate::runtime::boot;
use crate::runtime::cli::{Cli, ReadCommand};
use crate::runtime::stop::shutdown_signal;
use crate::session::Session;
use crate::source::LineSource;

pub fn source_for(cli: &Cli) -> LineSource {
    if let Some(text) = &cli.literal {
        return LineSource::literal(text.clone());
    }
    match cli.command {
        ReadCommand::Cat => LineSource::file(&cli.logfile),
        ReadCommand::Tail => LineSource::tail(&cli.logfile),
    }
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = boot::load_config(&cli)?;
    let session = Session::new(&config.parser).map_err(ConfigError::from)?;
    let source = source_for(&cli);
    info!("Reading {}", source.describe());

    let Pipeline { mut records, handle, cancel, .. } =
        pipeline::spawn(source, session, config.output.channel_capacity);

    let mut printer = Printer::new(
        StandardStream::stdout(color_choice(config.output.color)),
        config.output.format,
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    // After a stop request the loop keeps draining until the session task
    // closes the channel.
    let mut stopping = false;
    let mut stdout_closed = false;
    loop {
        tokio::select! {
            record = records.recv() => {
                let Some(record) = record else { break };
                if let Err(e) = printer.print(&record) {
                    cancel.cancel();
                    if e.kind() != io::ErrorKind::BrokenPipe {
                        return Err(e.into());
                    }
                    warn!("stdout closed, stopping");
                    stdout_closed = true;
                    break;
                }
            }
            _ = &mut shutdown, if !stopping => {
                info!("Finishing session");
                stopping = true;
                cancel.cancel();
            }
        }
    }
    drop(records);

    let summary = handle.await.map_err(|e| SourceError::Task(e.to_string()))??;
    log_summary(&summary.metrics);
    if config.output.show_callsites && !stdout_closed {
        printer.print_callsites(&summary.callsites, summary.callsite_total)?;
    }
    Ok(())
}

fn log_summary(m: &MetricsSnapshot) {
    info!(
        lines = m.lines_read,
        headers = m.headers,
        events = m.events_emitted,
        votes = m.votes_emitted,
        bad_timestamps = m.bad_timestamps,
        oversize = m.oversize_lines,
        incomplete = m.incomplete_dropped,
        "Session summary"
    );
}
