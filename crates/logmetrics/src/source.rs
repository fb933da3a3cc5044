//! Line sources: a file, the stdout of a spawned process, or a literal string.
//!
//! Each source yields raw lines (terminator included) in the order they were
//! read. Framing and decoding are left to [`crate::session::Session`].
//!
//! File and process reads hold at most `max_line_size + 1` bytes of a line;
//! the rest of an overlong line is skipped, so the yielded chunk still
//! classifies as oversize.

use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio_stream::Stream;

use crate::error::{SourceError, SourceResult};

pub type LineStream = Pin<Box<dyn Stream<Item = SourceResult<Bytes>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSource {
    File(PathBuf),
    Command { program: String, args: Vec<String> },
    Literal(String),
}

impl LineSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        LineSource::File(path.into())
    }

    pub fn command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LineSource::Command {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Follow a growing file, starting from its first line.
    pub fn tail(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::command("tail", ["-n".to_string(), "+1".to_string(), "-F".to_string(), path.display().to_string()])
    }

    pub fn literal(text: impl Into<String>) -> Self {
        LineSource::Literal(text.into())
    }

    pub fn describe(&self) -> String {
        match self {
            LineSource::File(path) => format!("file {}", path.display()),
            LineSource::Command { program, args } => format!("command `{}`", command_line(program, args)),
            LineSource::Literal(text) => format!("literal ({} bytes)", text.len()),
        }
    }

    /// Start reading. Opening errors surface as the first stream item.
    pub fn open(self, max_line_size: usize) -> LineStream {
        match self {
            LineSource::File(path) => Box::pin(read_file(path, max_line_size)),
            LineSource::Command { program, args } => Box::pin(read_command(program, args, max_line_size)),
            LineSource::Literal(text) => Box::pin(read_literal(text)),
        }
    }
}

fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_file(path: PathBuf, max_line_size: usize) -> impl Stream<Item = SourceResult<Bytes>> + Send {
    async_stream::try_stream! {
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| SourceError::Open { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), "source: file opened");

        let mut reader = BufReader::new(file);
        while let Some(line) = next_line(&mut reader, max_line_size).await? {
            yield line;
        }
    }
}

fn read_command(program: String, args: Vec<String>, max_line_size: usize) -> impl Stream<Item = SourceResult<Bytes>> + Send {
    async_stream::try_stream! {
        let command = command_line(&program, &args);
        let mut cmd = tokio::process::Command::new(&program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        // Keep terminal Ctrl+C away from the child; it is killed when the
        // stream is dropped.
        #[cfg(unix)]
        cmd.process_group(0);
        let mut child = cmd
            .spawn()
            .map_err(|source| SourceError::Spawn { command: command.clone(), source })?;
        tracing::debug!(command = %command, pid = ?child.id(), "source: process spawned");

        let stdout = child.stdout.take().ok_or(SourceError::MissingStdout)?;
        let mut reader = BufReader::new(stdout);
        while let Some(line) = next_line(&mut reader, max_line_size).await? {
            yield line;
        }

        let status = child.wait().await?;
        if !status.success() {
            Err::<(), _>(SourceError::ExitStatus { command, status })?;
        }
    }
}

fn read_literal(text: String) -> impl Stream<Item = SourceResult<Bytes>> + Send {
    async_stream::try_stream! {
        let bytes = Bytes::from(text);
        let mut start = 0;
        while start < bytes.len() {
            let end = bytes[start..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|p| start + p + 1)
                .unwrap_or(bytes.len());
            yield bytes.slice(start..end);
            start = end;
        }
    }
}

/// Read up to and including the next `\n`, keeping at most
/// `max_line_size + 1` bytes. `None` at EOF.
async fn next_line<R>(reader: &mut R, max_line_size: usize) -> SourceResult<Option<Bytes>>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max_line_size.saturating_add(1);
    let mut buf = Vec::new();
    let n = (&mut *reader).take(limit as u64).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    if n == limit && buf.last() != Some(&b'\n') {
        let skipped = skip_line(reader).await?;
        tracing::debug!(kept = n, skipped, "source: overlong line truncated");
    }
    Ok(Some(Bytes::from(buf)))
}

/// Discard input through the next `\n` (or EOF) without buffering it.
async fn skip_line<R>(reader: &mut R) -> SourceResult<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }
        let (consume, done) = match available.iter().position(|b| *b == b'\n') {
            Some(i) => (i + 1, true),
            None => (available.len(), false),
        };
        reader.consume(consume);
        skipped += consume;
        if done {
            return Ok(skipped);
        }
    }
}
