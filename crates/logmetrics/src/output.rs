//! Record and summary printing.

use std::io::{self, IsTerminal, Write};

use serde_json::Value;
use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

use crate::conf::{ColorMode, OutputFormat};
use crate::machine::{CallSiteCount, Record};

/// Resolve the configured mode against whether stdout is a terminal.
pub fn color_choice(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Auto
            } else {
                ColorChoice::Never
            }
        }
    }
}

pub struct Printer<W: WriteColor> {
    out: W,
    format: OutputFormat,
}

impl<W: WriteColor> Printer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn print(&mut self, record: &Record) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, record)?;
                writeln!(self.out)?;
            }
            OutputFormat::Dump => {
                let value = serde_json::to_value(record)?;
                self.dump_value(&value, 0)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn dump_value(&mut self, value: &Value, depth: usize) -> io::Result<()> {
        let indent = "  ".repeat(depth);
        match value {
            Value::Object(map) => {
                for (key, inner) in map {
                    write!(self.out, "{}", indent)?;
                    self.colored(Color::Green, key)?;
                    match inner {
                        Value::Object(_) => {
                            writeln!(self.out, ":")?;
                            self.dump_value(inner, depth + 1)?;
                        }
                        _ => {
                            write!(self.out, ": ")?;
                            self.colored(Color::Yellow, &scalar(inner))?;
                            writeln!(self.out)?;
                        }
                    }
                }
                Ok(())
            }
            other => {
                write!(self.out, "{}", indent)?;
                self.colored(Color::Yellow, &scalar(other))?;
                writeln!(self.out)
            }
        }
    }

    fn colored(&mut self, color: Color, text: &str) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(self.out, "{}", text)?;
        self.out.reset()
    }

    /// Per-call-site header counts, least frequent first, then the total.
    pub fn print_callsites(&mut self, counts: &[CallSiteCount], total: u64) -> io::Result<()> {
        for entry in counts {
            self.colored(Color::Green, &entry.key)?;
            write!(self.out, " = ")?;
            self.colored(Color::Yellow, &entry.count.to_string())?;
            writeln!(self.out)?;
        }
        writeln!(self.out, "total_line = {}", total)?;
        self.out.flush()
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(scalar).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
