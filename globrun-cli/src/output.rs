//! Output formatting for the CLI.
//!
//! Handles plain (one path per line) and JSON output formats.

use std::io::{self, BufWriter, IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Output handler for CLI commands.
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print resolved paths to stdout.
    ///
    /// A closed pipe (`globrun | head`) is not an error.
    pub fn paths(&self, paths: &[String]) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        match write_paths(&mut out, self.format, paths).and_then(|()| out.flush()) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
    }

    /// Print a warning to stderr (yellow on a terminal).
    pub fn warn(&self, msg: &str) {
        if io::stderr().is_terminal() {
            eprintln!("\x1b[33mwarning: {}\x1b[0m", msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    /// Print an error to stderr (red on a terminal).
    pub fn error(&self, msg: &str) {
        if io::stderr().is_terminal() {
            eprintln!("\x1b[31merror: {}\x1b[0m", msg);
        } else {
            eprintln!("error: {}", msg);
        }
    }
}

fn write_paths(out: &mut impl Write, format: OutputFormat, paths: &[String]) -> io::Result<()> {
    match format {
        OutputFormat::Plain => {
            for path in paths {
                writeln!(out, "{}", path)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, paths)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
