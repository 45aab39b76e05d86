//! Colored terminal output.

use cyrup_termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, Write};

/// Writes user-facing messages to the terminal.
///
/// Progress and success messages go to stdout and are suppressed in quiet
/// mode; warnings and errors go to stderr. Verbose messages only appear in
/// verbose mode.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet: quiet && !verbose,
        }
    }

    /// Whether verbose output is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Detail shown only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.write_colored(stdout(), None, false, "", message)
    }

    /// Progress line.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_colored(stdout(), Some(Color::Cyan), false, "» ", message)
    }

    /// Success line.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_colored(stdout(), Some(Color::Green), true, "✓ ", message)
    }

    /// Warning line, on stderr.
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_colored(stderr(), Some(Color::Yellow), true, "⚠ ", message)
    }

    /// Error line, on stderr. Never suppressed.
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.write_colored(stderr(), Some(Color::Red), true, "✗ ", message)
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = stdout();
        writeln!(out)?;
        self.write_colored(out, Some(Color::Blue), true, "", title)
    }

    /// Indented detail line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(stdout(), "  {message}")
    }

    /// Plain line of requested data. Printed even in quiet mode.
    pub fn println(&self, message: &str) -> io::Result<()> {
        writeln!(stdout(), "{message}")
    }

    fn write_colored(
        &self,
        mut stream: StandardStream,
        color: Option<Color>,
        bold: bool,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(color).set_bold(bold))?;
        write!(stream, "{prefix}{message}")?;
        stream.reset()?;
        writeln!(stream)
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}

fn stderr() -> StandardStream {
    StandardStream::stderr(ColorChoice::Auto)
}
