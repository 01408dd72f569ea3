//! Coloured terminal output.
//!
//! Human-facing progress goes to stderr so stdout stays free for the
//! machine-readable cloud response.

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use std::io::{self, Write};

/// Writes styled status lines.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    color: ColorChoice,
}

impl OutputManager {
    /// `quiet` suppresses everything except errors; `verbose` enables
    /// [`OutputManager::verbose`] lines.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let color = if std::env::var_os("NO_COLOR").is_some() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };
        Self {
            verbose,
            quiet,
            color,
        }
    }

    fn write_styled(
        &self,
        color: Option<Color>,
        bold: bool,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        let mut stream = StandardStream::stderr(self.color);
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        stream.set_color(&spec)?;
        write!(stream, "{prefix}")?;
        stream.reset()?;
        writeln!(stream, "{message}")
    }

    /// Detail line, shown only in verbose mode.
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            self.write_styled(Some(Color::Cyan), false, "  · ", message)?;
        }
        Ok(())
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_styled(Some(Color::Blue), true, "→ ", message)
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_styled(Some(Color::Green), true, "✓ ", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_styled(Some(Color::Yellow), true, "warning: ", message)
    }

    /// Always shown, even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        self.write_styled(Some(Color::Red), true, "Error: ", message)
    }

    /// Bold section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write_styled(None, true, "", title)
    }

    /// Indented plain line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stream = StandardStream::stderr(self.color);
        writeln!(stream, "    {message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_mode_still_writes_errors() {
        let output = OutputManager::new(false, true);
        assert!(output.progress("skipped").is_ok());
        assert!(output.verbose("skipped").is_ok());
        assert!(output.error("shown").is_ok());
    }

    #[test]
    fn styled_lines_reach_stderr() {
        let output = OutputManager::new(true, false);
        assert!(output.section("Building").is_ok());
        assert!(output.success("done").is_ok());
        assert!(output.indent("sha256 abc").is_ok());
    }
}
