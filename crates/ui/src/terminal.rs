use std::fmt::Display;
use std::io::{BufRead, Write};

use crate::error::ShellError;
use crate::palette::Palette;

const CLEAR: &str = "\x1b[2J\x1b[H";

/// Line-based prompt over any reader and writer.
///
/// The interactive binary wraps stdin and stdout; tests script the input with
/// a `Cursor` and capture output in a `Vec<u8>`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    palette: Palette,
    clear_screen: bool,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Plain terminal: no colours, no screen clearing.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            palette: Palette::PLAIN,
            clear_screen: false,
        }
    }

    /// Colours and screen clearing, for a real tty.
    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.palette = Palette::COLORED;
        self.clear_screen = true;
        self
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// # Errors
    ///
    /// Returns `ShellError::Io` if the output cannot be written.
    pub fn line(&mut self, text: impl Display) -> Result<(), ShellError> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ShellError::Io` if the output cannot be written.
    pub fn blank(&mut self) -> Result<(), ShellError> {
        writeln!(self.output)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ShellError::Io` if the output cannot be written.
    pub fn clear(&mut self) -> Result<(), ShellError> {
        if self.clear_screen {
            write!(self.output, "{CLEAR}")?;
        }
        Ok(())
    }

    /// Print `label` and read one line, without its line ending.
    ///
    /// # Errors
    ///
    /// Returns `ShellError::InputClosed` at end of input, or `ShellError::Io`.
    pub fn prompt(&mut self, label: &str) -> Result<String, ShellError> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        // Undecodable bytes become U+FFFD; the caller treats them as a bad entry.
        let mut bytes = Vec::new();
        if self.input.read_until(b'\n', &mut bytes)? == 0 {
            return Err(ShellError::InputClosed);
        }
        let mut buf = String::from_utf8_lossy(&bytes).into_owned();
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(buf)
    }

    /// # Errors
    ///
    /// Returns `ShellError::InputClosed` at end of input, or `ShellError::Io`.
    pub fn wait_for_enter(&mut self) -> Result<(), ShellError> {
        let label = self.palette.muted("\nPress Enter to continue...");
        self.prompt(&label).map(drop)
    }
}
