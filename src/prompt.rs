//! Interactive field prompting.
//!
//! Each configurable field is described by a [`FieldSpec`] that knows how
//! to render its current value and how to collect a missing one from the
//! user. Terminal access goes through the [`PromptIo`] trait so callers
//! (and tests) can substitute a scripted input source.

use crate::secret::MASK_DISPLAY;
use std::collections::VecDeque;
use std::io::{self, Write};

/// Width the field label is padded to before the `:` separator.
pub const LABEL_WIDTH: usize = 12;

/// Describes one configurable connection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Config-file key and struct field name.
    pub key: &'static str,
    /// Label shown when rendering or prompting.
    pub label: &'static str,
    /// Value returned when the user enters nothing.
    pub default: Option<&'static str>,
    /// Read without echo and display as `****`.
    pub mask: bool,
}

/// The recognized fields, in fill order.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "hostname",
        label: "Hostname",
        default: Some("localhost"),
        mask: false,
    },
    FieldSpec {
        key: "port",
        label: "Port",
        default: Some("1972"),
        mask: false,
    },
    FieldSpec {
        key: "namespace",
        label: "Namespace",
        default: Some("USER"),
        mask: false,
    },
    FieldSpec {
        key: "username",
        label: "Username",
        default: Some(""),
        mask: false,
    },
    FieldSpec {
        key: "password",
        label: "Password",
        default: Some(""),
        mask: true,
    },
];

/// Terminal abstraction used by prompting.
///
/// Production code uses [`Terminal`]; tests supply canned responses via
/// [`ScriptedIo`].
pub trait PromptIo {
    /// Print `prompt` and read one line with normal echo.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
    /// Print `prompt` and read one line without echoing input.
    fn read_masked(&mut self, prompt: &str) -> io::Result<String>;
    /// Print one full line of output.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl FieldSpec {
    fn padded_label(label: &str) -> String {
        format!("{:<width$}: ", label, width = LABEL_WIDTH)
    }

    /// Print this field's label with the given value.
    ///
    /// Masked fields display [`MASK_DISPLAY`] instead of the real value.
    /// A ` (default)` suffix marks a displayed value equal to the default.
    pub fn render(&self, io: &mut dyn PromptIo, value: &str) -> io::Result<()> {
        let shown = if self.mask { MASK_DISPLAY } else { value };
        let suffix = if self.default == Some(shown) {
            " (default)"
        } else {
            ""
        };
        io.write_line(&format!(
            "{:<width$}: {}{}",
            self.label,
            shown,
            suffix,
            width = LABEL_WIDTH
        ))
    }

    /// Prompt the user until a usable value is obtained.
    ///
    /// Masked fields are read without echo; when `confirm` is set a second
    /// "Confirm" read must match the first (compared before trimming) or
    /// the loop restarts. Blank input falls back to the default when one
    /// exists; blank input with no default reprompts. The loop has no
    /// retry limit.
    pub fn collect(&self, io: &mut dyn PromptIo, confirm: bool) -> io::Result<String> {
        loop {
            let raw = if self.mask {
                let val = io.read_masked(&Self::padded_label(self.label))?;
                if confirm {
                    let val2 = io.read_masked(&Self::padded_label("Confirm"))?;
                    if val != val2 {
                        io.write_line("Values don't match. Try again.")?;
                        continue;
                    }
                }
                val
            } else {
                io.read_line(&Self::padded_label(self.label))?
            };

            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
            if let Some(default) = self.default {
                return Ok(default.to_string());
            }
        }
    }
}

/// Real terminal: prompts on stdout, masked reads via `rpassword`.
#[derive(Debug, Default)]
pub struct Terminal;

impl PromptIo for Terminal {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }

    fn read_masked(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(line.as_bytes())?;
        stdout.write_all(b"\n")?;
        stdout.flush()
    }
}

/// Canned input source for non-interactive use and tests.
///
/// Responses are consumed in order by both `read_line` and `read_masked`;
/// everything written is captured in a transcript for inspection.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    responses: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source preloaded with the given responses.
    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Queue one more response.
    pub fn push(&mut self, response: impl Into<String>) {
        self.responses.push_back(response.into());
    }

    /// Everything printed so far: prompts and output lines, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Number of responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    fn next_response(&mut self) -> io::Result<String> {
        self.responses.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted")
        })
    }
}

impl PromptIo for ScriptedIo {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        self.next_response()
    }

    fn read_masked(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        self.next_response()
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.transcript.push(line.to_string());
        Ok(())
    }
}
