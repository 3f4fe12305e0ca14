//! Output helpers that follow the host's formatting preferences.

use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;

use crate::env::PluginEnv;
use crate::error::SdkError;

/// Writes plugin results as text or JSON depending on `SKY_OUTPUT_FORMAT`.
///
/// ```
/// use sky_plugin_sdk::{Output, PluginEnv};
///
/// let env = PluginEnv::from_lookup(|key| {
///     (key == "SKY_OUTPUT_FORMAT").then(|| String::from("json"))
/// });
/// let mut stdout = Vec::new();
/// let mut stderr = Vec::new();
/// let mut output = Output::new(&env, &mut stdout, &mut stderr);
/// output.write_result(&[1, 2], || "two numbers").expect("write");
/// assert_eq!(String::from_utf8(stdout).expect("utf8"), "[\n  1,\n  2\n]\n");
/// ```
pub struct Output<'a, W: Write, E: Write> {
    env: &'a PluginEnv,
    stdout: W,
    stderr: E,
}

impl<'a> Output<'a, io::Stdout, io::Stderr> {
    /// Writes to the process standard streams.
    #[must_use]
    pub fn standard(env: &'a PluginEnv) -> Self {
        Self::new(env, io::stdout(), io::stderr())
    }
}

impl<'a, W: Write, E: Write> Output<'a, W, E> {
    /// Writes to the given streams.
    pub const fn new(env: &'a PluginEnv, stdout: W, stderr: E) -> Self {
        Self {
            env,
            stdout,
            stderr,
        }
    }

    /// Writes `value` as pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Encode`] or [`SdkError::Io`].
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), SdkError> {
        serde_json::to_writer_pretty(&mut self.stdout, value).map_err(SdkError::Encode)?;
        writeln!(self.stdout).map_err(SdkError::Io)
    }

    /// Writes `value` as JSON when JSON output was requested, otherwise the
    /// text produced by `text`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Encode`] or [`SdkError::Io`].
    pub fn write_result<T, F, D>(&mut self, value: &T, text: F) -> Result<(), SdkError>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> D,
        D: Display,
    {
        if self.env.is_json_output() {
            return self.write_json(value);
        }
        writeln!(self.stdout, "{}", text()).map_err(SdkError::Io)
    }

    /// Writes a diagnostic line to standard error.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Io`] when the stream is closed.
    pub fn error(&mut self, message: impl Display) -> Result<(), SdkError> {
        writeln!(self.stderr, "{message}").map_err(SdkError::Io)
    }

    /// Writes a diagnostic line when the host verbosity is at least `level`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Io`] when the stream is closed.
    pub fn verbose(&mut self, level: u8, message: impl Display) -> Result<(), SdkError> {
        if self.env.verbosity() >= level {
            self.error(message)?;
        }
        Ok(())
    }
}
