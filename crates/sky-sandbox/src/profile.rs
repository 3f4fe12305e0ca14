//! Sandbox policy definition and builder helpers.

/// How the guest's standard streams are connected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StdioPolicy {
    /// Share the host's stdin, stdout, and stderr.
    #[default]
    Inherit,
    /// Feed the given bytes to stdin and collect stdout and stderr in memory.
    Capture {
        /// Bytes presented to the guest on stdin.
        stdin: Vec<u8>,
    },
}

/// Declarative description of what a sandboxed guest may observe.
///
/// The profile defaults to a restrictive configuration: no environment
/// variables, no arguments beyond the program name, inherited stdio, and no
/// memory cap beyond the engine's own limits.
///
/// ```
/// use sky_sandbox::{SandboxProfile, StdioPolicy};
///
/// let profile = SandboxProfile::new("hello")
///     .args(["a", "b"])
///     .env("SKY_PLUGIN", "1")
///     .max_memory_bytes(16 * 1024 * 1024);
/// assert_eq!(profile.argv(), ["hello", "a", "b"]);
/// assert_eq!(profile.stdio(), &StdioPolicy::Inherit);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SandboxProfile {
    argv: Vec<String>,
    env: Vec<(String, String)>,
    stdio: StdioPolicy,
    max_memory_bytes: Option<usize>,
}

impl SandboxProfile {
    /// Creates a profile whose `argv[0]` is `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            argv: vec![program.into()],
            ..Self::default()
        }
    }

    /// Appends a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.argv.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    /// Exposes an environment variable to the guest.
    ///
    /// Setting the same key twice keeps the latest value.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let name = key.into();
        self.env.retain(|(existing, _)| existing != &name);
        self.env.push((name, value.into()));
        self
    }

    /// Captures stdout and stderr in memory and feeds `stdin` to the guest.
    #[must_use]
    pub fn capture_output(mut self, stdin: Vec<u8>) -> Self {
        self.stdio = StdioPolicy::Capture { stdin };
        self
    }

    /// Caps the guest's linear memory.
    #[must_use]
    pub const fn max_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Full argument vector, including the program name.
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Environment variables visible to the guest.
    #[must_use]
    pub fn environment(&self) -> &[(String, String)] {
        &self.env
    }

    /// Configured stdio policy.
    #[must_use]
    pub const fn stdio(&self) -> &StdioPolicy {
        &self.stdio
    }

    /// Configured memory cap.
    #[must_use]
    pub const fn memory_limit(&self) -> Option<usize> {
        self.max_memory_bytes
    }
}
