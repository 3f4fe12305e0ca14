//! Log output formats accepted by `--log-format` and `SKY_LOG_FORMAT`.

use strum::{Display, EnumString};

/// How the CLI renders tracing events on stderr.
///
/// Parsing ignores ASCII case, so `JSON` and `json` both select
/// [`LogFormat::Json`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    /// One terse line per event.
    #[default]
    Compact,
    /// One JSON object per event with the fields flattened to the top level.
    Json,
}

impl LogFormat {
    /// Whether events are emitted as machine-readable records.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Error returned when a log format name is not recognised.
pub type LogFormatParseError = strum::ParseError;
