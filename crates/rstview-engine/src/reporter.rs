//! Diagnostic reporting.
//!
//! Every diagnostic the parser raises goes through [`Reporter::system_message`],
//! which dispatches to the process-wide hook installed with
//! [`crate::hooks::replace_system_message_hook`] or, when none is installed, to
//! [`Reporter::default_system_message`].

use std::fmt;

use crate::error::EngineError;
use crate::hooks;
use crate::settings::Settings;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl Level {
    /// Numeric level as used by `report_level` and `halt_level`.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case level name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Severe => "SEVERE",
        }
    }

    /// Level for a numeric code, if it names one.
    #[must_use]
    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Debug),
            1 => Some(Self::Info),
            2 => Some(Self::Warning),
            3 => Some(Self::Error),
            4 => Some(Self::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), self.as_u8())
    }
}

/// A diagnostic produced while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemMessage {
    pub level: Level,
    pub message: String,
    /// 1-based source line, when known.
    pub line: Option<usize>,
}

impl SystemMessage {
    /// The line written to the warning stream, e.g.
    /// `<string>:1: (WARNING/2) Inline emphasis start-string without end-string.`
    #[must_use]
    pub fn stream_line(&self, source: &str) -> String {
        match self.line {
            Some(line) => format!("{source}:{line}: ({}) {}\n", self.level, self.message),
            None => format!("{source}: ({}) {}\n", self.level, self.message),
        }
    }
}

/// Reports diagnostics for one parse.
#[derive(Clone, Debug)]
pub struct Reporter {
    source: String,
    report_level: u8,
    halt_level: u8,
    enable_exit: bool,
}

impl Reporter {
    /// Create a reporter for `source` (shown in stream lines) using the
    /// thresholds from `settings`.
    #[must_use]
    pub fn new(source: impl Into<String>, settings: &Settings) -> Self {
        Self {
            source: source.into(),
            report_level: settings.report_level,
            halt_level: settings.halt_level,
            enable_exit: settings.enable_exit,
        }
    }

    /// Name of the source being parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Minimum level written to the stream and kept in the output.
    #[must_use]
    pub fn report_level(&self) -> u8 {
        self.report_level
    }

    /// Minimum level that aborts parsing.
    #[must_use]
    pub fn halt_level(&self) -> u8 {
        self.halt_level
    }

    /// Raise a diagnostic through the installed hook, or the default handling.
    pub fn system_message(
        &self,
        level: Level,
        message: &str,
        line: Option<usize>,
    ) -> Result<SystemMessage, EngineError> {
        match hooks::system_message_hook() {
            Some(hook) => hook(self, level, message, line),
            None => self.default_system_message(level, message, line),
        }
    }

    /// Default diagnostic handling.
    ///
    /// Writes the stream line when `level >= report_level` and fails when
    /// `level >= halt_level`.
    pub fn default_system_message(
        &self,
        level: Level,
        message: &str,
        line: Option<usize>,
    ) -> Result<SystemMessage, EngineError> {
        let msg = SystemMessage {
            level,
            message: message.to_owned(),
            line,
        };
        if level.as_u8() >= self.report_level {
            hooks::write_warning(&msg.stream_line(&self.source));
        }
        if level.as_u8() >= self.halt_level {
            tracing::debug!(level = %level, line = ?line, "Parsing halted");
            if self.enable_exit {
                return Err(EngineError::Exit { status: 1 });
            }
            return Err(EngineError::Halted {
                level,
                message: msg.message,
                line,
            });
        }
        Ok(msg)
    }

    pub fn info(&self, message: &str, line: Option<usize>) -> Result<SystemMessage, EngineError> {
        self.system_message(Level::Info, message, line)
    }

    pub fn warning(
        &self,
        message: &str,
        line: Option<usize>,
    ) -> Result<SystemMessage, EngineError> {
        self.system_message(Level::Warning, message, line)
    }

    pub fn error(&self, message: &str, line: Option<usize>) -> Result<SystemMessage, EngineError> {
        self.system_message(Level::Error, message, line)
    }

    pub fn severe(&self, message: &str, line: Option<usize>) -> Result<SystemMessage, EngineError> {
        self.system_message(Level::Severe, message, line)
    }
}
