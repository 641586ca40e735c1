//! Activity kind strings recognized by the tracker.

use std::fmt;
use std::str::FromStr;

/// Canonical activity kinds.
///
/// The storage layer accepts arbitrary kind strings, but only these are
/// understood by session counters and reporting tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Message,
    AssistantResponse,
    ToolUse,
    Error,
    Other,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Message => "message",
            Self::AssistantResponse => "assistant_response",
            Self::ToolUse => "tool_use",
            Self::Error => "error",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ActivityKind {
    type Err = UnknownActivityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::Message),
            "assistant_response" => Ok(Self::AssistantResponse),
            "tool_use" => Ok(Self::ToolUse),
            "error" => Ok(Self::Error),
            "other" => Ok(Self::Other),
            _ => Err(UnknownActivityKind(s.to_string())),
        }
    }
}

/// Error type for unrecognized activity kind strings.
#[derive(Debug, Clone)]
pub struct UnknownActivityKind(String);

impl fmt::Display for UnknownActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown activity kind: {}", self.0)
    }
}

impl std::error::Error for UnknownActivityKind {}
