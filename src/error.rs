// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

/// The broad category of a failure.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// A required setting is missing or malformed.
    Configuration,
    /// A collaborator could not be reached.
    Network,
    /// A collaborator answered with something we could not understand.
    Protocol,
    /// A collaborator reported an application-level error.
    Remote,
    /// The language model call failed or returned nothing.
    Generation,
    /// Local I/O failure.
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Network => "network",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Remote => "remote",
            ErrorKind::Generation => "generation",
            ErrorKind::Io => "io",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    kind: ErrorKind,
    message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Re-tags the report, keeping the message.
    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Self { kind, ..self }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(kind: ErrorKind, message: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport::new(kind, message))
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport::new(ErrorKind::Io, format!("I/O error: {value}"))
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport::new(ErrorKind::Protocol, format!("JSON error: {value}"))
    }
}

impl From<reqwest::Error> for ErrorReport {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ErrorReport::new(ErrorKind::Protocol, format!("malformed response: {value}"))
        } else {
            ErrorReport::new(ErrorKind::Network, format!("HTTP error: {value}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ErrorReport::new(ErrorKind::Remote, "deck was not found");
        assert_eq!(err.to_string(), "error: deck was not found");
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn test_fail() {
        let result: Fallible<()> = fail(ErrorKind::Configuration, "missing key");
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.message(), "missing key");
    }

    #[test]
    fn test_with_kind() {
        let err = ErrorReport::new(ErrorKind::Network, "timed out").with_kind(ErrorKind::Generation);
        assert_eq!(err.kind(), ErrorKind::Generation);
        assert_eq!(err.message(), "timed out");
    }

    #[test]
    fn test_json_errors_are_protocol_errors() {
        let err: ErrorReport = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
