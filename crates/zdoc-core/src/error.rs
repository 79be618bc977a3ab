//! Error types for parsing, include expansion and batch conversion.

use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::include::Reference;

/// Error kinds for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The source stream could not be read.
    Io,
    /// The source is not valid UTF-8.
    Encoding,
    /// Unclosed delimiter (code fence).
    UnclosedDelimiter,
    /// Invalid syntax that couldn't be parsed
    InvalidSyntax,
    /// Unknown `#name:` directive
    UnknownDirective,
    /// Malformed header directive (title, author, verifier)
    InvalidMetadata,
}

/// A failure that aborts the whole parse. No partial document is produced.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read source")]
    Io(#[from] io::Error),

    #[error("source is not valid UTF-8")]
    Encoding(#[from] FromUtf8Error),

    #[error("line {line}: {message}")]
    Syntax {
        kind: ParseErrorKind,
        message: String,
        /// 1-based source line.
        line: usize,
    },
}

impl ParseError {
    fn syntax(kind: ParseErrorKind, message: String, line: usize) -> Self {
        ParseError::Syntax {
            kind,
            message,
            line,
        }
    }

    /// Create an error for unclosed delimiters.
    pub fn unclosed_delimiter(delimiter: &str, line: usize) -> Self {
        Self::syntax(
            ParseErrorKind::UnclosedDelimiter,
            format!("unclosed {}", delimiter),
            line,
        )
    }

    /// Create an error for invalid syntax.
    pub fn invalid_syntax(context: &str, line: usize) -> Self {
        Self::syntax(
            ParseErrorKind::InvalidSyntax,
            format!("invalid syntax in {}", context),
            line,
        )
    }

    /// Create an error for unknown directives.
    pub fn unknown_directive(directive: &str, line: usize) -> Self {
        Self::syntax(
            ParseErrorKind::UnknownDirective,
            format!("unknown directive: {}", directive),
            line,
        )
    }

    /// Create an error for malformed header directives.
    pub fn invalid_metadata(directive: &str, line: usize) -> Self {
        Self::syntax(
            ParseErrorKind::InvalidMetadata,
            format!("malformed #{}: directive", directive),
            line,
        )
    }

    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::Io(_) => ParseErrorKind::Io,
            ParseError::Encoding(_) => ParseErrorKind::Encoding,
            ParseError::Syntax { kind, .. } => *kind,
        }
    }

    /// Source line of a syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Failure to expand an include leaf.
///
/// Raised at expansion time, never while parsing the including document.
#[derive(Debug, Error)]
pub enum IncludeError {
    #[error("cannot open included document {reference}")]
    Open {
        reference: Reference,
        #[source]
        source: io::Error,
    },

    #[error("cannot parse included document {reference}")]
    Parse {
        reference: Reference,
        #[source]
        source: ParseError,
    },

    #[error("include cycle through {reference}")]
    Cycle { reference: Reference },
}

impl IncludeError {
    pub fn reference(&self) -> &Reference {
        match self {
            IncludeError::Open { reference, .. }
            | IncludeError::Parse { reference, .. }
            | IncludeError::Cycle { reference } => reference,
        }
    }
}

/// Out-of-range positional argument access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("argument index {index} out of range ({len} arguments)")]
pub struct BoundsError {
    pub index: usize,
    pub len: usize,
}

/// Errors raised while converting one source file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Include(#[from] IncludeError),
}
