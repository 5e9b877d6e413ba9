//! Dataset serialization formats.
//!
//! [`Format`] selects how an uploaded dataset is parsed into documents;
//! [`ExportFormat`] selects how a project's documents are rendered on
//! download. Both reject unknown selectors with the same wording the API
//! has always used, so clients surface a stable message.

pub mod parse;
pub mod render;

pub use parse::parse;
pub use render::render;

use std::fmt;
use std::str::FromStr;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
#[error("format {0} is invalid.")]
pub struct UnknownFormat(pub String);

/// Import format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One document per non-empty line.
    Plain,
    /// Header row with a `text` column and an optional `label` column.
    Csv,
    /// JSON-lines: one object per line with `text`, optional `labels`, `meta`.
    Json,
    /// CoNLL-style token/tag rows, blank-line separated sentences, BIO tags.
    Conll,
}

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(Format::Plain),
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "conll" => Ok(Format::Conll),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Plain => "plain",
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Conll => "conll",
        };
        f.write_str(name)
    }
}

/// Export format selector.
///
/// `json` prints raw annotation records; `json1` prints resolved label
/// spans as `[[start, end, "LABEL"], ...]`. Both render JSON-lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Json1,
}

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "json1" => Ok(ExportFormat::Json1),
            other => Err(UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Json1 => "json1",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_format_message_is_stable() {
        let err = "excel".parse::<Format>().unwrap_err();
        assert_eq!(err.to_string(), "format excel is invalid.");

        let err = "jsonl".parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.to_string(), "format jsonl is invalid.");
    }

    #[test]
    fn selectors_round_trip() {
        for name in ["plain", "csv", "json", "conll"] {
            assert_eq!(name.parse::<Format>().unwrap().to_string(), name);
        }
        for name in ["csv", "json", "json1"] {
            assert_eq!(name.parse::<ExportFormat>().unwrap().to_string(), name);
        }
    }
}
