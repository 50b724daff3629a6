use std::fmt;

use crate::error::ApiError;

/// One remote upload as listed by the history API.
///
/// All fields are opaque display strings; the service assigns `identifier`
/// and it is the only field that defines identity. Two entries with equal
/// identifiers are the same logical item even when other fields differ
/// (view counts in particular change between responses).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub identifier: String,
    pub date: String,
    pub url: String,
    pub filename: String,
    pub views: String,
    /// Trailing field of unspecified semantics. Preserved verbatim, never
    /// interpreted; `"0"` when constructed without one.
    pub unknown: String,
}

/// Number of comma-separated fields in one wire line.
pub const FIELD_COUNT: usize = 6;

impl HistoryEntry {
    /// Build an entry without the trailing unknown field, defaulting it
    /// to `"0"`.
    pub fn new(
        identifier: impl Into<String>,
        date: impl Into<String>,
        url: impl Into<String>,
        filename: impl Into<String>,
        views: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            identifier: identifier.into(),
            date: date.into(),
            url: url.into(),
            filename: filename.into(),
            views: views.into(),
            unknown: "0".to_string(),
        }
    }

    /// Parse one comma-separated response line.
    ///
    /// The wire format is exactly six positional fields. Any other arity,
    /// short or long, fails the whole decode rather than producing a
    /// half-filled record.
    pub fn parse_line(line: &str) -> Result<Self, ApiError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(ApiError::MalformedEntry {
                line: line.to_string(),
            });
        }

        Ok(HistoryEntry {
            identifier: fields[0].to_string(),
            date: fields[1].to_string(),
            url: fields[2].to_string(),
            filename: fields[3].to_string(),
            views: fields[4].to_string(),
            unknown: fields[5].to_string(),
        })
    }
}

impl fmt::Display for HistoryEntry {
    /// The wire representation: the same six comma-separated fields the
    /// parser accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.identifier, self.date, self.url, self.filename, self.views, self.unknown
        )
    }
}
