use std::collections::HashSet;

use log::info;

use crate::entry::HistoryEntry;
use crate::error::ApiError;

/// Status code the service uses for a successful call.
pub const STATUS_OK: &str = "0";

/// Map a known status code to its meaning. Unknown codes return `None`
/// and are reported with the raw code only.
pub fn describe_status(code: &str) -> Option<&'static str> {
    match code {
        "0" => Some("Success"),
        "-1" => Some("Failure: General failure"),
        "-2" => Some("Failure: Requested property doesn't exist"),
        "-3" => Some("Failure: Hash mismatch"),
        _ => None,
    }
}

/// Decode a raw history or deletion response body into entries.
///
/// The body is newline-separated: the first line is a status code, the rest
/// are six-field comma-separated entry records. A non-zero status fails the
/// decode before any entry line is looked at. Empty lines (trailing-newline
/// artifacts) are skipped. Entries whose identifier is already in `ledger`
/// are dropped and reported as the server resurfacing a deleted item; that
/// is an expected inconsistency, not an error.
///
/// Returned entries keep their original line order.
pub fn decode_response(
    body: &str,
    ledger: &HashSet<String>,
) -> Result<Vec<HistoryEntry>, ApiError> {
    let mut lines = body.lines();

    let status = lines.next().unwrap_or("").trim();
    if status != STATUS_OK {
        return Err(ApiError::Status {
            code: status.to_string(),
            description: describe_status(status).map(str::to_string),
        });
    }

    let mut entries = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }

        let entry = HistoryEntry::parse_line(line)?;
        if ledger.contains(&entry.identifier) {
            info!(
                "server re-listed already-deleted entry {}, ignoring",
                entry.identifier
            );
            continue;
        }

        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn no_ledger() -> HashSet<String> {
        HashSet::new()
    }

    #[rstest]
    #[case("-1", Some("Failure: General failure"))]
    #[case("-2", Some("Failure: Requested property doesn't exist"))]
    #[case("-3", Some("Failure: Hash mismatch"))]
    #[case("-99", None)]
    fn test_non_zero_status_fails(#[case] code: &str, #[case] expected: Option<&str>) {
        let body = format!("{code}\n");
        let result = decode_response(&body, &no_ledger());
        match result {
            Err(ApiError::Status { code: raw, description }) => {
                assert_eq!(raw, code);
                assert_eq!(description.as_deref(), expected);
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_checked_before_entry_lines() {
        // Entry lines after a failing status line must never be parsed,
        // even malformed ones.
        let body = "-1\nnot,a,valid,line\n";
        let result = decode_response(body, &no_ledger());
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }

    #[test]
    fn test_decode_two_entries() {
        let body = "0\n1,2021-01-01,http://x/1,a.png,5,0\n2,2021-01-01,http://x/2,b.png,1,0\n";
        let entries = decode_response(body, &no_ledger()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "1");
        assert_eq!(entries[1].identifier, "2");
    }

    #[test]
    fn test_decode_empty_history() {
        let entries = decode_response("0\n", &no_ledger()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_empty_body_is_a_status_failure() {
        let result = decode_response("", &no_ledger());
        assert!(matches!(result, Err(ApiError::Status { .. })));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let body = "0\n\n1,2021-01-01,http://x/1,a.png,5,0\n\n";
        let entries = decode_response(body, &no_ledger()).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_ledgered_identifier_filtered_out() {
        let mut ledger = HashSet::new();
        ledger.insert("42".to_string());

        let body = "0\n42,2021-01-01,http://x/42,a.png,5,0\n7,2021-01-01,http://x/7,b.png,1,0\n";
        let entries = decode_response(body, &ledger).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "7");
    }

    #[test]
    fn test_malformed_line_is_fatal() {
        let body = "0\n1,2021-01-01,http://x/1,a.png,5,0\nshort,line\n";
        let result = decode_response(body, &no_ledger());
        assert!(matches!(result, Err(ApiError::MalformedEntry { .. })));
    }
}
