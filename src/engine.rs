use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::entry::HistoryEntry;
use crate::error::ApiError;
use crate::protocol;
use crate::transport::{Transport, DELETION_ENDPOINT, HISTORY_ENDPOINT, ID_FIELD, KEY_FIELD};

/// Drives the fetch, delete, merge cycle until the server reports an empty
/// history.
///
/// The engine owns all mutable state for one run: the working list of
/// entries it still believes exist, and the ledger of identifiers already
/// deleted. The service is non-authoritative and re-lists deleted entries
/// in read-after-delete responses, so an identifier is ledgered *before*
/// its deletion call goes out, every decoded batch is filtered against the
/// ledger, and the working list is swept after each merge. Periodic
/// re-fetching plus that filtering is what lets the run converge on an
/// empty history without double-deleting or looping on phantom entries.
///
/// Strictly sequential: the only suspension point is the fixed rate-limit
/// pause before each deletion call. Any error is fatal for the run and
/// leaves the working list partially processed; runs are not resumable.
pub struct Reconciler<T: Transport> {
    transport: T,
    api_key: String,
    delay: Duration,
    dry_run: bool,
    history: Vec<HistoryEntry>,
    ledger: HashSet<String>,
    deletions: u64,
}

impl<T: Transport> Reconciler<T> {
    pub fn new(transport: T, api_key: impl Into<String>, delay: Duration) -> Self {
        Reconciler {
            transport,
            api_key: api_key.into(),
            delay,
            dry_run: false,
            history: Vec::new(),
            ledger: HashSet::new(),
            deletions: 0,
        }
    }

    /// Walk the loop without issuing deletion calls. Entries are still
    /// ledgered as if deleted, so the follow-up fetch filters them out and
    /// the run terminates after one pass.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Identifiers deleted (or, in a dry run, assumed deleted) so far.
    /// Grows monotonically for the life of the engine.
    pub fn ledger(&self) -> &HashSet<String> {
        &self.ledger
    }

    /// Number of deletion calls actually issued.
    pub fn deletions(&self) -> u64 {
        self.deletions
    }

    /// The current working list of entries believed to still exist.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Run to completion: re-fetch and drain until a listing comes back
    /// empty.
    ///
    /// Each cycle iterates the freshly fetched batch, not the accumulated
    /// working list; iterating the working list would re-process entries
    /// merged in from an earlier cycle's deletion responses.
    pub fn run(&mut self) -> Result<(), ApiError> {
        loop {
            let batch = self.fetch_history()?;
            if batch.is_empty() {
                info!("history is empty, nothing left to delete");
                return Ok(());
            }

            info!("fetched {} history entries", batch.len());
            self.process_batch(batch)?;
        }
    }

    /// One listing call. The decoded batch becomes the new working list.
    fn fetch_history(&mut self) -> Result<Vec<HistoryEntry>, ApiError> {
        let body = self
            .transport
            .post(HISTORY_ENDPOINT, &[(KEY_FIELD, self.api_key.clone())])?;
        let batch = protocol::decode_response(&body, &self.ledger)?;

        self.history = batch.clone();
        Ok(batch)
    }

    /// Delete every entry of `batch` in order, merging each deletion
    /// response back into the working list.
    fn process_batch(&mut self, batch: Vec<HistoryEntry>) -> Result<(), ApiError> {
        for entry in batch {
            // Fixed rate limit, applied before every deletion call
            // including the first of a batch.
            thread::sleep(self.delay);

            if self.ledger.contains(&entry.identifier) {
                info!(
                    "entry {} was already deleted this run, skipping",
                    entry.identifier
                );
                continue;
            }

            // Ledger the identifier before the call goes out: the deletion
            // response itself can re-list the entry it just deleted.
            self.ledger.insert(entry.identifier.clone());

            if self.dry_run {
                info!(
                    "dry run: would delete {} ({})",
                    entry.identifier, entry.filename
                );
                continue;
            }

            info!("deleting {} ({})", entry.identifier, entry.filename);
            let body = self.transport.post(
                DELETION_ENDPOINT,
                &[
                    (KEY_FIELD, self.api_key.clone()),
                    (ID_FIELD, entry.identifier.clone()),
                ],
            )?;
            self.deletions += 1;

            let remainder = protocol::decode_response(&body, &self.ledger)?;
            self.merge_remainder(remainder);
            self.sweep_deleted();

            debug!("{} entries remain in the working list", self.history.len());
        }

        Ok(())
    }

    /// Merge a post-deletion listing into the working list, keyed on
    /// identifier. Ledgered and already-known identifiers are skipped;
    /// everything new is appended in response order.
    fn merge_remainder(&mut self, remainder: Vec<HistoryEntry>) {
        for entry in remainder {
            if self.ledger.contains(&entry.identifier) {
                continue;
            }
            if self
                .history
                .iter()
                .any(|known| known.identifier == entry.identifier)
            {
                continue;
            }
            self.history.push(entry);
        }
    }

    /// Drop any ledgered identifier still sitting in the working list.
    /// The server re-surfaces deleted entries, so the list can hold
    /// entries the ledger already covers.
    fn sweep_deleted(&mut self) {
        self.history
            .retain(|entry| !self.ledger.contains(&entry.identifier));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport stub that never gets called; for exercising merge and
    /// sweep directly.
    struct NoTransport;

    impl Transport for NoTransport {
        fn post(&mut self, _: &str, _: &[(&str, String)]) -> Result<String, ApiError> {
            panic!("no network calls expected in this test");
        }
    }

    fn engine() -> Reconciler<NoTransport> {
        Reconciler::new(NoTransport, "key", Duration::ZERO)
    }

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry::new(id, "2021-01-01", format!("http://x/{id}"), "a.png", "5")
    }

    #[test]
    fn test_merge_appends_new_entries_in_order() {
        let mut eng = engine();
        eng.merge_remainder(vec![entry("1"), entry("2"), entry("3")]);

        let ids: Vec<_> = eng.history().iter().map(|e| e.identifier.clone()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let remainder = vec![entry("1"), entry("2")];

        let mut eng = engine();
        eng.merge_remainder(remainder.clone());
        let once: Vec<_> = eng.history().to_vec();

        eng.merge_remainder(remainder);
        assert_eq!(eng.history(), once.as_slice());
    }

    #[test]
    fn test_merge_keeps_existing_entry_on_identifier_match() {
        let mut eng = engine();
        eng.merge_remainder(vec![entry("1")]);

        // Same identifier, different view count: must not overwrite.
        let mut updated = entry("1");
        updated.views = "99".to_string();
        eng.merge_remainder(vec![updated]);

        assert_eq!(eng.history().len(), 1);
        assert_eq!(eng.history()[0].views, "5");
    }

    #[test]
    fn test_merge_skips_ledgered_identifiers() {
        let mut eng = engine();
        eng.ledger.insert("1".to_string());
        eng.merge_remainder(vec![entry("1"), entry("2")]);

        assert_eq!(eng.history().len(), 1);
        assert_eq!(eng.history()[0].identifier, "2");
    }

    #[test]
    fn test_sweep_removes_ledgered_entries() {
        let mut eng = engine();
        eng.merge_remainder(vec![entry("1"), entry("2"), entry("3")]);

        eng.ledger.insert("2".to_string());
        eng.sweep_deleted();

        let ids: Vec<_> = eng.history().iter().map(|e| e.identifier.clone()).collect();
        assert_eq!(ids, ["1", "3"]);
    }
}
