//! Search results as a lazy, single-pass entry sequence.

use crate::Result;
use async_trait::async_trait;
use directory_core::DirectoryEntry;

/// A single-pass source of directory entries produced by one search.
///
/// Streams are finite and not restartable; a consumer that needs the data
/// twice must re-issue the search. Exhaustion is signalled by `Ok(None)`,
/// never by an error.
#[async_trait]
pub trait EntryStream: Send {
    /// Yields the next entry, or `None` once the result set is exhausted.
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>>;
}

/// The entries matched by one search invocation.
///
/// Wraps a lazy [`EntryStream`]: entries are decoded as they are consumed,
/// one at a time, and the sequence cannot be rewound.
pub struct SearchResult {
    stream: Box<dyn EntryStream>,
}

impl SearchResult {
    pub(crate) fn new(stream: Box<dyn EntryStream>) -> Self {
        Self { stream }
    }

    /// Creates a result over an already-materialized entry list.
    #[must_use]
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Self {
        Self::new(Box::new(BufferedEntries::new(entries)))
    }

    /// Yields the next entry, or `None` once the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry cannot be decoded.
    pub async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        self.stream.next_entry().await
    }

    /// Drains the remaining entries into a vector.
    ///
    /// # Errors
    ///
    /// Returns the first decoding error encountered.
    pub async fn collect_entries(&mut self) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.stream.next_entry().await? {
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl std::fmt::Debug for SearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchResult").finish_non_exhaustive()
    }
}

/// Stream over a buffered entry list.
pub(crate) struct BufferedEntries {
    inner: std::vec::IntoIter<DirectoryEntry>,
}

impl BufferedEntries {
    pub(crate) fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            inner: entries.into_iter(),
        }
    }
}

#[async_trait]
impl EntryStream for BufferedEntries {
    async fn next_entry(&mut self) -> Result<Option<DirectoryEntry>> {
        Ok(self.inner.next())
    }
}

/// Stable re-sort of the entries by the first value of one attribute.
///
/// Entries missing the attribute order before entries that carry it. Called
/// once per sort attribute, in sequence: because each pass re-sorts the whole
/// set, the last attribute applied dominates the final order, and earlier
/// attributes only survive through ties. This matches the classic
/// `ldap_sort` behavior of repeated single-key sorting and is deliberately
/// not a combined multi-key comparator.
pub(crate) fn sort_by_attribute(entries: &mut [DirectoryEntry], attribute: &str) {
    entries.sort_by(|a, b| a.first(attribute).cmp(&b.first(attribute)));
}
