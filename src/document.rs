//! Search result pages and per-document records.
//!
//! Document records are kept as raw JSON ([`RawValue`]) and handed to the
//! caller untouched. The only field this crate reads out of a record is its
//! `id`, through [`id_for_document`].

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

/// One page of search results as returned by the search endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of documents matching the search.
    pub total: u64,
    /// Page number this result holds (1-based).
    pub page: u64,
    /// Page size the server applied.
    pub per_page: u64,
    /// Opaque per-document metadata records.
    pub documents: Vec<Box<RawValue>>,
}

impl SearchResult {
    /// Number of pages implied by `total` and `per_page`.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    /// Returns whether no page follows this one.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.page >= self.page_count()
    }

    /// Identifiers of every document on the page, in order.
    ///
    /// # Panics
    ///
    /// Panics if any record lacks a string `id`; see [`id_for_document`].
    #[must_use]
    pub fn document_ids(&self) -> Vec<String> {
        self.documents.iter().map(|doc| id_for_document(doc)).collect()
    }
}

/// Extracts the `id` string of a document record.
///
/// # Panics
///
/// Panics if the record has no `id` field or it is not a string. Every
/// document the API returns carries an id, so a record without one means the
/// upstream format changed and continuing would key assets incorrectly.
#[must_use]
pub fn id_for_document(doc: &RawValue) -> String {
    // Records must be JSON objects, never positional arrays
    let record: Map<String, Value> = serde_json::from_str(doc.get())
        .unwrap_or_else(|e| panic!("document record without a string id: {e}: {}", doc.get()));
    match record.get("id").and_then(Value::as_str) {
        Some(id) => id.to_owned(),
        None => panic!("document record without a string id: {}", doc.get()),
    }
}
