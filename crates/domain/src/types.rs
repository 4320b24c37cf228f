//! Common data types used throughout the portal core
//!
//! These are the local entities the bridge reads and writes through the
//! repository contracts. The local store's persistence engine is not part
//! of this crate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A sold property with compliance obligations, keyed by parcel identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    /// Natural key used for upserts and EXT cross-links
    pub parcel_id: String,
    pub address: String,
    pub program_id: Uuid,
    pub buyer_id: Uuid,
    pub status: String,
    pub enforcement_level: i64,
    pub percent_complete: f64,
    pub purchase_price: f64,
    pub is_occupied: bool,
    pub is_insured: bool,
    pub date_sold: Option<NaiveDate>,
    // Optional fields below are protected during sync: an EXT record that
    // has not caught up never nulls out a locally entered value.
    pub closing_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub next_deadline: Option<NaiveDate>,
    pub case_number: Option<String>,
    pub notes: Option<String>,
}

/// A buyer of record; email is the only deduplication identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
}

/// A disposition program a property was sold under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    /// Short lookup key (e.g. "vip")
    pub key: String,
    /// Human-readable label as it appears in EXT (e.g. "VIP")
    pub label: String,
}

/// A compliance submission filed by a buyer against a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub submitted_on: NaiveDate,
    pub kind: String,
    pub status: String,
    pub notes: Option<String>,
}

/// A logged contact with a buyer about a property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub occurred_on: NaiveDate,
    pub channel: String,
    pub summary: String,
}

/// Category of a document attached to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Photo,
    Document,
    Receipt,
}

/// A file attached to a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub category: DocumentCategory,
    pub filename: String,
}

/// One failed record inside a sync batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecordError {
    /// Identifier of the source EXT record (or its parcel when known)
    pub record_id: String,
    pub reason: String,
}

/// Aggregated statistics for one sync invocation; never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    pub synced: u64,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: Vec<SyncRecordError>,
}

impl SyncStats {
    pub fn record_error(&mut self, record_id: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(SyncRecordError { record_id: record_id.into(), reason: reason.into() });
    }
}

/// Mapped shapes for one EXT record, returned by dry-run syncs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPreview {
    pub property: Value,
    pub buyer: Value,
}

/// Result of a sync invocation
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Full reconciliation ran; local records were upserted
    Completed(SyncStats),
    /// Dry run: mapping and reporting only, no local mutation
    Preview(Vec<SyncPreview>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_stats_default_is_empty() {
        let stats = SyncStats::default();
        assert_eq!(stats.synced, 0);
        assert_eq!(stats.created, 0);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.skipped, 0);
        assert!(stats.errors.is_empty());
    }

    #[test]
    fn test_record_error_captures_id_and_reason() {
        let mut stats = SyncStats::default();
        stats.record_error("123", "missing parcel id");
        assert_eq!(stats.errors.len(), 1);
        assert_eq!(stats.errors[0].record_id, "123");
        assert_eq!(stats.errors[0].reason, "missing parcel id");
    }

    #[test]
    fn test_document_category_serde_names() {
        let json = serde_json::to_string(&DocumentCategory::Photo).unwrap();
        assert_eq!(json, "\"photo\"");
        let back: DocumentCategory = serde_json::from_str("\"receipt\"").unwrap();
        assert_eq!(back, DocumentCategory::Receipt);
    }
}
