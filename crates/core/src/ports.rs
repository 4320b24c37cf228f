//! Port interfaces for the bridge
//!
//! The local relational store and the EXT platform are both reached through
//! traits; infrastructure implementations live in `steward-infra`.

use async_trait::async_trait;
use steward_domain::{
    Buyer, Communication, Document, Program, Property, Result, Submission,
};
use uuid::Uuid;

/// Field name to value payload, in either schema's vocabulary
pub type FieldData = serde_json::Map<String, serde_json::Value>;

/// One record as returned by EXT
#[derive(Debug, Clone)]
pub struct ExtRecord {
    /// EXT's own record identifier
    pub record_id: String,
    /// Modification id for optimistic concurrency, when provided
    pub mod_id: Option<String>,
    pub fields: FieldData,
}

/// The EXT gateway consumed by the reconciler and push gateway.
///
/// Implementations own session acquisition, circuit breaking and the single
/// auth-class retry; callers see classified [`steward_domain::BridgeError`]s.
#[async_trait]
pub trait ExtRecords: Send + Sync {
    /// Acquire a session up front, failing fast with `ConfigurationMissing`
    /// when the bridge is unconfigured.
    async fn ensure_session(&self) -> Result<()>;

    /// Fetch one page of property records. Offsets are 1-based.
    async fn fetch_properties(&self, offset: u32, limit: u32) -> Result<Vec<ExtRecord>>;

    /// Find the EXT property record for a parcel. A `not_found` error means
    /// the cross-link is simply absent.
    async fn find_property_by_parcel(&self, parcel_id: &str) -> Result<ExtRecord>;

    /// Create a submission record from an already-mapped payload, returning
    /// the created EXT record identifier.
    async fn create_submission(&self, fields: FieldData) -> Result<String>;

    /// Create a communication record, returning the created identifier.
    async fn create_communication(&self, fields: FieldData) -> Result<String>;

    /// Update fields on an existing property record.
    async fn update_property(&self, record_id: &str, fields: FieldData) -> Result<()>;
}

/// Trait for property persistence, keyed by parcel identifier
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>>;

    async fn find_by_parcel(&self, parcel_id: &str) -> Result<Option<Property>>;

    async fn create(&self, property: Property) -> Result<Property>;

    async fn update(&self, property: Property) -> Result<Property>;
}

/// Trait for buyer persistence; email is the only natural key
#[async_trait]
pub trait BuyerRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Buyer>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Buyer>>;

    async fn create(&self, buyer: Buyer) -> Result<Buyer>;

    async fn update(&self, buyer: Buyer) -> Result<Buyer>;
}

/// Trait for program lookups
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// All programs; the reconciler preloads these into a lookup cache
    async fn list_all(&self) -> Result<Vec<Program>>;
}

/// Trait for loading submissions to push
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>>;
}

/// Trait for loading communications to push
#[async_trait]
pub trait CommunicationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Communication>>;
}

/// Trait for documents attached to submissions
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn list_for_submission(&self, submission_id: Uuid) -> Result<Vec<Document>>;
}
