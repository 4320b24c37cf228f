//! # Steward Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The declarative field-mapping layer between local and EXT schemas
//! - The pull reconciliation and push synchronization algorithms
//! - Port/adapter interfaces (traits) for repositories and the EXT gateway
//!
//! ## Architecture Principles
//! - Only depends on `steward-domain`
//! - No database or HTTP code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod mapping;
pub mod ports;
pub mod push;
pub mod sync;
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use mapping::{
    buyer_field_map, communication_field_map, property_field_map, submission_field_map, FieldMap,
    FieldSpec, TypeClass,
};
pub use ports::{
    BuyerRepository, CommunicationRepository, DocumentRepository, ExtRecord, ExtRecords, FieldData,
    ProgramRepository, PropertyRepository, SubmissionRepository,
};
pub use push::PushGateway;
pub use sync::SyncReconciler;
