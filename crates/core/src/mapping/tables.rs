//! Field map tables per entity type
//!
//! These tables are the single source of truth for name translation in both
//! directions. Entries marked unresolved keep their EXT-side name for
//! documentation and read-side mapping, but are never emitted on write.

use super::{FieldMap, FieldSpec, TypeClass};

/// Disposition program labels as they appear in EXT's checkbox value list
pub const PROGRAM_LABELS: &[&str] =
    &["Homeownership", "Rental", "Side Lot", "Demolition", "VIP", "Demo"];

const PROPERTY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("parcel_id", "Parcel Number", TypeClass::Text),
    FieldSpec::new("address", "Property Address", TypeClass::Text),
    FieldSpec::new("program_type", "Sales Disposition", TypeClass::Enumeration),
    FieldSpec::new("status", "Compliance Status", TypeClass::Text),
    FieldSpec::new("date_sold", "Date Sold", TypeClass::Date),
    FieldSpec::new("enforcement_level", "Enforcement Level", TypeClass::Numeric),
    FieldSpec::new("percent_complete", "Percent Complete", TypeClass::Numeric),
    FieldSpec::new("purchase_price", "Purchase Price", TypeClass::Currency),
    FieldSpec::new("is_occupied", "Occupied", TypeClass::Boolean),
    FieldSpec::new("is_insured", "Insurance Verified", TypeClass::Boolean),
    FieldSpec::new("closing_date", "Closing Date", TypeClass::Date),
    FieldSpec::new("last_inspection_date", "Last Inspection", TypeClass::Date),
    FieldSpec::new("next_deadline", "Next Compliance Deadline", TypeClass::Date),
    FieldSpec::new("case_number", "Case Number", TypeClass::Text),
    FieldSpec::new("notes", "Compliance Notes", TypeClass::Text),
    // EXT-side name not confirmed with the records team yet
    FieldSpec::unresolved("lien_status", "Lien Status", TypeClass::Text),
];

const BUYER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("email", "Buyer Email", TypeClass::Text),
    FieldSpec::new("full_name", "Buyer Name", TypeClass::Text),
    FieldSpec::new("phone", "Buyer Phone", TypeClass::Text),
    FieldSpec::new("organization", "Buyer Company", TypeClass::Text),
];

const SUBMISSION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("submitted_on", "Submission Date", TypeClass::Date),
    FieldSpec::new("kind", "Submission Type", TypeClass::Text),
    FieldSpec::new("status", "Review Status", TypeClass::Text),
    FieldSpec::new("notes", "Submission Notes", TypeClass::Text),
    FieldSpec::new("parcel_id", "Parcel Number", TypeClass::Text),
    FieldSpec::new("full_name", "Buyer Name", TypeClass::Text),
    FieldSpec::new("email", "Buyer Email", TypeClass::Text),
    FieldSpec::new("photo_count", "Photo Count", TypeClass::Text),
    FieldSpec::new("document_count", "Document Count", TypeClass::Text),
    FieldSpec::new("receipt_count", "Receipt Count", TypeClass::Text),
    FieldSpec::unresolved("reviewer", "Assigned Reviewer", TypeClass::Text),
];

const COMMUNICATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("occurred_on", "Contact Date", TypeClass::Date),
    FieldSpec::new("channel", "Contact Method", TypeClass::Text),
    FieldSpec::new("summary", "Contact Summary", TypeClass::Text),
    FieldSpec::new("parcel_id", "Parcel Number", TypeClass::Text),
    FieldSpec::new("full_name", "Buyer Name", TypeClass::Text),
    FieldSpec::unresolved("follow_up", "Follow Up Required", TypeClass::Text),
];

static PROPERTY_MAP: FieldMap = FieldMap { entity: "property", fields: PROPERTY_FIELDS };
static BUYER_MAP: FieldMap = FieldMap { entity: "buyer", fields: BUYER_FIELDS };
static SUBMISSION_MAP: FieldMap = FieldMap { entity: "submission", fields: SUBMISSION_FIELDS };
static COMMUNICATION_MAP: FieldMap =
    FieldMap { entity: "communication", fields: COMMUNICATION_FIELDS };

/// Field map for property records
pub fn property_field_map() -> &'static FieldMap {
    &PROPERTY_MAP
}

/// Field map for buyer context on property records
pub fn buyer_field_map() -> &'static FieldMap {
    &BUYER_MAP
}

/// Field map for compliance submissions
pub fn submission_field_map() -> &'static FieldMap {
    &SUBMISSION_MAP
}

/// Field map for buyer communications
pub fn communication_field_map() -> &'static FieldMap {
    &COMMUNICATION_MAP
}
