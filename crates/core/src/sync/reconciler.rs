//! Batch reconciliation of EXT property records
//!
//! Pulls every property record EXT holds, maps each one, and upserts it
//! locally by parcel identifier. One record's failure never aborts the
//! batch. The pull loop has no upper bound on pages or elapsed time; a
//! sufficiently large EXT dataset runs as long as it runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use steward_domain::constants::{DEFAULT_SYNC_PAGE_SIZE, DRY_RUN_PREVIEW_CAP};
use steward_domain::{Buyer, Program, Property, Result, SyncOutcome, SyncPreview, SyncStats};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::mapping::conversions::split_name;
use crate::mapping::{buyer_field_map, property_field_map};
use crate::ports::{
    BuyerRepository, ExtRecord, ExtRecords, FieldData, ProgramRepository, PropertyRepository,
};

/// Pulls all EXT property records and reconciles them into the local store
pub struct SyncReconciler {
    ext: Arc<dyn ExtRecords>,
    properties: Arc<dyn PropertyRepository>,
    buyers: Arc<dyn BuyerRepository>,
    programs: Arc<dyn ProgramRepository>,
}

impl SyncReconciler {
    pub fn new(
        ext: Arc<dyn ExtRecords>,
        properties: Arc<dyn PropertyRepository>,
        buyers: Arc<dyn BuyerRepository>,
        programs: Arc<dyn ProgramRepository>,
    ) -> Self {
        Self { ext, properties, buyers, programs }
    }

    /// Run one sync invocation.
    ///
    /// `limit` is the EXT page size (default 100). With `dry_run` the first
    /// five fetched records are mapped and returned as a preview and no
    /// local mutation occurs.
    #[instrument(skip(self))]
    pub async fn sync(&self, limit: Option<u32>, dry_run: bool) -> Result<SyncOutcome> {
        // Fails fast with ConfigurationMissing when EXT is unconfigured
        self.ext.ensure_session().await?;

        let page_size = limit.unwrap_or(DEFAULT_SYNC_PAGE_SIZE).max(1);
        let fetched = self.fetch_all(page_size).await?;
        info!(total = fetched.len(), "fetched property records from EXT");

        if dry_run {
            let preview = fetched
                .iter()
                .take(DRY_RUN_PREVIEW_CAP)
                .map(|record| SyncPreview {
                    property: Value::Object(property_field_map().from_external(&record.fields)),
                    buyer: Value::Object(buyer_field_map().from_external(&record.fields)),
                })
                .collect();
            return Ok(SyncOutcome::Preview(preview));
        }

        let programs = ProgramCache::load(self.programs.as_ref()).await?;

        let mut stats = SyncStats::default();
        for record in &fetched {
            if let Err(err) = self.reconcile_record(record, &programs, &mut stats).await {
                warn!(record_id = %record.record_id, error = %err, "record failed to reconcile");
                stats.record_error(record.record_id.clone(), err.to_string());
            }
        }

        info!(
            synced = stats.synced,
            created = stats.created,
            updated = stats.updated,
            skipped = stats.skipped,
            errors = stats.errors.len(),
            "sync completed"
        );
        Ok(SyncOutcome::Completed(stats))
    }

    /// Page through EXT property records sequentially, one round-trip at a
    /// time, starting at offset 1. A short page ends the loop; a not_found
    /// page means "no more data", not an error.
    async fn fetch_all(&self, page_size: u32) -> Result<Vec<ExtRecord>> {
        let mut fetched = Vec::new();
        let mut offset = 1u32;

        loop {
            debug!(offset, page_size, "fetching property page");
            let page = match self.ext.fetch_properties(offset, page_size).await {
                Ok(page) => page,
                Err(err) if err.is_not_found() => break,
                Err(err) => return Err(err),
            };

            let count = page.len();
            fetched.extend(page);
            if (count as u32) < page_size {
                break;
            }
            offset += page_size;
        }

        Ok(fetched)
    }

    async fn reconcile_record(
        &self,
        record: &ExtRecord,
        programs: &ProgramCache,
        stats: &mut SyncStats,
    ) -> Result<()> {
        let mapped = property_field_map().from_external(&record.fields);
        let buyer_mapped = buyer_field_map().from_external(&record.fields);

        let Some(parcel_id) = non_empty_str(&mapped, "parcel_id") else {
            stats.skipped += 1;
            stats.record_error(record.record_id.clone(), "record has no parcel identifier");
            return Ok(());
        };

        let buyer_id = self.resolve_buyer(&buyer_mapped).await?;

        let program_type = non_empty_str(&mapped, "program_type");
        let Some(program_id) = programs.resolve(program_type.as_deref()) else {
            // Drop the record entirely: no partial property is created
            stats.skipped += 1;
            stats.record_error(
                record.record_id.clone(),
                format!("unknown program type '{}'", program_type.unwrap_or_default()),
            );
            return Ok(());
        };

        match self.properties.find_by_parcel(&parcel_id).await? {
            Some(existing) => {
                let merged = merge_property(existing, &mapped, program_id, buyer_id);
                self.properties.update(merged).await?;
                stats.updated += 1;
            }
            None => {
                let property = new_property(parcel_id, &mapped, program_id, buyer_id);
                self.properties.create(property).await?;
                stats.created += 1;
            }
        }

        stats.synced += 1;
        Ok(())
    }

    /// Resolve the buyer for a mapped record.
    ///
    /// With an email we can deduplicate: update the match's name, phone and
    /// organization (never its email), else create. Without an email there
    /// is no identity to deduplicate against, so a new buyer is always
    /// created - a stated policy, not an oversight.
    async fn resolve_buyer(&self, mapped: &FieldData) -> Result<Uuid> {
        let (first_name, last_name) =
            split_name(mapped.get("full_name").and_then(Value::as_str));
        let email = non_empty_str(mapped, "email");
        let phone = non_empty_str(mapped, "phone");
        let organization = non_empty_str(mapped, "organization");

        if let Some(email) = email {
            if let Some(mut existing) = self.buyers.find_by_email(&email).await? {
                existing.first_name = first_name;
                existing.last_name = last_name;
                if phone.is_some() {
                    existing.phone = phone;
                }
                if organization.is_some() {
                    existing.organization = organization;
                }
                let updated = self.buyers.update(existing).await?;
                return Ok(updated.id);
            }

            let created = self
                .buyers
                .create(Buyer {
                    id: Uuid::new_v4(),
                    email: Some(email),
                    first_name,
                    last_name,
                    phone,
                    organization,
                })
                .await?;
            return Ok(created.id);
        }

        let created = self
            .buyers
            .create(Buyer { id: Uuid::new_v4(), email: None, first_name, last_name, phone, organization })
            .await?;
        Ok(created.id)
    }
}

/// Preloaded program lookup: by key first, label as fallback
struct ProgramCache {
    by_key: HashMap<String, Uuid>,
    by_label: HashMap<String, Uuid>,
}

impl ProgramCache {
    async fn load(programs: &dyn ProgramRepository) -> Result<Self> {
        let all = programs.list_all().await?;
        let mut by_key = HashMap::new();
        let mut by_label = HashMap::new();
        for program in all {
            by_key.insert(program.key.to_lowercase(), program.id);
            by_label.insert(program.label.to_lowercase(), program.id);
        }
        Ok(Self { by_key, by_label })
    }

    fn resolve(&self, raw: Option<&str>) -> Option<Uuid> {
        let needle = raw?.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.by_key.get(&needle).or_else(|| self.by_label.get(&needle)).copied()
    }
}

fn non_empty_str(mapped: &FieldData, key: &str) -> Option<String> {
    mapped
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_iso_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Core fields are always set from the mapped data, defaulting booleans to
/// false and numerics to 0 when absent.
fn apply_core_fields(property: &mut Property, mapped: &FieldData, program_id: Uuid, buyer_id: Uuid) {
    property.program_id = program_id;
    property.buyer_id = buyer_id;
    property.address = non_empty_str(mapped, "address").unwrap_or_default();
    property.status = non_empty_str(mapped, "status").unwrap_or_default();
    property.enforcement_level = mapped.get("enforcement_level").and_then(Value::as_i64).unwrap_or(0);
    property.percent_complete = mapped.get("percent_complete").and_then(Value::as_f64).unwrap_or(0.0);
    property.purchase_price = mapped.get("purchase_price").and_then(Value::as_f64).unwrap_or(0.0);
    property.is_occupied = mapped.get("is_occupied").and_then(Value::as_bool).unwrap_or(false);
    property.is_insured = mapped.get("is_insured").and_then(Value::as_bool).unwrap_or(false);
    property.date_sold = parse_iso_date(mapped.get("date_sold"));
}

/// Optional date/string fields are set only when the mapped value is
/// present, so an EXT record that has not caught up never nulls out a
/// locally entered value.
fn apply_optional_fields(property: &mut Property, mapped: &FieldData) {
    if let Some(date) = parse_iso_date(mapped.get("closing_date")) {
        property.closing_date = Some(date);
    }
    if let Some(date) = parse_iso_date(mapped.get("last_inspection_date")) {
        property.last_inspection_date = Some(date);
    }
    if let Some(date) = parse_iso_date(mapped.get("next_deadline")) {
        property.next_deadline = Some(date);
    }
    if let Some(value) = non_empty_str(mapped, "case_number") {
        property.case_number = Some(value);
    }
    if let Some(value) = non_empty_str(mapped, "notes") {
        property.notes = Some(value);
    }
}

fn merge_property(
    existing: Property,
    mapped: &FieldData,
    program_id: Uuid,
    buyer_id: Uuid,
) -> Property {
    let mut merged = existing;
    apply_core_fields(&mut merged, mapped, program_id, buyer_id);
    apply_optional_fields(&mut merged, mapped);
    merged
}

fn new_property(parcel_id: String, mapped: &FieldData, program_id: Uuid, buyer_id: Uuid) -> Property {
    let mut property = Property {
        id: Uuid::new_v4(),
        parcel_id,
        address: String::new(),
        program_id,
        buyer_id,
        status: String::new(),
        enforcement_level: 0,
        percent_complete: 0.0,
        purchase_price: 0.0,
        is_occupied: false,
        is_insured: false,
        date_sold: None,
        closing_date: None,
        last_inspection_date: None,
        next_deadline: None,
        case_number: None,
        notes: None,
    };
    apply_core_fields(&mut property, mapped, program_id, buyer_id);
    apply_optional_fields(&mut property, mapped);
    property
}
