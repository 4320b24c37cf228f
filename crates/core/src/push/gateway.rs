//! Outbound push of single local records into EXT
//!
//! Submissions and communications are created in EXT exactly once per push.
//! After a successful create the cross-linked EXT property record gets its
//! last-contact date refreshed best-effort; a missing cross-link or a failed
//! update is logged and never fails the push.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use steward_domain::{BridgeError, Buyer, Document, DocumentCategory, Property, Result};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::mapping::{communication_field_map, submission_field_map};
use crate::ports::{
    BuyerRepository, CommunicationRepository, DocumentRepository, ExtRecords, FieldData,
    PropertyRepository, SubmissionRepository,
};

/// EXT-side field refreshed after every successful push
const LAST_CONTACT_FIELD: &str = "Last Contact Date";

/// Local ISO date format fed to the field mapper
const LOCAL_DATE_FMT: &str = "%Y-%m-%d";
/// EXT date format, used for the direct last-contact write
const EXT_DATE_FMT: &str = "%m/%d/%Y";

/// Creates EXT records for locally filed submissions and communications
pub struct PushGateway {
    ext: Arc<dyn ExtRecords>,
    properties: Arc<dyn PropertyRepository>,
    buyers: Arc<dyn BuyerRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    communications: Arc<dyn CommunicationRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl PushGateway {
    pub fn new(
        ext: Arc<dyn ExtRecords>,
        properties: Arc<dyn PropertyRepository>,
        buyers: Arc<dyn BuyerRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        communications: Arc<dyn CommunicationRepository>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self { ext, properties, buyers, submissions, communications, documents }
    }

    /// Push one compliance submission into EXT, returning the created EXT
    /// record identifier.
    ///
    /// The payload carries parcel and buyer context plus per-category
    /// document counts so the EXT record stands on its own.
    #[instrument(skip(self))]
    pub async fn push_submission(&self, id: Uuid) -> Result<String> {
        let submission = self
            .submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| BridgeError::Repository(format!("no submission with id {id}")))?;
        let property = self.load_property(submission.property_id).await?;
        let buyer = self.load_buyer(submission.buyer_id).await?;
        let documents = self.documents.list_for_submission(submission.id).await?;

        let mut local = FieldData::new();
        insert_date(&mut local, "submitted_on", submission.submitted_on);
        insert_str(&mut local, "kind", &submission.kind);
        insert_str(&mut local, "status", &submission.status);
        if let Some(notes) = &submission.notes {
            insert_str(&mut local, "notes", notes);
        }
        insert_context(&mut local, &property, &buyer);
        insert_count(&mut local, "photo_count", &documents, DocumentCategory::Photo);
        insert_count(&mut local, "document_count", &documents, DocumentCategory::Document);
        insert_count(&mut local, "receipt_count", &documents, DocumentCategory::Receipt);

        let payload = submission_field_map().to_external(&local);
        let record_id = self.ext.create_submission(payload).await?;
        info!(%record_id, parcel_id = %property.parcel_id, "pushed submission to EXT");

        self.touch_last_contact(&property.parcel_id, submission.submitted_on).await;
        Ok(record_id)
    }

    /// Push one logged buyer contact into EXT, returning the created EXT
    /// record identifier.
    #[instrument(skip(self))]
    pub async fn push_communication(&self, id: Uuid) -> Result<String> {
        let communication = self
            .communications
            .find_by_id(id)
            .await?
            .ok_or_else(|| BridgeError::Repository(format!("no communication with id {id}")))?;
        let property = self.load_property(communication.property_id).await?;
        let buyer = self.load_buyer(communication.buyer_id).await?;

        let mut local = FieldData::new();
        insert_date(&mut local, "occurred_on", communication.occurred_on);
        insert_str(&mut local, "channel", &communication.channel);
        insert_str(&mut local, "summary", &communication.summary);
        insert_context(&mut local, &property, &buyer);

        let payload = communication_field_map().to_external(&local);
        let record_id = self.ext.create_communication(payload).await?;
        info!(%record_id, parcel_id = %property.parcel_id, "pushed communication to EXT");

        self.touch_last_contact(&property.parcel_id, communication.occurred_on).await;
        Ok(record_id)
    }

    async fn load_property(&self, id: Uuid) -> Result<Property> {
        self.properties
            .find_by_id(id)
            .await?
            .ok_or_else(|| BridgeError::Repository(format!("no property with id {id}")))
    }

    async fn load_buyer(&self, id: Uuid) -> Result<Buyer> {
        self.buyers
            .find_by_id(id)
            .await?
            .ok_or_else(|| BridgeError::Repository(format!("no buyer with id {id}")))
    }

    /// Refresh the cross-linked property record's last-contact date. A
    /// missing cross-link is normal; any other failure is logged and dropped
    /// so the already-created record is not reported as a push failure.
    async fn touch_last_contact(&self, parcel_id: &str, contact_date: NaiveDate) {
        let cross = match self.ext.find_property_by_parcel(parcel_id).await {
            Ok(record) => record,
            Err(err) if err.is_not_found() => {
                debug!(parcel_id, "no EXT property record to annotate");
                return;
            }
            Err(err) => {
                warn!(parcel_id, error = %err, "last-contact lookup failed");
                return;
            }
        };

        let mut fields = FieldData::new();
        fields.insert(
            LAST_CONTACT_FIELD.to_string(),
            Value::String(contact_date.format(EXT_DATE_FMT).to_string()),
        );
        if let Err(err) = self.ext.update_property(&cross.record_id, fields).await {
            warn!(parcel_id, record_id = %cross.record_id, error = %err, "last-contact update failed");
        }
    }
}

fn insert_str(local: &mut FieldData, key: &str, value: &str) {
    local.insert(key.to_string(), Value::String(value.to_string()));
}

fn insert_date(local: &mut FieldData, key: &str, date: NaiveDate) {
    insert_str(local, key, &date.format(LOCAL_DATE_FMT).to_string());
}

/// Parcel and buyer context fields shared by both push payloads
fn insert_context(local: &mut FieldData, property: &Property, buyer: &Buyer) {
    insert_str(local, "parcel_id", &property.parcel_id);
    insert_str(local, "first_name", &buyer.first_name);
    insert_str(local, "last_name", &buyer.last_name);
    if let Some(email) = &buyer.email {
        insert_str(local, "email", email);
    }
}

/// Counts land in EXT as plain text fields
fn insert_count(local: &mut FieldData, key: &str, documents: &[Document], category: DocumentCategory) {
    let count = documents.iter().filter(|d| d.category == category).count();
    insert_str(local, key, &count.to_string());
}
