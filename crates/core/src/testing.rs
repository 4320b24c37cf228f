//! In-memory repository fakes
//!
//! Shared by unit tests in this crate and integration tests in
//! `steward-infra`. These mirror the repository contracts only; they are
//! not a persistence engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use steward_domain::{
    BridgeError, Buyer, Communication, Document, Program, Property, Result, Submission,
};
use uuid::Uuid;

use crate::ports::{
    BuyerRepository, CommunicationRepository, DocumentRepository, ProgramRepository,
    PropertyRepository, SubmissionRepository,
};

/// Property store keyed by id, with parcel-id lookups
#[derive(Default)]
pub struct MemoryPropertyRepository {
    records: Mutex<HashMap<Uuid, Property>>,
}

impl MemoryPropertyRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<Property> {
        self.records.lock().values().cloned().collect()
    }
}

#[async_trait]
impl PropertyRepository for MemoryPropertyRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn find_by_parcel(&self, parcel_id: &str) -> Result<Option<Property>> {
        Ok(self.records.lock().values().find(|p| p.parcel_id == parcel_id).cloned())
    }

    async fn create(&self, property: Property) -> Result<Property> {
        self.records.lock().insert(property.id, property.clone());
        Ok(property)
    }

    async fn update(&self, property: Property) -> Result<Property> {
        let mut records = self.records.lock();
        if !records.contains_key(&property.id) {
            return Err(BridgeError::Repository(format!("no property with id {}", property.id)));
        }
        records.insert(property.id, property.clone());
        Ok(property)
    }
}

/// Buyer store keyed by id, with email lookups
#[derive(Default)]
pub struct MemoryBuyerRepository {
    records: Mutex<HashMap<Uuid, Buyer>>,
}

impl MemoryBuyerRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<Buyer> {
        self.records.lock().values().cloned().collect()
    }
}

#[async_trait]
impl BuyerRepository for MemoryBuyerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Buyer>> {
        Ok(self.records.lock().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Buyer>> {
        Ok(self
            .records
            .lock()
            .values()
            .find(|b| b.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create(&self, buyer: Buyer) -> Result<Buyer> {
        self.records.lock().insert(buyer.id, buyer.clone());
        Ok(buyer)
    }

    async fn update(&self, buyer: Buyer) -> Result<Buyer> {
        let mut records = self.records.lock();
        if !records.contains_key(&buyer.id) {
            return Err(BridgeError::Repository(format!("no buyer with id {}", buyer.id)));
        }
        records.insert(buyer.id, buyer.clone());
        Ok(buyer)
    }
}

/// Fixed program list
pub struct MemoryProgramRepository {
    programs: Vec<Program>,
}

impl MemoryProgramRepository {
    pub fn with_programs(programs: Vec<Program>) -> Arc<Self> {
        Arc::new(Self { programs })
    }

    /// The standard disposition programs most tests want
    pub fn standard() -> Arc<Self> {
        let labels = [("vip", "VIP"), ("demo", "Demo"), ("homeownership", "Homeownership")];
        Self::with_programs(
            labels
                .iter()
                .map(|(key, label)| Program {
                    id: Uuid::new_v4(),
                    key: (*key).to_string(),
                    label: (*label).to_string(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ProgramRepository for MemoryProgramRepository {
    async fn list_all(&self) -> Result<Vec<Program>> {
        Ok(self.programs.clone())
    }
}

/// Submission store keyed by id
#[derive(Default)]
pub struct MemorySubmissionRepository {
    records: Mutex<HashMap<Uuid, Submission>>,
}

impl MemorySubmissionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, submission: Submission) {
        self.records.lock().insert(submission.id, submission);
    }
}

#[async_trait]
impl SubmissionRepository for MemorySubmissionRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>> {
        Ok(self.records.lock().get(&id).cloned())
    }
}

/// Communication store keyed by id
#[derive(Default)]
pub struct MemoryCommunicationRepository {
    records: Mutex<HashMap<Uuid, Communication>>,
}

impl MemoryCommunicationRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, communication: Communication) {
        self.records.lock().insert(communication.id, communication);
    }
}

#[async_trait]
impl CommunicationRepository for MemoryCommunicationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Communication>> {
        Ok(self.records.lock().get(&id).cloned())
    }
}

/// Document store grouped by submission
#[derive(Default)]
pub struct MemoryDocumentRepository {
    records: Mutex<Vec<Document>>,
}

impl MemoryDocumentRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, document: Document) {
        self.records.lock().push(document);
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn list_for_submission(&self, submission_id: Uuid) -> Result<Vec<Document>> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|d| d.submission_id == submission_id)
            .cloned()
            .collect())
    }
}
