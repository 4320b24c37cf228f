//! Authenticated CRUD/query/metadata executor against EXT
//!
//! Every operation is gated by the circuit breaker, authenticated with a
//! token from the session manager, and replayed exactly once on an
//! auth-class failure. Write payloads always carry the validation-bypass
//! option flags: machine writes must not be rejected by rules meant for
//! human data entry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::{json, Map, Value};
use steward_common::state::SharedStateStore;
use steward_core::mapping::property_field_map;
use steward_core::ports::{ExtRecord, ExtRecords, FieldData};
use steward_domain::constants::PORTAL_PAGE_SIZE;
use steward_domain::{BridgeConfig, BridgeError, Result};
use tracing::{debug, instrument};

use super::attachments::{self, Attachment};
use super::circuit::CircuitBreaker;
use super::protocol::{inspect_envelope, parse_records, Envelope};
use super::session::SessionManager;
use crate::http::HttpClient;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pagination, sorting and nested-relation options for list and find calls
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// 1-based record offset
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<Value>,
    pub portals: Vec<PortalOptions>,
}

/// Per-relation pagination window
#[derive(Debug, Clone)]
pub struct PortalOptions {
    pub name: String,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn page(offset: u32, limit: u32) -> Self {
        Self { offset: Some(offset), limit: Some(limit), ..Self::default() }
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(offset) = self.offset {
            pairs.push(("_offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("_limit".to_string(), limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("_sort".to_string(), sort.to_string()));
        }
        if !self.portals.is_empty() {
            let names: Vec<&str> = self.portals.iter().map(|p| p.name.as_str()).collect();
            pairs.push((
                "portal".to_string(),
                serde_json::to_string(&names).unwrap_or_default(),
            ));
            for portal in &self.portals {
                if let Some(offset) = portal.offset {
                    pairs.push((format!("_offset.{}", portal.name), offset.to_string()));
                }
                if let Some(limit) = portal.limit {
                    pairs.push((format!("_limit.{}", portal.name), limit.to_string()));
                }
            }
        }
        pairs
    }

    /// The same options expressed as `_find` body members
    fn body_fragment(&self) -> Map<String, Value> {
        let mut body = Map::new();
        if let Some(offset) = self.offset {
            body.insert("offset".to_string(), Value::String(offset.to_string()));
        }
        if let Some(limit) = self.limit {
            body.insert("limit".to_string(), Value::String(limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), sort.clone());
        }
        if !self.portals.is_empty() {
            let names: Vec<Value> =
                self.portals.iter().map(|p| Value::String(p.name.clone())).collect();
            body.insert("portal".to_string(), Value::Array(names));
            for portal in &self.portals {
                if let Some(offset) = portal.offset {
                    body.insert(format!("offset.{}", portal.name), Value::String(offset.to_string()));
                }
                if let Some(limit) = portal.limit {
                    body.insert(format!("limit.{}", portal.name), Value::String(limit.to_string()));
                }
            }
        }
        body
    }
}

/// Field and relation names discovered from layout metadata
#[derive(Debug, Clone)]
pub struct LayoutFields {
    pub fields: Vec<String>,
    pub portals: Vec<String>,
}

/// Generic authenticated executor for every EXT operation.
///
/// Implements [`ExtRecords`] for the reconciler and push gateway on top of
/// the generic surface.
pub struct RequestClient {
    config: BridgeConfig,
    http: HttpClient,
    session: SessionManager,
    breaker: CircuitBreaker,
}

impl RequestClient {
    pub fn new(config: BridgeConfig, store: Arc<dyn SharedStateStore>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("steward-bridge")
            .build()?;
        let session = SessionManager::new(config.clone(), http.clone(), Arc::clone(&store));
        let breaker = CircuitBreaker::new(store);
        Ok(Self { config, http, session, breaker })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// List records from a layout.
    pub async fn get_records(&self, layout: &str, options: &ListOptions) -> Result<Vec<ExtRecord>> {
        let response = self
            .execute(Method::GET, &format!("/layouts/{layout}/records"), &options.query_pairs(), None)
            .await?;
        Ok(parse_records(&response))
    }

    /// Fetch one record by EXT record id.
    pub async fn get_record(
        &self,
        layout: &str,
        record_id: &str,
        options: &ListOptions,
    ) -> Result<ExtRecord> {
        let response = self
            .execute(
                Method::GET,
                &format!("/layouts/{layout}/records/{record_id}"),
                &options.query_pairs(),
                None,
            )
            .await?;
        parse_records(&response).into_iter().next().ok_or_else(|| BridgeError::NotFound {
            code: "101".to_string(),
            message: format!("record {record_id} missing from response"),
        })
    }

    /// Query-based search. Each criteria map is one find request entry.
    pub async fn find_records(
        &self,
        layout: &str,
        criteria: Vec<FieldData>,
        options: &ListOptions,
    ) -> Result<Vec<ExtRecord>> {
        let mut body = Map::new();
        body.insert(
            "query".to_string(),
            Value::Array(criteria.into_iter().map(Value::Object).collect()),
        );
        body.extend(options.body_fragment());

        let response = self
            .execute(Method::POST, &format!("/layouts/{layout}/_find"), &[], Some(&Value::Object(body)))
            .await?;
        Ok(parse_records(&response))
    }

    /// Create a record, returning EXT's identifier for it.
    pub async fn create_record(&self, layout: &str, fields: FieldData) -> Result<String> {
        let body = json!({ "fieldData": fields, "options": write_options() });
        let response = self
            .execute(Method::POST, &format!("/layouts/{layout}/records"), &[], Some(&body))
            .await?;
        created_record_id(&response)
    }

    /// Update fields on a record. With a modification id EXT enforces
    /// optimistic concurrency and a mismatch surfaces as a conflict.
    pub async fn update_record(
        &self,
        layout: &str,
        record_id: &str,
        fields: FieldData,
        mod_id: Option<&str>,
    ) -> Result<()> {
        let mut body = Map::new();
        body.insert("fieldData".to_string(), Value::Object(fields));
        body.insert("options".to_string(), write_options());
        if let Some(mod_id) = mod_id {
            body.insert("modId".to_string(), Value::String(mod_id.to_string()));
        }

        self.execute(
            Method::PATCH,
            &format!("/layouts/{layout}/records/{record_id}"),
            &[],
            Some(&Value::Object(body)),
        )
        .await?;
        Ok(())
    }

    /// Duplicate a record, returning the new record's identifier.
    pub async fn duplicate_record(&self, layout: &str, record_id: &str) -> Result<String> {
        let response = self
            .execute(Method::POST, &format!("/layouts/{layout}/records/{record_id}"), &[], None)
            .await?;
        created_record_id(&response)
    }

    pub async fn delete_record(&self, layout: &str, record_id: &str) -> Result<()> {
        self.execute(Method::DELETE, &format!("/layouts/{layout}/records/{record_id}"), &[], None)
            .await?;
        Ok(())
    }

    /// Raw field/portal/value-list metadata for a layout.
    pub async fn layout_metadata(&self, layout: &str) -> Result<Value> {
        self.execute(Method::GET, &format!("/layouts/{layout}"), &[], None).await
    }

    /// Field and portal names only, for schema drift diagnostics.
    pub async fn discover_fields(&self, layout: &str) -> Result<LayoutFields> {
        let metadata = self.layout_metadata(layout).await?;

        let fields = metadata
            .get("fieldMetaData")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let portals = metadata
            .get("portalMetaData")
            .and_then(Value::as_object)
            .map(|portals| portals.keys().cloned().collect())
            .unwrap_or_default();

        Ok(LayoutFields { fields, portals })
    }

    /// Fetch every row of a nested relation, one page per round-trip,
    /// stopping when a page comes back short.
    pub async fn get_all_portal_records(
        &self,
        layout: &str,
        record_id: &str,
        portal: &str,
    ) -> Result<Vec<Value>> {
        let mut rows = Vec::new();
        let mut offset = 1u32;

        loop {
            let options = ListOptions {
                portals: vec![PortalOptions {
                    name: portal.to_string(),
                    offset: Some(offset),
                    limit: Some(PORTAL_PAGE_SIZE),
                }],
                ..ListOptions::default()
            };
            let response = self
                .execute(
                    Method::GET,
                    &format!("/layouts/{layout}/records/{record_id}"),
                    &options.query_pairs(),
                    None,
                )
                .await?;

            let page = portal_rows(&response, portal);
            let count = page.len() as u32;
            rows.extend(page);
            if count < PORTAL_PAGE_SIZE {
                break;
            }
            offset += PORTAL_PAGE_SIZE;
        }

        Ok(rows)
    }

    /// Download an attachment through its temporary URL with the current
    /// session token.
    pub async fn download_attachment(&self, url: &str) -> Result<Attachment> {
        let token = self.session.acquire().await?;
        attachments::download_attachment(&self.http, &token, url).await
    }

    /// Gate on the breaker, authenticate, dispatch, and replay exactly once
    /// on an auth-class failure.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        if self.breaker.is_open().await {
            return Err(BridgeError::CircuitOpen { name: "ext".to_string() });
        }

        let mut replayed = false;
        loop {
            let token = self.session.acquire().await?;
            match self.dispatch(method.clone(), path, query, body, &token).await {
                Ok(response) => {
                    self.breaker.record_success().await;
                    return Ok(response);
                }
                Err(err) if err.is_auth() && !replayed => {
                    debug!(path, "auth-class failure, replaying once with a fresh session");
                    replayed = true;
                    self.session.invalidate().await;
                }
                Err(err) => {
                    // Classified EXT errors mean the platform answered; only
                    // transport-level failures count against its health.
                    if matches!(err, BridgeError::Network(_)) {
                        self.breaker.record_failure().await;
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        token: &str,
    ) -> Result<Value> {
        let url = format!("{}{path}", self.config.base_url());
        let mut builder =
            self.http.request(method, &url).header(AUTHORIZATION, format!("Bearer {token}"));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = self.http.send(builder).await?;
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|err| BridgeError::Network(format!("malformed EXT response: {err}")))?;
        inspect_envelope(envelope)
    }
}

fn write_options() -> Value {
    json!({ "entrymode": "script", "prohibitmode": "script" })
}

fn created_record_id(response: &Value) -> Result<String> {
    response.get("recordId").and_then(Value::as_str).map(str::to_string).ok_or_else(|| {
        BridgeError::Unknown {
            code: String::new(),
            message: "create response carried no record id".to_string(),
        }
    })
}

fn portal_rows(response: &Value, portal: &str) -> Vec<Value> {
    response
        .get("data")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .and_then(|record| record.get("portalData"))
        .and_then(|portals| portals.get(portal))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn parcel_external_name() -> &'static str {
    property_field_map()
        .fields
        .iter()
        .find(|spec| spec.local == "parcel_id")
        .map(|spec| spec.external)
        .unwrap_or("Parcel Number")
}

#[async_trait]
impl ExtRecords for RequestClient {
    #[instrument(skip(self))]
    async fn ensure_session(&self) -> Result<()> {
        self.session.acquire().await.map(|_| ())
    }

    async fn fetch_properties(&self, offset: u32, limit: u32) -> Result<Vec<ExtRecord>> {
        self.get_records(&self.config.layouts.properties, &ListOptions::page(offset, limit)).await
    }

    async fn find_property_by_parcel(&self, parcel_id: &str) -> Result<ExtRecord> {
        let mut criteria = FieldData::new();
        criteria
            .insert(parcel_external_name().to_string(), Value::String(format!("=={parcel_id}")));

        let options = ListOptions { limit: Some(1), ..ListOptions::default() };
        let records =
            self.find_records(&self.config.layouts.properties, vec![criteria], &options).await?;
        records.into_iter().next().ok_or_else(|| BridgeError::NotFound {
            code: "401".to_string(),
            message: format!("no property record for parcel {parcel_id}"),
        })
    }

    async fn create_submission(&self, fields: FieldData) -> Result<String> {
        self.create_record(&self.config.layouts.submissions, fields).await
    }

    async fn create_communication(&self, fields: FieldData) -> Result<String> {
        self.create_record(&self.config.layouts.communications, fields).await
    }

    async fn update_property(&self, record_id: &str, fields: FieldData) -> Result<()> {
        self.update_record(&self.config.layouts.properties, record_id, fields, None).await
    }
}
