//! Shared scaffolding for bridge integration tests
//!
//! Starts a mock EXT server with a working login endpoint and builds a
//! request client wired to an in-memory shared-state store.

use std::sync::Arc;

use serde_json::{json, Value};
use steward_common::state::MemoryStateStore;
use steward_domain::{BridgeConfig, LayoutConfig};
use steward_infra::RequestClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_PATH: &str = "/api/v1/databases/compliance/sessions";
pub const PROPERTIES_RECORDS_PATH: &str =
    "/api/v1/databases/compliance/layouts/Properties/records";
pub const PROPERTIES_FIND_PATH: &str = "/api/v1/databases/compliance/layouts/Properties/_find";
pub const SUBMISSIONS_RECORDS_PATH: &str =
    "/api/v1/databases/compliance/layouts/ComplianceSubmissions/records";

pub fn envelope_ok(response: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "messages": [{"code": "0", "message": "OK"}],
        "response": response
    }))
}

pub fn envelope_err(code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "messages": [{"code": code, "message": message}],
        "response": {}
    }))
}

pub struct TestBridge {
    pub server: MockServer,
    pub client: Arc<RequestClient>,
}

impl TestBridge {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SESSION_PATH))
            .respond_with(envelope_ok(json!({"token": "session-token"})))
            .mount(&server)
            .await;

        let config = BridgeConfig {
            server: server.uri(),
            database: "compliance".to_string(),
            username: "bridge".to_string(),
            password: "secret".to_string(),
            layouts: LayoutConfig::default(),
        };
        let store = Arc::new(MemoryStateStore::new());
        let client = Arc::new(RequestClient::new(config, store).expect("request client"));

        Self { server, client }
    }
}

/// One EXT property record as the data envelope carries it
pub fn ext_property(record_id: &str, parcel: &str, email: Option<&str>) -> Value {
    let mut fields = json!({
        "Parcel Number": parcel,
        "Property Address": format!("{parcel} Main St"),
        "Sales Disposition": "VIP",
        "Compliance Status": "In Compliance",
        "Date Sold": "11/20/2023",
        "Enforcement Level": "1",
        "Percent Complete": "40",
        "Purchase Price": "1500",
        "Occupied": "1",
        "Insurance Verified": "0",
        "Buyer Name": "Smith, John"
    });
    if let Some(email) = email {
        fields["Buyer Email"] = json!(email);
    }
    json!({ "fieldData": fields, "recordId": record_id, "modId": "1" })
}
