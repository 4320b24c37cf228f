//! Binary attachment retrieval
//!
//! EXT returns container field values as short-lived signed URLs instead of
//! raw bytes. The URL stays valid for roughly fifteen minutes; there is no
//! renewal mechanism, so downloads must complete within that window.

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION};
use reqwest::Method;
use steward_domain::{BridgeError, Result};

use crate::http::HttpClient;

/// A downloaded attachment with its original filename
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// True when a field value looks like one of EXT's temporary container
/// URLs rather than ordinary field data.
pub fn is_attachment_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| {
            matches!(parsed.scheme(), "http" | "https")
                && parsed.query_pairs().any(|(key, _)| key == "RCType")
        })
        .unwrap_or(false)
}

/// Fetch an attachment through its temporary URL, re-authenticating with
/// the session token.
///
/// The original filename comes from the content-disposition header; when
/// absent a timestamp-based name is used.
pub async fn download_attachment(http: &HttpClient, token: &str, url: &str) -> Result<Attachment> {
    let builder = http.request(Method::GET, url).header(AUTHORIZATION, format!("Bearer {token}"));
    let response = http.send(builder).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(BridgeError::Network(format!("attachment download failed with HTTP {status}")));
    }

    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(filename_from_disposition)
        .unwrap_or_else(fallback_filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|err| BridgeError::Network(format!("attachment body: {err}")))?
        .to_vec();

    Ok(Attachment { filename, bytes })
}

fn filename_from_disposition(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let rest = part.strip_prefix("filename=")?;
        let name = rest.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}

fn fallback_filename() -> String {
    format!("attachment-{}.bin", Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_container_urls_are_detected() {
        assert!(is_attachment_url(
            "https://records.example.org/Streaming_SSL/MainDB/photo.jpg?RCType=EmbeddedRCFileProcessor"
        ));
        assert!(is_attachment_url("http://records.example.org/x?RCType=1&foo=bar"));
    }

    #[test]
    fn test_ordinary_values_are_not_attachments() {
        assert!(!is_attachment_url("https://records.example.org/photo.jpg"));
        assert!(!is_attachment_url("49-06-152-003"));
        assert!(!is_attachment_url(""));
        assert!(!is_attachment_url("ftp://records.example.org/x?RCType=1"));
    }

    #[test]
    fn test_filename_parsed_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"photo.jpg\""),
            Some("photo.jpg".to_string())
        );
        assert_eq!(
            filename_from_disposition("inline; filename=receipt.pdf"),
            Some("receipt.pdf".to_string())
        );
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition("attachment; filename=\"\""), None);
    }

    #[tokio::test]
    async fn test_download_carries_token_and_filename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/container/photo.jpg"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Disposition", "attachment; filename=\"photo.jpg\"")
                    .set_body_bytes(vec![0xFF, 0xD8, 0xFF]),
            )
            .mount(&server)
            .await;

        let http = HttpClient::new().unwrap();
        let url = format!("{}/container/photo.jpg?RCType=EmbeddedRCFileProcessor", server.uri());
        let attachment = download_attachment(&http, "tok-1", &url).await.unwrap();

        assert_eq!(attachment.filename, "photo.jpg");
        assert_eq!(attachment.bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_missing_disposition_falls_back_to_timestamp_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
            .mount(&server)
            .await;

        let http = HttpClient::new().unwrap();
        let attachment = download_attachment(&http, "tok-1", &server.uri()).await.unwrap();

        assert!(attachment.filename.starts_with("attachment-"));
        assert!(attachment.filename.ends_with(".bin"));
    }

    #[tokio::test]
    async fn test_failed_download_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

        let http = HttpClient::new().unwrap();
        let err = download_attachment(&http, "tok-1", &server.uri()).await.unwrap_err();
        assert!(matches!(err, BridgeError::Network(_)));
    }
}
