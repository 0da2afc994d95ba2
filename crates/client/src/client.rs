//! Badge service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers the full upload flow: exchange app credentials for a bearer
//! token, then PUT the hashed payload to the versioned endpoint that
//! matches the input mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// CSV payloads can be large and the v2 endpoint ingests them
/// synchronously, so that request gets a longer read timeout.
const CSV_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!("badgeport/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide HTTP transport. Constructed once at startup
/// and handed to [`BadgeClient::new`].
pub fn build_http() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client")
}

/// Badge service API client (blocking).
pub struct BadgeClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

/// Short-lived bearer token from the access-token exchange. Valid only
/// for the upload call that immediately follows; never persisted.
#[derive(Debug)]
pub struct AccessToken(String);

/// One upload request body, paired with the endpoint version that
/// accepts it.
#[derive(Debug, PartialEq)]
pub enum BadgePayload {
    /// v1: flat JSON list of hashed card ids
    HashedCardIds(Vec<String>),
    /// v2: RFC4180 CSV text `badge,riderId[,delete]`
    BadgeCsv {
        csv: String,
        namespace: Option<String>,
        incremental: bool,
    },
    /// v3: card rows as `[riderId, prox, uhf]` triples
    Cards(Vec<[String; 3]>),
}

/// Error type for service operations. All variants are terminal; the
/// caller never retries.
#[derive(Debug)]
pub enum ServiceError {
    /// Transport failure (DNS, TCP, TLS, timeout)
    Network(String),
    /// Token exchange rejected with a non-2xx status
    AuthFailed { status: u16, body: String },
    /// Token exchange response body did not parse
    AuthParse(String),
    /// Upload rejected with a non-2xx status
    Upload { status: u16, body: String },
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Network(msg) => write!(f, "network error: {}", msg),
            ServiceError::AuthFailed { status, body } => {
                write!(f, "access token exchange failed (HTTP {}): {}", status, body)
            }
            ServiceError::AuthParse(msg) => {
                write!(f, "malformed access token response: {}", msg)
            }
            ServiceError::Upload { status, body } => {
                write!(f, "upload rejected (HTTP {}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenRequest<'a> {
    app_id: &'a str,
    secret: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessTokenResponse {
    access_token: String,
}

impl BadgeClient {
    /// Create a client over an already-built transport.
    pub fn new(http: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Exchange app credentials for a bearer token.
    ///
    /// `POST {base}/v1/accessToken` with `{"appId", "secret"}`, expecting
    /// `{"accessToken"}` back. Any non-2xx status or unparseable body is
    /// fatal.
    pub fn access_token(&self, app_id: &str, secret: &str) -> Result<AccessToken, ServiceError> {
        let url = format!("{}/v1/accessToken", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(&AccessTokenRequest { app_id, secret })
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ServiceError::AuthFailed {
                status,
                body: snippet(&body),
            });
        }

        let parsed: AccessTokenResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::AuthParse(format!("{} (body: {})", e, snippet(&body))))?;
        if parsed.access_token.is_empty() {
            return Err(ServiceError::AuthParse("empty accessToken".into()));
        }

        Ok(AccessToken(parsed.access_token))
    }

    /// PUT one payload to its versioned endpoint, carrying the bearer
    /// token. A single atomic request from the client's point of view:
    /// no retry, no partial success.
    pub fn upload(&self, token: &AccessToken, payload: BadgePayload) -> Result<(), ServiceError> {
        let req = match payload {
            BadgePayload::HashedCardIds(ids) => self
                .http
                .put(format!("{}/v1/badgeData", self.base_url))
                .json(&serde_json::json!({ "hashedCardIds": ids })),
            BadgePayload::BadgeCsv {
                csv,
                namespace,
                incremental,
            } => {
                let mut query: Vec<(&str, String)> = Vec::new();
                if let Some(ns) = namespace {
                    query.push(("namespace", ns));
                }
                if incremental {
                    query.push(("incremental", "true".to_string()));
                }
                self.http
                    .put(format!("{}/v2/badgeData", self.base_url))
                    .query(&query)
                    .timeout(CSV_UPLOAD_TIMEOUT)
                    .header(reqwest::header::CONTENT_TYPE, "text/csv; charset=utf-8")
                    .body(csv)
            }
            BadgePayload::Cards(cards) => self
                .http
                .put(format!("{}/v3/badgeData", self.base_url))
                .json(&serde_json::json!({ "cards": cards, "facilityCodes": [] })),
        };

        let resp = req
            .bearer_auth(&token.0)
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().unwrap_or_default();
            return Err(ServiceError::Upload {
                status,
                body: snippet(&body),
            });
        }

        Ok(())
    }
}

/// First 200 bytes of a response body, for error messages.
fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut end = MAX;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(base_url: String) -> BadgeClient {
        BadgeClient::new(build_http(), base_url)
    }

    #[test]
    fn test_access_token_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/accessToken")
                .json_body(serde_json::json!({ "appId": "app-1", "secret": "s3cr3t" }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "accessToken": "tok-abc" }));
        });

        let token = client(server.base_url())
            .access_token("app-1", "s3cr3t")
            .unwrap();

        mock.assert();
        assert_eq!(token.0, "tok-abc");
    }

    #[test]
    fn test_access_token_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/accessToken");
            then.status(401)
                .json_body(serde_json::json!({ "message": "bad credentials" }));
        });

        let err = client(server.base_url())
            .access_token("app-1", "wrong")
            .unwrap_err();

        // Exactly one attempt: auth failures are never retried
        mock.assert_calls(1);
        match err {
            ServiceError::AuthFailed { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad credentials"));
            }
            other => panic!("expected AuthFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_access_token_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/accessToken");
            then.status(200).body("not json at all");
        });

        let err = client(server.base_url())
            .access_token("app-1", "s")
            .unwrap_err();
        assert!(matches!(err, ServiceError::AuthParse(_)));
    }

    #[test]
    fn test_access_token_missing_field() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/accessToken");
            then.status(200)
                .json_body(serde_json::json!({ "unexpected": "shape" }));
        });

        let err = client(server.base_url())
            .access_token("app-1", "s")
            .unwrap_err();
        assert!(matches!(err, ServiceError::AuthParse(_)));
    }

    #[test]
    fn test_upload_v1_hashed_card_ids() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v1/badgeData")
                .header("authorization", "Bearer tok-1")
                .json_body(serde_json::json!({ "hashedCardIds": ["aa", "bb"] }));
            then.status(200);
        });

        client(server.base_url())
            .upload(
                &AccessToken("tok-1".into()),
                BadgePayload::HashedCardIds(vec!["aa".into(), "bb".into()]),
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_upload_v2_csv_with_namespace_and_incremental() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v2/badgeData")
                .query_param("namespace", "campus-7")
                .query_param("incremental", "true")
                .header("authorization", "Bearer tok-2")
                .header("content-type", "text/csv; charset=utf-8")
                .body("badge,riderId,delete\nab,rider-1,F\n");
            then.status(200);
        });

        client(server.base_url())
            .upload(
                &AccessToken("tok-2".into()),
                BadgePayload::BadgeCsv {
                    csv: "badge,riderId,delete\nab,rider-1,F\n".into(),
                    namespace: Some("campus-7".into()),
                    incremental: true,
                },
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_upload_v2_csv_plain_query() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v2/badgeData")
                .query_param_missing("namespace")
                .query_param_missing("incremental");
            then.status(204);
        });

        client(server.base_url())
            .upload(
                &AccessToken("tok".into()),
                BadgePayload::BadgeCsv {
                    csv: "badge,riderId\n".into(),
                    namespace: None,
                    incremental: false,
                },
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_upload_v3_cards() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/v3/badgeData")
                .header("authorization", "Bearer tok-3")
                .json_body(serde_json::json!({
                    "cards": [["rider-1", "aa", ""], ["rider-2", "", "bb"]],
                    "facilityCodes": [],
                }));
            then.status(200);
        });

        client(server.base_url())
            .upload(
                &AccessToken("tok-3".into()),
                BadgePayload::Cards(vec![
                    ["rider-1".into(), "aa".into(), "".into()],
                    ["rider-2".into(), "".into(), "bb".into()],
                ]),
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_upload_rejected_carries_status_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PUT).path("/v2/badgeData");
            then.status(422).body("unknown namespace");
        });

        let err = client(server.base_url())
            .upload(
                &AccessToken("tok".into()),
                BadgePayload::BadgeCsv {
                    csv: "badge,riderId\n".into(),
                    namespace: None,
                    incremental: false,
                },
            )
            .unwrap_err();

        // A failed upload is terminal; exactly one request goes out
        mock.assert_calls(1);
        match err {
            ServiceError::Upload { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "unknown namespace");
            }
            other => panic!("expected Upload, got {:?}", other),
        }
    }

    #[test]
    fn test_network_error() {
        // Nothing listens on this port
        let err = client("http://127.0.0.1:1".into())
            .access_token("a", "s")
            .unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
    }

    #[test]
    fn test_snippet_truncates_long_bodies() {
        let long = "x".repeat(500);
        let s = snippet(&long);
        assert_eq!(s.len(), 203);
        assert!(s.ends_with("..."));
        assert_eq!(snippet("  short  "), "short");
    }
}
