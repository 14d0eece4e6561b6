//! PostgREST client for the hosted database
//!
//! Thin wrapper over Supabase's `/rest/v1` endpoint. Every request carries the
//! project's anon key as `apikey`; the bearer token is either the caller's
//! session token (so row-level security applies) or the anon key itself.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::SupabaseConfig;
use crate::core::error::{AppError, Result};

/// A single `column=op.value` filter, e.g. `("id", "eq.<uuid>")`
pub type Filter<'a> = (&'a str, String);

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct PostgrestErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Client for table operations through PostgREST
#[derive(Clone)]
pub struct PostgrestClient {
    http_client: Client,
    rest_url: String,
    anon_key: String,
    schema: String,
    configured: bool,
}

impl PostgrestClient {
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            http_client: Client::new(),
            rest_url: format!("{}/rest/v1", config.url),
            anon_key: config.anon_key.clone(),
            schema: config.schema.clone(),
            configured: config.is_configured(),
        }
    }

    /// Insert one row and return the stored representation
    pub async fn insert<T, R>(&self, table: &str, row: &T, bearer: Option<&str>) -> Result<Vec<R>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table, &[], bearer)?
            .header("Prefer", "return=representation")
            .json(&[row]);

        let response = self.send(request, "insert", table).await?;
        Self::parse_rows(response, table).await
    }

    /// Apply a partial update to every row matching `filters`
    pub async fn update<T, R>(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        patch: &T,
        bearer: Option<&str>,
    ) -> Result<Vec<R>>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, table, filters, bearer)?
            .header("Prefer", "return=representation")
            .json(patch);

        let response = self.send(request, "update", table).await?;
        Self::parse_rows(response, table).await
    }

    /// Delete every row matching `filters`
    pub async fn delete(
        &self,
        table: &str,
        filters: &[Filter<'_>],
        bearer: Option<&str>,
    ) -> Result<()> {
        let request = self.request(Method::DELETE, table, filters, bearer)?;
        self.send(request, "delete", table).await?;
        Ok(())
    }

    /// Select `columns` from rows matching `filters`, optionally ordered
    /// (`order` uses PostgREST syntax such as `created_at.desc`)
    pub async fn select<R>(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter<'_>],
        order: Option<&str>,
        bearer: Option<&str>,
    ) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let mut request = self
            .request(Method::GET, table, filters, bearer)?
            .query(&[("select", columns)]);
        if let Some(order) = order {
            request = request.query(&[("order", order)]);
        }

        let response = self.send(request, "select", table).await?;
        Self::parse_rows(response, table).await
    }

    fn request(
        &self,
        method: Method,
        table: &str,
        filters: &[Filter<'_>],
        bearer: Option<&str>,
    ) -> Result<RequestBuilder> {
        if !self.configured {
            return Err(AppError::ExternalServiceError(
                "Supabase is not configured".to_string(),
            ));
        }

        let url = format!("{}/{}", self.rest_url, table);
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        Ok(self
            .http_client
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer.unwrap_or(&self.anon_key))
            .header(profile_header, &self.schema)
            .query(filters))
    }

    async fn send(&self, request: RequestBuilder, op: &str, table: &str) -> Result<Response> {
        debug!("PostgREST {} on {}", op, table);

        let response = request.send().await.map_err(|e| {
            tracing::error!("PostgREST {} on {} failed: {}", op, table, e);
            AppError::ExternalServiceError(format!("Failed to reach database: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<PostgrestErrorResponse>(&body) {
            Ok(err) => {
                let code = err.code.unwrap_or_default();
                match err.hint {
                    Some(hint) => format!("{} ({}) hint: {}", err.message, code, hint),
                    None => format!("{} ({})", err.message, code),
                }
            }
            Err(_) => body,
        };

        tracing::error!(
            "PostgREST {} on {} rejected: HTTP {} - {}",
            op,
            table,
            status,
            message
        );

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::Unauthorized(format!(
                "Database rejected the request: {}",
                message
            )));
        }

        Err(AppError::ExternalServiceError(format!(
            "Database error: HTTP {} - {}",
            status, message
        )))
    }

    async fn parse_rows<R: DeserializeOwned>(response: Response, table: &str) -> Result<Vec<R>> {
        response.json::<Vec<R>>().await.map_err(|e| {
            tracing::error!("Failed to parse rows from {}: {}", table, e);
            AppError::ExternalServiceError(format!("Failed to parse database response: {}", e))
        })
    }
}

/// Equality filter on a column
pub fn eq<'a>(column: &'a str, value: impl std::fmt::Display) -> Filter<'a> {
    (column, format!("eq.{}", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, anon_key: &str) -> SupabaseConfig {
        SupabaseConfig {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
            schema: "public".to_string(),
            products_table: "products".to_string(),
            realtime_heartbeat: Duration::from_secs(30),
        }
    }

    fn unconfigured() -> PostgrestClient {
        PostgrestClient::new(&config("", ""))
    }

    async fn setup() -> (MockServer, PostgrestClient) {
        let server = MockServer::start().await;
        let client = PostgrestClient::new(&config(&server.uri(), "anon-key"));
        (server, client)
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq("id", 42), ("id", "eq.42".to_string()));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_without_network() {
        let client = unconfigured();

        let result: Result<Vec<serde_json::Value>> = client
            .select("products", "*", &[], Some("created_at.desc"), None)
            .await;

        match result {
            Err(AppError::ExternalServiceError(msg)) => assert!(msg.contains("not configured")),
            other => panic!("expected external service error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_select_sends_query_and_anon_headers() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("select", "*"))
            .and(query_param("order", "created_at.desc"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("accept-profile", "public"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }, { "id": 2 }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client
            .select("products", "*", &[], Some("created_at.desc"), None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_session_token_replaces_anon_bearer() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("select", "stock"))
            .and(query_param("id", "eq.7"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer session-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "stock": 3 }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client
            .select("products", "stock", &[eq("id", 7)], None, Some("session-jwt"))
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({ "stock": 3 })]);
    }

    #[tokio::test]
    async fn test_insert_asks_for_representation() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/products"))
            .and(header("prefer", "return=representation"))
            .and(header("content-profile", "public"))
            .and(body_json(json!([{ "name": "Dolo 650" }])))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!([{ "id": 9, "name": "Dolo 650" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client
            .insert("products", &json!({ "name": "Dolo 650" }), Some("session-jwt"))
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], json!(9));
    }

    #[tokio::test]
    async fn test_update_filters_and_returns_rows() {
        let (server, client) = setup().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/products"))
            .and(query_param("id", "eq.9"))
            .and(header("prefer", "return=representation"))
            .and(body_json(json!({ "stock": 5 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let rows: Vec<Value> = client
            .update("products", &[eq("id", 9)], &json!({ "stock": 5 }), Some("session-jwt"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_token_maps_to_unauthorized() {
        for status in [401u16, 403] {
            let (server, client) = setup().await;

            Mock::given(method("DELETE"))
                .and(path("/rest/v1/products"))
                .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                    "message": "permission denied for table products",
                    "code": "42501"
                })))
                .mount(&server)
                .await;

            let result = client.delete("products", &[eq("id", 9)], Some("expired")).await;
            match result {
                Err(AppError::Unauthorized(msg)) => {
                    assert!(msg.contains("permission denied"), "message: {}", msg)
                }
                other => panic!("HTTP {}: expected unauthorized, got {:?}", status, other),
            }
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_external_service_error() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "relation does not exist",
                "code": "42P01",
                "hint": "check the table name"
            })))
            .mount(&server)
            .await;

        let result: Result<Vec<Value>> = client.select("products", "*", &[], None, None).await;
        match result {
            Err(AppError::ExternalServiceError(msg)) => {
                assert!(msg.contains("HTTP 500"));
                assert!(msg.contains("hint: check the table name"));
            }
            other => panic!("expected external service error, got {:?}", other.map(|_| ())),
        }
    }
}
