// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for exporting activities and routes.
//!
//! Handles:
//! - Refresh-token exchange for a short-lived access token
//! - Page-by-page listing until Strava returns an empty page
//! - Per-route detail lookups, skipping routes that fail

use crate::config::Config;
use crate::error::{AppError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Page size requested from list endpoints (Strava's maximum).
pub const PER_PAGE: u32 = 200;

/// Timeout applied to every GET.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// OAuth application credentials plus the athlete's refresh token.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    oauth_url: String,
    credentials: Credentials,
    request_timeout: Duration,
}

/// Result of a paginated listing.
#[derive(Debug, Clone, Default)]
pub struct PageFetch {
    /// Records from every page fetched, in page order.
    pub records: Vec<Value>,
    /// Page whose request failed, if the listing stopped early.
    pub aborted_at: Option<u32>,
}

impl PageFetch {
    pub fn is_complete(&self) -> bool {
        self.aborted_at.is_none()
    }
}

impl StravaClient {
    /// Create a new Strava client against the given API root and token endpoint.
    pub fn new(
        credentials: Credentials,
        base_url: impl Into<String>,
        oauth_url: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            oauth_url: oauth_url.into(),
            credentials,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-GET timeout (defaults to [`REQUEST_TIMEOUT`]).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            Credentials {
                client_id: config.strava_client_id.clone(),
                client_secret: config.strava_client_secret.clone(),
                refresh_token: config.strava_refresh_token.clone(),
            },
            config.strava_api_base_url.as_str(),
            config.strava_oauth_url.as_str(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Exchange the stored refresh token for a fresh access token.
    ///
    /// Nothing is cached; every call hits the token endpoint. A non-2xx
    /// answer is an [`AppError::Auth`].
    pub async fn get_access_token(&self) -> Result<String> {
        let response = self
            .http
            .post(&self.oauth_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Failed to get access token");
            return Err(AppError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenRefreshResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to get access token");
            AppError::Auth(format!("Failed to parse token response: {}", e))
        })?;

        Ok(token.access_token)
    }

    // ─── Listings ────────────────────────────────────────────────────────────

    /// Fetch every page of a list endpoint.
    ///
    /// Pages are requested from 1 upwards with `per_page` fixed at
    /// [`PER_PAGE`]. An empty page ends the listing. A failed page also ends
    /// it: the error is logged and whatever was collected so far is
    /// returned, with `aborted_at` naming the failed page.
    pub async fn fetch_pages(
        &self,
        endpoint: &str,
        headers: &HeaderMap,
        base_params: &[(&str, String)],
    ) -> PageFetch {
        let mut fetch = PageFetch::default();
        let mut page: u32 = 1;

        loop {
            tracing::info!(endpoint, page, "Fetching page");

            match self.fetch_page(endpoint, headers, base_params, page).await {
                Ok(records) if records.is_empty() => break,
                Ok(records) => {
                    fetch.records.extend(records);
                    page += 1;
                }
                Err(e) => {
                    tracing::error!(
                        endpoint,
                        page,
                        error = %e,
                        "An error occurred while requesting data"
                    );
                    fetch.aborted_at = Some(page);
                    break;
                }
            }
        }

        fetch
    }

    /// Fetch every page of a list endpoint, returning only the records.
    ///
    /// A listing cut short by an error is indistinguishable from a complete
    /// one here; use [`StravaClient::fetch_pages`] to tell them apart.
    pub async fn fetch_data(
        &self,
        endpoint: &str,
        headers: &HeaderMap,
        base_params: &[(&str, String)],
    ) -> Vec<Value> {
        self.fetch_pages(endpoint, headers, base_params)
            .await
            .records
    }

    async fn fetch_page(
        &self,
        endpoint: &str,
        headers: &HeaderMap,
        base_params: &[(&str, String)],
        page: u32,
    ) -> Result<Vec<Value>> {
        let response = self
            .http
            .get(endpoint)
            .headers(headers.clone())
            .query(base_params)
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let body: Value = check_response_json(response).await?;
        page_records(body)
    }

    /// List all of the athlete's activities.
    pub async fn fetch_activities(&self, access_token: &str) -> Result<PageFetch> {
        let endpoint = format!("{}/athlete/activities", self.base_url);
        let headers = bearer_headers(access_token)?;
        Ok(self.fetch_pages(&endpoint, &headers, &[]).await)
    }

    // ─── Routes ──────────────────────────────────────────────────────────────

    /// Get the authenticated athlete's id.
    pub async fn get_athlete_id(&self, access_token: &str) -> Result<i64> {
        let url = format!("{}/athlete", self.base_url);
        let athlete: AthleteSummary = self.get_json(&url, access_token).await?;
        Ok(athlete.id)
    }

    /// Get one route's full detail payload.
    pub async fn get_route(&self, access_token: &str, route_id: &Value) -> Result<Value> {
        let url = format!("{}/routes/{}", self.base_url, route_key(route_id)?);
        self.get_json(&url, access_token).await
    }

    /// List the athlete's routes and resolve each one to its detail payload.
    ///
    /// Routes whose detail request fails are logged and left out; the rest
    /// keep their listing order.
    pub async fn fetch_athlete_routes(&self, access_token: &str) -> Result<PageFetch> {
        let athlete_id = self.get_athlete_id(access_token).await?;
        tracing::info!(athlete_id, "Fetching routes");

        let endpoint = format!("{}/athletes/{}/routes", self.base_url, athlete_id);
        let headers = bearer_headers(access_token)?;
        let summaries = self.fetch_pages(&endpoint, &headers, &[]).await;

        let mut details = Vec::with_capacity(summaries.records.len());
        for summary in &summaries.records {
            let Some(route_id) = summary.get("id") else {
                tracing::error!("Route summary without id, skipping");
                continue;
            };

            match self.get_route(access_token, route_id).await {
                Ok(detail) => details.push(detail),
                Err(e) => {
                    tracing::error!(route_id = %route_id, error = %e, "Failed to fetch route details");
                }
            }
        }

        Ok(PageFetch {
            records: details,
            aborted_at: summaries.aborted_at,
        })
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        check_response_json(response).await
    }
}

/// Build the `Authorization: Bearer` header set for list requests.
pub fn bearer_headers(access_token: &str) -> Result<HeaderMap> {
    let value = HeaderValue::from_str(&format!("Bearer {}", access_token))
        .map_err(|_| AppError::Auth("Access token is not a valid header value".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// Split a page body into records.
///
/// `null`, `false`, `{}`, `[]` and `""` all mark the end of the listing and
/// yield no records; any other non-array body is an error.
fn page_records(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(records) => Ok(records),
        Value::Null | Value::Bool(false) => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        other => Err(AppError::Transport(format!(
            "Unexpected page body: {}",
            other
        ))),
    }
}

/// Route ids may arrive as numbers or strings; both are used verbatim in the URL.
fn route_key(route_id: &Value) -> Result<String> {
    match route_id {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        _ => Err(AppError::missing_field("id")),
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
        }

        return Err(AppError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Transport(format!("JSON parse error: {}", e)))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
}

/// The only athlete field this crate needs.
#[derive(Debug, Clone, Deserialize)]
struct AthleteSummary {
    id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bearer_headers() {
        let headers = bearer_headers("abc123").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");

        let err = bearer_headers("bad\ntoken").unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_falsy_page_bodies_end_listing() {
        for body in [json!(null), json!({}), json!([]), json!(false), json!("")] {
            assert!(page_records(body).unwrap().is_empty());
        }
        assert_eq!(page_records(json!([{ "id": 1 }])).unwrap().len(), 1);
    }

    #[test]
    fn test_unexpected_page_body_is_error() {
        let err = page_records(json!({ "message": "Record Not Found" })).unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[test]
    fn test_route_key() {
        assert_eq!(route_key(&json!(3344)).unwrap(), "3344");
        assert_eq!(route_key(&json!("3344")).unwrap(), "3344");
        assert!(route_key(&json!(null)).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = StravaClient::new(
            Credentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
                refresh_token: "refresh".to_string(),
            },
            "http://localhost:9/api/v3/",
            "http://localhost:9/oauth/token",
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9/api/v3");
    }
}
