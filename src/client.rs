//! HTTP client for the Cura backend.
//!
//! This module centralizes retry behavior, base URLs, and request helpers
//! for the CLI's network requests.

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use uuid::Uuid;

use crate::config::{Config, RetryPolicy};
use crate::logging;
use crate::models::{
    Appointment, AssignCalendarRequest, BlockRange, CalendarSummary, ChatMessage, DayAvailability,
    LoginRequest, LoginResponse, ReportSummary, SendChatRequest, User,
};
use crate::utils::format_iso_date;

/// Quick synchronous reachability probe used by `cura doctor`.
pub fn test_connection_sync(base_url: &str) -> Result<()> {
    let url = format!("{}/v1/health", base_url.trim_end_matches('/'));
    let client = reqwest::blocking::Client::new();
    let response = client.get(&url).send()?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Connection test failed: HTTP {}",
            response.status().as_u16()
        );
    }
    Ok(())
}

/// Client for Cura backend API requests.
#[derive(Clone)]
#[must_use]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

// === ApiClient ===

impl ApiClient {
    /// Create a client without credentials, for the login endpoint.
    pub fn anonymous(config: &Config) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a client carrying a bearer token.
    pub fn with_token(config: &Config, token: &str) -> Result<Self> {
        Self::build(config, Some(token))
    }

    fn build(config: &Config, token: Option<&str>) -> Result<Self> {
        let base_url = config.api_base_url();
        let retry = config.retry_policy();

        logging::info(format!("API base URL: {base_url}"));
        logging::info(format!(
            "Retry policy: enabled={}, max_retries={}, initial_delay={}s, max_delay={}s",
            retry.enabled, retry.max_retries, retry.initial_delay, retry.max_delay
        ));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // === Auth ===

    /// Exchange credentials for a bearer token and the signed-in user.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let url = self.url("/v1/auth/login");
        let response =
            send_with_retry(&self.retry, || self.http_client.post(&url).json(&request)).await?;
        Ok(response.json().await?)
    }

    /// Fetch the user the current token belongs to.
    pub async fn current_user(&self) -> Result<User> {
        let url = self.url("/v1/me");
        let response = send_with_retry(&self.retry, || self.http_client.get(&url)).await?;
        Ok(response.json().await?)
    }

    // === Appointments ===

    /// List appointments from `from` onward, optionally scoped to a calendar.
    pub async fn list_appointments(
        &self,
        calendar_id: Option<Uuid>,
        from: NaiveDate,
    ) -> Result<Vec<Appointment>> {
        let url = self.url("/v1/appointments");
        let from = format_iso_date(from);
        let response = send_with_retry(&self.retry, || {
            let mut request = self.http_client.get(&url).query(&[("from", from.as_str())]);
            if let Some(id) = calendar_id {
                request = request.query(&[("calendar_id", id.to_string())]);
            }
            request
        })
        .await?;
        Ok(response.json().await?)
    }

    // === Calendars ===

    pub async fn list_calendars(&self) -> Result<Vec<CalendarSummary>> {
        let url = self.url("/v1/calendars");
        let response = send_with_retry(&self.retry, || self.http_client.get(&url)).await?;
        Ok(response.json().await?)
    }

    /// Availability for the week starting at `week_of`, one entry per day.
    pub async fn week_availability(
        &self,
        calendar_id: Uuid,
        week_of: NaiveDate,
    ) -> Result<Vec<DayAvailability>> {
        let url = self.url(&format!("/v1/calendars/{calendar_id}/availability"));
        let week_of = format_iso_date(week_of);
        let response = send_with_retry(&self.retry, || {
            self.http_client
                .get(&url)
                .query(&[("week_of", week_of.as_str())])
        })
        .await?;
        Ok(response.json().await?)
    }

    /// Persist a manually drawn time block.
    pub async fn create_time_block(&self, calendar_id: Uuid, range: &BlockRange) -> Result<()> {
        let url = self.url(&format!("/v1/calendars/{calendar_id}/blocks"));
        send_with_retry(&self.retry, || self.http_client.post(&url).json(range)).await?;
        Ok(())
    }

    // === Chat ===

    pub async fn chat_history(&self, appointment_id: Uuid) -> Result<Vec<ChatMessage>> {
        let url = self.url(&format!("/v1/appointments/{appointment_id}/chat"));
        let response = send_with_retry(&self.retry, || self.http_client.get(&url)).await?;
        Ok(response.json().await?)
    }

    pub async fn send_chat(&self, appointment_id: Uuid, body: &str) -> Result<ChatMessage> {
        let url = self.url(&format!("/v1/appointments/{appointment_id}/chat"));
        let request = SendChatRequest {
            body: body.to_string(),
        };
        let response =
            send_with_retry(&self.retry, || self.http_client.post(&url).json(&request)).await?;
        Ok(response.json().await?)
    }

    // === Admin ===

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.url("/v1/users");
        let response = send_with_retry(&self.retry, || self.http_client.get(&url)).await?;
        Ok(response.json().await?)
    }

    pub async fn assign_calendar(&self, user_id: Uuid, calendar_id: Uuid) -> Result<()> {
        let url = self.url("/v1/users/assign-calendar");
        let request = AssignCalendarRequest {
            user_id,
            calendar_id,
        };
        send_with_retry(&self.retry, || self.http_client.post(&url).json(&request)).await?;
        Ok(())
    }

    // === Reports ===

    pub async fn report_summary(&self, from: NaiveDate, to: NaiveDate) -> Result<ReportSummary> {
        let url = self.url("/v1/reports/summary");
        let from = format_iso_date(from);
        let to = format_iso_date(to);
        let response = send_with_retry(&self.retry, || {
            self.http_client
                .get(&url)
                .query(&[("from", from.as_str()), ("to", to.as_str())])
        })
        .await?;
        Ok(response.json().await?)
    }

    // === Notifications ===

    /// Open the notification event stream. The caller owns the response and
    /// reads SSE frames from its byte stream; no retry here, reconnects are
    /// the notification service's job.
    pub async fn open_notification_stream(&self) -> Result<reqwest::Response> {
        let url = self.url("/v1/notifications/stream");
        let response = self
            .http_client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to open notification stream: HTTP {}",
                response.status().as_u16()
            );
        }
        Ok(response)
    }
}

// === Retry Helper ===

pub(crate) async fn send_with_retry<F>(
    policy: &RetryPolicy,
    mut build: F,
) -> Result<reqwest::Response>
where
    F: FnMut() -> reqwest::RequestBuilder,
{
    let mut attempt: u32 = 0;

    loop {
        let result = build().send().await;

        match result {
            Ok(response) => {
                if response.status().is_success() {
                    return Ok(response);
                }

                let status = response.status();
                let retryable = status.as_u16() == 429 || status.is_server_error();

                if !policy.enabled || !retryable || attempt >= policy.max_retries {
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("(failed to read body: {e})"));
                    anyhow::bail!("Failed to send API request: HTTP {status}: {text}");
                }
                logging::warn(format!(
                    "Retryable HTTP {} (attempt {} of {})",
                    status.as_u16(),
                    attempt + 1,
                    policy.max_retries + 1
                ));
            }
            Err(err) => {
                if !policy.enabled || attempt >= policy.max_retries {
                    return Err(err.into());
                }
                logging::warn(format!(
                    "Request error: {} (attempt {} of {})",
                    err,
                    attempt + 1,
                    policy.max_retries + 1
                ));
            }
        }

        let delay = policy.delay_for_attempt(attempt);
        attempt += 1;
        logging::info(format!("Retrying after {:.2}s", delay.as_secs_f64()));
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> Config {
        Config {
            base_url: Some(base_url.to_string()),
            retry: Some(crate::config::RetryConfig {
                enabled: Some(true),
                max_retries: Some(2),
                initial_delay: Some(0.01),
                max_delay: Some(0.02),
                exponential_base: Some(2.0),
            }),
            ..Config::default()
        }
    }

    fn sample_user() -> serde_json::Value {
        json!({
            "id": "0c9ad2ca-8f8c-4f9e-a6cb-3f2d5a3e9b11",
            "email": "osei@cura.health",
            "display_name": "Dr. Osei",
            "role": "provider",
            "calendar_id": "5f0b7f68-1f3a-4f39-9a40-1f9a4a2b7c01"
        })
    }

    #[tokio::test]
    async fn login_posts_credentials_and_parses_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-123",
                "user": sample_user(),
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::anonymous(&test_config(&server.uri())).unwrap();
        let session = client.login("osei@cura.health", "hunter2").await.unwrap();
        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user.display_name, "Dr. Osei");
    }

    #[tokio::test]
    async fn bearer_token_is_sent_on_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_user()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_token(&test_config(&server.uri()), "tok-123").unwrap();
        let user = client.current_user().await.unwrap();
        assert_eq!(user.email, "osei@cura.health");
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/calendars"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/calendars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_token(&test_config(&server.uri()), "tok").unwrap();
        let calendars = client.list_calendars().await.unwrap();
        assert!(calendars.is_empty());
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_token(&test_config(&server.uri()), "bad").unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn availability_query_carries_week_of() {
        let server = MockServer::start().await;
        let calendar_id: Uuid = "5f0b7f68-1f3a-4f39-9a40-1f9a4a2b7c01".parse().unwrap();
        Mock::given(method("GET"))
            .and(path(format!("/v1/calendars/{calendar_id}/availability")))
            .and(query_param("week_of", "2026-03-09"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "date": "2026-03-09", "blocks": ["09:00", "09:30"], "block_minutes": 30 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_token(&test_config(&server.uri()), "tok").unwrap();
        let days = client
            .week_availability(calendar_id, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
            .await
            .unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].blocks, vec!["09:00", "09:30"]);
        assert_eq!(days[0].block_minutes, 30);
    }

    #[tokio::test]
    async fn create_time_block_posts_range() {
        let server = MockServer::start().await;
        let calendar_id: Uuid = "5f0b7f68-1f3a-4f39-9a40-1f9a4a2b7c01".parse().unwrap();
        let expected = json!({
            "date": "2026-03-09",
            "start_time": "09:00",
            "end_time": "10:30",
            "reason": "manual-block"
        });
        Mock::given(method("POST"))
            .and(path(format!("/v1/calendars/{calendar_id}/blocks")))
            .and(body_json_string(expected.to_string()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_token(&test_config(&server.uri()), "tok").unwrap();
        let range = BlockRange {
            date: "2026-03-09".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:30".to_string(),
            reason: crate::models::MANUAL_BLOCK_REASON.to_string(),
        };
        client.create_time_block(calendar_id, &range).await.unwrap();
    }
}
