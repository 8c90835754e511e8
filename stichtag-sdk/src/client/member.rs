//! Member API client.
//!
//! Covers login and the self-service endpoints. `login` stores the issued
//! access token on the client; subsequent authenticated calls send it as a
//! bearer token.

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::auth::{LoginRequest, TokenResponse};
use crate::objects::enroll::{EnrollResponse, WithdrawResponse};
use crate::objects::events::EventResponse;
use crate::objects::users::{MeUpdateRequest, UserResponse};

/// Typed HTTP client for the member-facing API.
#[derive(Debug, Clone)]
pub struct MemberClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl MemberClient {
    /// Create a new `MemberClient`.
    ///
    /// * `base_url` – root URL of the Stichtag server.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::NotAuthenticated)
    }

    /// `POST /api/auth/login` – authenticate and store the access token.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ClientError> {
        let url = self.base_url.join("/api/auth/login")?;

        let resp = self
            .http
            .post(url)
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let token: TokenResponse = parse_response(resp).await?;
        self.token = Some(token.token.clone());
        Ok(token)
    }

    /// `GET /api/events` – list events with their participants.
    pub async fn list_events(&self) -> Result<Vec<EventResponse>, ClientError> {
        let url = self.base_url.join("/api/events")?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }

    /// `GET /api/events/{event_id}` – fetch a single event.
    pub async fn get_event(&self, event_id: Uuid) -> Result<EventResponse, ClientError> {
        let url = self.base_url.join(&format!("/api/events/{event_id}"))?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }

    /// `POST /api/events/{event_id}/enroll` – take a seat on an event.
    pub async fn enroll(&self, event_id: Uuid) -> Result<EnrollResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/events/{event_id}/enroll"))?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token()?)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /api/events/{event_id}/withdraw` – release a seat.
    pub async fn withdraw(&self, event_id: Uuid) -> Result<WithdrawResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/events/{event_id}/withdraw"))?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(self.token()?)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/me` – fetch the caller's profile.
    pub async fn me(&self) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join("/api/me")?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(self.token()?)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PUT /api/me` – update the caller's password and/or email.
    pub async fn update_me(&self, update: &MeUpdateRequest) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join("/api/me")?;

        let resp = self
            .http
            .put(url)
            .bearer_auth(self.token()?)
            .json(update)
            .send()
            .await?;

        parse_response(resp).await
    }
}
