//! Identity provider API client.
//!
//! The identity provider owns account creation, credentials, and recovery
//! links; Roadcall keeps only the profile row. This client is the sole way
//! the core talks to it. Consistency with the relational store is achieved
//! by the provisioning saga's ordered create/compensate sequence, never by a
//! distributed transaction.

mod error;
mod types;

pub use error::IdentityError;
pub use types::{AccountState, IdentityMetadata, IdentityRecord};

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use roadcall_core::Email;

use crate::config::IdentityProviderConfig;

/// Request timeout for all identity provider calls. A timed-out call is
/// surfaced as a failure; no automatic retry happens here.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Identity provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_token: secrecy::SecretString,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

impl IdentityClient {
    /// Create a new identity client from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &IdentityProviderConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create an identity with a freshly generated temporary credential.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmailTaken`] when the provider reports a
    /// conflict, [`IdentityError::Http`] / [`IdentityError::Status`] for
    /// transport and provider failures.
    #[instrument(skip(self, credential, metadata), fields(email = %email))]
    pub async fn create_identity(
        &self,
        email: &Email,
        credential: &str,
        metadata: IdentityMetadata<'_>,
    ) -> Result<IdentityRecord, IdentityError> {
        let response = self
            .http
            .post(self.url("/identities"))
            .bearer_auth(self.api_token.expose_secret())
            .json(&json!({
                "email": email.as_str(),
                "credential": credential,
                "metadata": metadata,
            }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(IdentityError::EmailTaken);
        }

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Delete an identity. Used by saga compensation.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NotFound`] if the identity does not exist,
    /// other variants for transport and provider failures.
    #[instrument(skip(self))]
    pub async fn delete_identity(&self, id: Uuid) -> Result<(), IdentityError> {
        let response = self
            .http
            .delete(self.url(&format!("/identities/{id}")))
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound);
        }

        Self::check_status(response).await?;
        Ok(())
    }

    /// Find identities whose email contains the given fragment,
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Http`] / [`IdentityError::Status`] on failure.
    #[instrument(skip(self))]
    pub async fn find_identities_by_email(
        &self,
        fragment: &str,
    ) -> Result<Vec<IdentityRecord>, IdentityError> {
        let response = self
            .http
            .get(self.url("/identities"))
            .bearer_auth(self.api_token.expose_secret())
            .query(&[("email_contains", fragment)])
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Look up the identity with exactly this email, if any.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Http`] / [`IdentityError::Status`] on failure.
    pub async fn get_identity_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<IdentityRecord>, IdentityError> {
        let records = self.find_identities_by_email(email.as_str()).await?;
        Ok(records
            .into_iter()
            .find(|record| record.email.eq_ignore_ascii_case(email.as_str())))
    }

    /// Verify a credential and return the matching identity.
    ///
    /// Returns `Ok(None)` for a wrong email/credential pair so callers can
    /// produce a uniform rejection.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Http`] / [`IdentityError::Status`] on failure.
    #[instrument(skip(self, credential), fields(email = %email))]
    pub async fn verify_credentials(
        &self,
        email: &Email,
        credential: &str,
    ) -> Result<Option<IdentityRecord>, IdentityError> {
        let response = self
            .http
            .post(self.url("/identities/verify"))
            .bearer_auth(self.api_token.expose_secret())
            .json(&json!({
                "email": email.as_str(),
                "credential": credential,
            }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::NOT_FOUND
        {
            return Ok(None);
        }

        let response = Self::check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Ask the provider to send a recovery/activation link.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Http`] / [`IdentityError::Status`] on failure.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn issue_recovery_link(
        &self,
        email: &Email,
        redirect_target: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .http
            .post(self.url("/identities/recovery"))
            .bearer_auth(self.api_token.expose_secret())
            .json(&json!({
                "email": email.as_str(),
                "redirect_target": redirect_target,
            }))
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ProviderErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_default();

        Err(IdentityError::Status {
            status: status.as_u16(),
            message,
        })
    }
}
