//! Token minter and client flavors (§4.2).
//!
//! Two authenticator traits mirror the two client flavors GitHub App auth
//! requires: [`GitHubAppAuthenticator`] mints the bearer-level client used
//! only to mint installation tokens, and [`InstallationAuthenticator`]
//! exchanges one for a [`GitHubApi`] scoped to a single installation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::EncodingKey;
use secrecy::ExposeSecret;

use crate::error::EventError;
use crate::github_api::{GitHubApi, InstallationToken, OctocrabApi};
use crate::ids::{AppId, InstallationId};

/// Lifetime of the minted app JWT, per the token-minter algorithm.
pub const JWT_LIFETIME: Duration = Duration::minutes(5);

/// GitHub mints installation access tokens with a fixed one-hour lifetime;
/// the API response octocrab surfaces doesn't carry `expires_at` directly,
/// so callers compute it from the exchange time instead of parsing it.
pub const INSTALLATION_TOKEN_LIFETIME: Duration = Duration::hours(1);

/// Produces an installation-scoped [`GitHubApi`] from the app's bearer
/// identity. Generic so tests can substitute a stub without touching the
/// network.
pub trait InstallationAuthenticator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn for_installation(
        &self,
        id: InstallationId,
    ) -> impl std::future::Future<Output = Result<impl GitHubApi, Self::Error>> + Send;
}

/// Mints the bearer-level app client from `(base_url, app_id, private_key)`.
pub trait GitHubAppAuthenticator: Sized {
    type Next: InstallationAuthenticator + Clone;
    type Error: std::error::Error + Send + Sync + 'static;

    fn authenticate_app(
        base_url: Option<String>,
        app_id: AppId,
        app_key: EncodingKey,
    ) -> Result<Self::Next, Self::Error>;
}

/// The octocrab-backed bearer client: holds the app identity and mints
/// fresh installation tokens on demand via `Octocrab::installation_and_token`.
#[derive(Clone)]
pub struct OctocrabAppClient {
    client: octocrab::Octocrab,
}

impl GitHubAppAuthenticator for OctocrabAppClient {
    type Next = Self;
    type Error = EventError;

    fn authenticate_app(
        base_url: Option<String>,
        app_id: AppId,
        app_key: EncodingKey,
    ) -> Result<Self::Next, Self::Error> {
        let mut builder = octocrab::Octocrab::builder().app(octocrab::models::AppId(app_id.0), app_key);
        if let Some(base_url) = base_url {
            builder = builder
                .base_uri(base_url)
                .map_err(|e| EventError::AuthFailure {
                    message: format!("invalid Enterprise base URL: {e}"),
                })?;
        }
        let client = builder.build().map_err(|e| EventError::AuthFailure {
            message: format!("failed to construct the GitHub App client: {e}"),
        })?;
        Ok(Self { client })
    }
}

impl InstallationAuthenticator for OctocrabAppClient {
    type Error = EventError;

    async fn for_installation(&self, id: InstallationId) -> Result<impl GitHubApi, Self::Error> {
        let (installation_client, token) = self
            .client
            .installation_and_token(octocrab::models::InstallationId(id.0))
            .await
            .map_err(|e| EventError::AuthFailure {
                message: format!("failed to exchange the app JWT for an installation token: {e}"),
            })?;

        let issued_at: DateTime<Utc> = Utc::now();
        Ok(OctocrabApi::new(
            installation_client,
            InstallationToken {
                token: token.expose_secret().to_string(),
                expires_at: Some(issued_at + INSTALLATION_TOKEN_LIFETIME),
            },
        ))
    }
}
