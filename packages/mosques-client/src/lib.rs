//! REST client for the Mosques TN API.
//!
//! [`MosquesClient`] wraps the directory endpoints (mosques, reviews,
//! suggestions, edits) and hands out a [`ModerationClient`] for the
//! moderation queues. Both share one [`Session`].
//!
//! # Example
//!
//! ```rust,ignore
//! use mosques_client::{ClientConfig, LoginRequest, MosquesClient, Page};
//! use mosques_core::{ResourceType, StatusFilter};
//! use mosques_core::workflow::ModerationAction;
//!
//! let client = MosquesClient::new(ClientConfig::from_env()?)?;
//! client.login(LoginRequest::password("moderator", "secret")).await?;
//!
//! let moderation = client.moderation();
//! let pending = moderation
//!     .list_entities(ResourceType::Review, StatusFilter::Pending, Page::default())
//!     .await?;
//! for item in &pending {
//!     moderation
//!         .perform_action(ResourceType::Review, item.raw_id(), ModerationAction::Approve)
//!         .await?;
//! }
//! ```

pub mod cache;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod moderation;
pub mod session;
pub mod transport;
pub mod types;

pub use cache::Page;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use moderation::{ActionOutcome, ConfirmationOutcome, ModerationClient};
pub use session::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, Session, SessionEvent,
};
pub use transport::Transport;
pub use types::{FacilityOption, LoginRequest, Me, MosqueQuery, DEFAULT_NEARBY_RADIUS_KM};

use mosques_core::model::{Coordinates, MosqueSuggestion, Review};
use mosques_core::validation::{EditDraft, ReviewDraft, SuggestionDraft, Validate};
use mosques_core::workflow::Role;
use mosques_core::{EditProposal, Mosque, MosqueId, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use types::{FacilityList, LoginResponse};

/// Mosques TN API client.
#[derive(Clone)]
pub struct MosquesClient {
    transport: Transport,
    moderation: ModerationClient,
}

impl MosquesClient {
    /// Client with an in-memory session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_session(config, Session::in_memory())
    }

    pub fn with_session(config: ClientConfig, session: Session) -> Result<Self> {
        let transport = Transport::new(config, session)?;
        let moderation = ModerationClient::new(transport.clone());
        Ok(Self {
            transport,
            moderation,
        })
    }

    pub fn moderation(&self) -> &ModerationClient {
        &self.moderation
    }

    pub fn session(&self) -> &Session {
        self.transport.session()
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for an access token and start a session.
    ///
    /// When the response omits `user_id`, it is looked up via `/auth/me`
    /// with the new token. The session only changes once both calls succeed.
    pub async fn login(&self, request: LoginRequest) -> Result<Credential> {
        let body = self.transport.post(endpoints::LOGIN, &request).await?;
        let response: LoginResponse = decode(body)?;

        let user_id = match response.user_id {
            Some(user_id) => user_id,
            None => {
                let me: Me = decode(
                    self.transport
                        .get_as(endpoints::ME, &response.access_token)
                        .await?,
                )?;
                me.user_id
            }
        };

        let credential = Credential {
            access_token: response.access_token,
            role: response.role.or(request.role).unwrap_or(Role::Authenticated),
            user_id: Some(user_id),
        };
        self.session().login(credential.clone()).await?;

        info!(role = %credential.role, user_id = %user_id, "Signed in");
        Ok(credential)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session().logout().await
    }

    pub async fn me(&self) -> Result<Me> {
        decode(self.transport.get(endpoints::ME, &[]).await?)
    }

    // =========================================================================
    // Directory
    // =========================================================================

    pub async fn list_mosques(&self, query: &MosqueQuery) -> Result<Vec<Mosque>> {
        decode(self.transport.get(endpoints::MOSQUES, &query.to_query()).await?)
    }

    pub async fn get_mosque(&self, id: MosqueId) -> Result<Mosque> {
        decode(self.transport.get(&endpoints::mosque(id), &[]).await?)
    }

    /// Approved mosques within `radius_km` of a point.
    pub async fn nearby_mosques(&self, center: Coordinates, radius_km: Option<f64>) -> Result<Vec<Mosque>> {
        let query = [
            ("lat", center.lat.to_string()),
            ("lng", center.lng.to_string()),
            ("radius", radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM).to_string()),
        ];
        decode(self.transport.get(endpoints::NEARBY_MOSQUES, &query).await?)
    }

    /// Approved reviews of a mosque, newest first.
    pub async fn list_reviews(&self, mosque_id: MosqueId, page: Page) -> Result<Vec<Review>> {
        decode(
            self.transport
                .get(&endpoints::mosque_reviews(mosque_id), &page.query())
                .await?,
        )
    }

    /// Post a review. Rejected locally if the draft is invalid.
    pub async fn post_review(&self, mosque_id: MosqueId, draft: &ReviewDraft) -> Result<Review> {
        draft.validate()?;
        let body = self
            .transport
            .post(&endpoints::mosque_reviews(mosque_id), draft)
            .await?;
        debug!(mosque_id = %mosque_id, "Review submitted");
        decode(body)
    }

    pub async fn submit_suggestion(&self, draft: &SuggestionDraft) -> Result<MosqueSuggestion> {
        draft.validate()?;
        let body = self.transport.post(endpoints::SUGGESTIONS, draft).await?;
        debug!(governorate = %draft.governorate, "Suggestion submitted");
        decode(body)
    }

    /// The public pending-suggestion feed.
    pub async fn list_suggestions(&self, page: Page) -> Result<Vec<MosqueSuggestion>> {
        decode(self.transport.get(endpoints::SUGGESTIONS, &page.query()).await?)
    }

    pub async fn submit_edit(&self, draft: &EditDraft) -> Result<EditProposal> {
        draft.validate()?;
        let body = self
            .transport
            .post(&endpoints::mosque_edits(draft.mosque_id), draft)
            .await?;
        debug!(mosque_id = %draft.mosque_id, fields = ?draft.patch.keys(), "Edit proposal submitted");
        decode(body)
    }

    /// Facility keys and display labels offered by the API.
    pub async fn facility_options(&self) -> Result<Vec<FacilityOption>> {
        let list: FacilityList = decode(self.transport.get(endpoints::FACILITIES, &[]).await?)?;
        Ok(list.facilities)
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| ClientError::Validation(ValidationError::MalformedPayload(e.to_string())))
}
