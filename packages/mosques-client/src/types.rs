//! Request and response bodies for the directory endpoints.

use mosques_core::workflow::Role;
use mosques_core::{MosqueType, UserId};
use serde::{Deserialize, Serialize};

use crate::cache::Page;

/// `POST /auth/login` body. Which fields are needed depends on the
/// deployment's auth provider.
#[derive(Clone, Default, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl LoginRequest {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            role: None,
        }
    }

    /// Development login that asks for a role directly.
    pub fn as_role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Me {
    pub user_id: UserId,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Filters for `GET /mosques`.
#[derive(Debug, Clone, Default)]
pub struct MosqueQuery {
    pub governorate: Option<String>,
    pub city: Option<String>,
    pub mosque_type: Option<MosqueType>,
    pub page: Page,
}

impl MosqueQuery {
    pub fn governorate(mut self, governorate: impl Into<String>) -> Self {
        self.governorate = Some(governorate.into());
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn mosque_type(mut self, mosque_type: MosqueType) -> Self {
        self.mosque_type = Some(mosque_type);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(governorate) = &self.governorate {
            query.push(("governorate", governorate.clone()));
        }
        if let Some(city) = &self.city {
            query.push(("city", city.clone()));
        }
        if let Some(mosque_type) = &self.mosque_type {
            query.push(("type", mosque_type.to_string()));
        }
        query.extend(self.page.query());
        query
    }
}

/// Default search radius for `GET /mosques/nearby`, in kilometres.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;

/// One entry of `GET /meta/facilities`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacilityOption {
    pub key: String,
    pub label: String,
}

#[derive(Deserialize)]
pub(crate) struct FacilityList {
    #[serde(default)]
    pub facilities: Vec<FacilityOption>,
}
