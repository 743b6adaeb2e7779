pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

use crate::app_ctx::AppContext;
use crate::http::error::{ApiError, ApiResult};
use crate::model::{Role, User};
use crate::store::DataStore;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;

const ACCESS_DENIED: &str = "No token received, access denied";

/// Everything a handler needs: validated blueprint, runtime IO and the
/// document store.
pub struct ApiCtx {
    pub app_ctx: Arc<AppContext>,
    pub store: Arc<DataStore>,
}

impl ApiCtx {
    pub fn now(&self) -> ApiResult<u128> {
        Ok(self.store.now()?)
    }

    /// Resolves the bearer token to its user. Route guard for every
    /// private endpoint.
    pub fn protect(&self, token: Option<&str>) -> ApiResult<User> {
        let token = token.ok_or_else(|| ApiError::Unauthorized(ACCESS_DENIED.to_string()))?;
        let user_id = self
            .app_ctx
            .blueprint
            .auth
            .verify(token, self.now()?)
            .map_err(|_| ApiError::Unauthorized(ACCESS_DENIED.to_string()))?;
        self.store
            .users
            .get(&user_id)
            .ok_or_else(|| ApiError::Unauthorized(ACCESS_DENIED.to_string()))
    }

    pub fn token_for(&self, user: &User) -> ApiResult<String> {
        Ok(self.app_ctx.blueprint.auth.generate(&user.id, self.now()?)?)
    }
}

/// Role guard, applied after [`ApiCtx::protect`].
pub fn authorize(user: &User, roles: &[Role]) -> ApiResult<()> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "User role {} is unauthorized to access this route",
            user.role
        )))
    }
}

/// Resource-ownership guard. The owner or an admin passes, everyone
/// else gets a 401 with the caller's message.
pub fn own_or_admin(user: &User, owner_id: &str, denied: String) -> ApiResult<()> {
    if user.id == owner_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(ApiError::Unauthorized(denied))
    }
}

pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body)
        .map_err(|_| ApiError::BadRequest("Unable to parse request body".to_string()))
}

pub fn to_json<T: serde::Serialize>(value: T) -> ApiResult<serde_json::Value> {
    Ok(serde_json::to_value(value).map_err(anyhow::Error::from)?)
}
