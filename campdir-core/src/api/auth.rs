use crate::api::{parse_body, ApiCtx};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::model::{Role, User};
use bytes::Bytes;
use campdir_auth::password::{PasswordHash, ResetToken, RESET_TOKEN_TTL_MS};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordInput {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResetInput {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotInput {
    pub email: Option<String>,
}

pub async fn register(ctx: &ApiCtx, body: &Bytes) -> ApiResult<ApiOutput> {
    let input: RegisterInput = parse_body(body)?;
    let role = match input.role.as_deref() {
        None => Role::User,
        Some(role) => Role::from_str(role)
            .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role)))?,
    };
    // Admins are created with the CLI, never over the wire.
    if role == Role::Admin {
        return Err(ApiError::BadRequest("Invalid role: admin".to_string()));
    }

    let password = input.password.unwrap_or_default();
    if password.len() < 6 {
        return Err(ApiError::BadRequest(
            "Please add a password with at least 6 characters".to_string(),
        ));
    }

    let user = User {
        id: ctx.store.next_id()?,
        name: input.name.unwrap_or_default(),
        email: input.email.unwrap_or_default(),
        role,
        password: PasswordHash::new(password),
        created_at: ctx.now()?,
        ..Default::default()
    };
    user.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if ctx.store.user_by_email(&user.email).is_some() {
        return Err(ApiError::BadRequest("Duplication error".to_string()));
    }

    let token = ctx.token_for(&user)?;
    ctx.store.save_user(user).await?;
    Ok(ApiOutput::ok(json!({ "token": token })))
}

pub async fn login(ctx: &ApiCtx, body: &Bytes) -> ApiResult<ApiOutput> {
    let input: LoginInput = parse_body(body)?;
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(ApiError::BadRequest(
            "Please provide an email and password".to_string(),
        ));
    };

    let user = ctx
        .store
        .user_by_email(&email)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    if !user.password.matches(&password) {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = ctx.token_for(&user)?;
    Ok(ApiOutput::ok(json!({ "token": token })))
}

/// Tokens are stateless, logout is client-side.
pub fn logout() -> ApiResult<ApiOutput> {
    Ok(ApiOutput::ok(json!({})))
}

pub fn me(user: &User) -> ApiResult<ApiOutput> {
    Ok(ApiOutput::ok(user.public_json()))
}

pub async fn update_details(ctx: &ApiCtx, user: &User, body: &Bytes) -> ApiResult<ApiOutput> {
    let input: DetailsInput = parse_body(body)?;
    let mut user = user.clone();
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        if let Some(existing) = ctx.store.user_by_email(&email) {
            if existing.id != user.id {
                return Err(ApiError::BadRequest("Duplication error".to_string()));
            }
        }
        user.email = email;
    }
    user.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_user(user.clone()).await?;
    Ok(ApiOutput::ok(user.public_json()))
}

pub async fn update_password(ctx: &ApiCtx, user: &User, body: &Bytes) -> ApiResult<ApiOutput> {
    let input: PasswordInput = parse_body(body)?;
    let current = input.current_password.unwrap_or_default();
    if !user.password.matches(&current) {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }
    let new_password = input.new_password.unwrap_or_default();
    if new_password.len() < 6 {
        return Err(ApiError::BadRequest(
            "Please add a password with at least 6 characters".to_string(),
        ));
    }

    let mut user = user.clone();
    user.password = PasswordHash::new(new_password);
    let token = ctx.token_for(&user)?;
    ctx.store.save_user(user).await?;
    Ok(ApiOutput::ok(json!({ "token": token })))
}

pub async fn forgot_password(ctx: &ApiCtx, body: &Bytes) -> ApiResult<ApiOutput> {
    let input: ForgotInput = parse_body(body)?;
    let email = input.email.unwrap_or_default();
    let mut user = ctx
        .store
        .user_by_email(&email)
        .ok_or_else(|| ApiError::NotFound("There is no user with that email".to_string()))?;

    let reset = ResetToken::issue();
    user.reset_password_token = Some(reset.hashed);
    user.reset_password_expire = Some(ctx.now()? + RESET_TOKEN_TTL_MS);
    ctx.store.save_user(user.clone()).await?;

    let reset_url = format!("/api/v1/auth/resetpassword/{}", reset.clear);
    match ctx.app_ctx.blueprint.notify_url.as_deref() {
        Some(notify_url) => {
            if let Err(e) = send_reset_mail(ctx, notify_url, &user.email, &reset_url).await {
                // Roll the token back so a failed mail can be retried.
                let mut user = user;
                user.reset_password_token = None;
                user.reset_password_expire = None;
                ctx.store.save_user(user).await?;
                log::error!("unable to deliver reset mail: {}", e);
                return Err(ApiError::Internal(anyhow::anyhow!("Email could not be sent")));
            }
        }
        None => log::info!("password reset for {}: {}", user.email, reset_url),
    }

    Ok(ApiOutput::ok(json!("Email sent")))
}

pub async fn reset_password(ctx: &ApiCtx, token: &str, body: &Bytes) -> ApiResult<ApiOutput> {
    let hashed = ResetToken::hash_clear(token);
    let now = ctx.now()?;
    let mut user = ctx
        .store
        .users
        .find(|user| {
            user.reset_password_token.as_deref() == Some(hashed.as_str())
                && user.reset_password_expire.map(|exp| exp > now).unwrap_or(false)
        })
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::BadRequest("Invalid token".to_string()))?;

    let input: ResetInput = parse_body(body)?;
    let password = input.password.unwrap_or_default();
    if password.len() < 6 {
        return Err(ApiError::BadRequest(
            "Please add a password with at least 6 characters".to_string(),
        ));
    }

    user.password = PasswordHash::new(password);
    user.reset_password_token = None;
    user.reset_password_expire = None;
    let token = ctx.token_for(&user)?;
    ctx.store.save_user(user).await?;
    Ok(ApiOutput::ok(json!({ "token": token })))
}

async fn send_reset_mail(
    ctx: &ApiCtx,
    notify_url: &str,
    to: &str,
    reset_url: &str,
) -> anyhow::Result<()> {
    let url = url::Url::parse(notify_url)?;
    let mut req = reqwest::Request::new(reqwest::Method::POST, url);
    *req.body_mut() = Some(reqwest::Body::from(
        json!({
            "to": to,
            "subject": "Password reset token",
            "text": format!(
                "You are receiving this email because you (or someone else) has requested the reset of a password. Make a PUT request to: {}",
                reset_url
            ),
        })
        .to_string(),
    ));
    ctx.app_ctx.runtime.http.execute(req).await?;
    Ok(())
}
