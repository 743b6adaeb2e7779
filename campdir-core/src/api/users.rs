use crate::api::{authorize, parse_body, ApiCtx};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::model::{Role, User};
use crate::query::ListQuery;
use bytes::Bytes;
use campdir_auth::password::PasswordHash;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;

#[derive(Debug, Default, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Admin-only management surface; listings go through the public
/// projection so password material never shows up.
pub async fn list(ctx: &ApiCtx, admin: &User, query: Option<&str>) -> ApiResult<ApiOutput> {
    authorize(admin, &[Role::Admin])?;
    let users: Vec<_> = ctx
        .store
        .users
        .all()
        .iter()
        .map(User::public_json)
        .collect();
    let result = ListQuery::parse(query).apply(&users)?;
    Ok(ApiOutput::list(result))
}

pub fn get_one(ctx: &ApiCtx, admin: &User, id: &str) -> ApiResult<ApiOutput> {
    authorize(admin, &[Role::Admin])?;
    let user = ctx
        .store
        .users
        .get(id)
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(ApiOutput::ok(user.public_json()))
}

pub async fn create(ctx: &ApiCtx, admin: &User, body: &Bytes) -> ApiResult<ApiOutput> {
    authorize(admin, &[Role::Admin])?;
    let input: UserInput = parse_body(body)?;

    let role = match input.role.as_deref() {
        None => Role::User,
        Some(role) => Role::from_str(role)
            .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role)))?,
    };
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

    ctx.store.save_user(user.clone()).await?;
    Ok(ApiOutput::created(user.public_json()))
}

pub async fn update(ctx: &ApiCtx, admin: &User, id: &str, body: &Bytes) -> ApiResult<ApiOutput> {
    authorize(admin, &[Role::Admin])?;
    let mut user = ctx
        .store
        .users
        .get(id)
        .ok_or_else(|| ApiError::not_found("User", id))?;

    let input: UserInput = parse_body(body)?;
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
    if let Some(role) = input.role.as_deref() {
        user.role = Role::from_str(role)
            .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", role)))?;
    }
    if let Some(password) = input.password {
        if password.len() < 6 {
            return Err(ApiError::BadRequest(
                "Please add a password with at least 6 characters".to_string(),
            ));
        }
        user.password = PasswordHash::new(password);
    }
    user.validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_user(user.clone()).await?;
    Ok(ApiOutput::ok(user.public_json()))
}

pub async fn delete(ctx: &ApiCtx, admin: &User, id: &str) -> ApiResult<ApiOutput> {
    authorize(admin, &[Role::Admin])?;
    ctx.store
        .delete_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id))?;
    Ok(ApiOutput::ok(json!({})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{ctx, seed_user};

    fn input(email: &str, role: &str) -> Bytes {
        Bytes::from(
            json!({
                "name": "New User",
                "email": email,
                "password": "hunter42",
                "role": role,
            })
            .to_string(),
        )
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let ctx = ctx().await;
        let user = seed_user(&ctx, "u1", Role::User).await;
        assert_eq!(list(&ctx, &user, None).await.unwrap_err().status(), 403);
        assert_eq!(get_one(&ctx, &user, "u1").unwrap_err().status(), 403);
    }

    #[tokio::test]
    async fn test_admin_crud_round_trip() {
        let ctx = ctx().await;
        let admin = seed_user(&ctx, "boss", Role::Admin).await;

        let created = create(&ctx, &admin, &input("new@example.com", "publisher"))
            .await
            .unwrap();
        assert_eq!(created.status, 201);
        let id = created.data["id"].as_str().unwrap().to_string();

        let patch = Bytes::from(json!({"role": "user"}).to_string());
        let updated = update(&ctx, &admin, &id, &patch).await.unwrap();
        assert_eq!(updated.data["role"], "user");

        delete(&ctx, &admin, &id).await.unwrap();
        assert!(get_one(&ctx, &admin, &id).is_err());
    }

    #[tokio::test]
    async fn test_list_hides_password() {
        let ctx = ctx().await;
        let admin = seed_user(&ctx, "boss", Role::Admin).await;
        let out = list(&ctx, &admin, None).await.unwrap();
        let first = &out.data.as_array().unwrap()[0];
        assert!(first.get("password").is_none());
    }

    #[tokio::test]
    async fn test_admin_can_create_admin() {
        let ctx = ctx().await;
        let admin = seed_user(&ctx, "boss", Role::Admin).await;
        let created = create(&ctx, &admin, &input("second@example.com", "admin"))
            .await
            .unwrap();
        assert_eq!(created.data["role"], "admin");
    }
}
