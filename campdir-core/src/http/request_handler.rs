use crate::api::{auth, bootcamps, courses, reviews, users, ApiCtx};
use crate::app_ctx::AppContext;
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::store::DataStore;
use anyhow::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{HeaderMap, Method, Request, Response};
use serde_json::json;
use std::sync::Arc;

pub async fn handle_request<B>(
    req: Request<B>,
    app_ctx: Arc<AppContext>,
    store: Arc<DataStore>,
) -> Result<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let ctx = ApiCtx { app_ctx, store };
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);
    let token = bearer_token(req.headers());
    let content_type = header_str(req.headers(), CONTENT_TYPE.as_str());

    let body = match *req.method() {
        Method::POST | Method::PUT => req.into_body().collect().await?.to_bytes(),
        _ => Bytes::new(),
    };

    log::info!("{} {}", method, path);
    let result = route(
        &ctx,
        &method,
        &path,
        query.as_deref(),
        token.as_deref(),
        content_type.as_deref(),
        body,
    )
    .await;

    match result {
        Ok(output) => output.into_hyper_response(),
        Err(err) => err.into_hyper_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    Some(headers.get(name)?.to_str().ok()?.to_string())
}

#[allow(clippy::too_many_arguments)]
async fn route(
    ctx: &ApiCtx,
    method: &Method,
    path: &str,
    query: Option<&str>,
    token: Option<&str>,
    content_type: Option<&str>,
    body: Bytes,
) -> ApiResult<ApiOutput> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let not_found = || ApiError::NotFound(format!("Route {} not found", path));

    let rest = match segments.as_slice() {
        [] => {
            return if method == Method::GET {
                Ok(ApiOutput::ok(json!({"msg": "Welcome to the campdir API"})))
            } else {
                Err(not_found())
            };
        }
        ["api", "v1", rest @ ..] => rest.to_vec(),
        _ => return Err(not_found()),
    };

    match (method.as_str(), rest.as_slice()) {
        // Bootcamps
        ("GET", ["bootcamps"]) => bootcamps::list(ctx, query).await,
        ("POST", ["bootcamps"]) => {
            let user = ctx.protect(token)?;
            bootcamps::create(ctx, &user, &body).await
        }
        ("GET", ["bootcamps", "radius", zipcode, distance]) => {
            bootcamps::radius(ctx, zipcode, distance).await
        }
        ("GET", ["bootcamps", id]) => bootcamps::get_one(ctx, id),
        ("PUT", ["bootcamps", id]) => {
            let user = ctx.protect(token)?;
            bootcamps::update(ctx, &user, id, &body).await
        }
        ("DELETE", ["bootcamps", id]) => {
            let user = ctx.protect(token)?;
            bootcamps::delete(ctx, &user, id).await
        }
        ("PUT", ["bootcamps", id, "photo"]) => {
            let user = ctx.protect(token)?;
            bootcamps::upload_photo(ctx, &user, id, content_type, body).await
        }

        // Nested children
        ("GET", ["bootcamps", id, "courses"]) => courses::list_for_bootcamp(ctx, id),
        ("POST", ["bootcamps", id, "courses"]) => {
            let user = ctx.protect(token)?;
            courses::create(ctx, &user, id, &body).await
        }
        ("GET", ["bootcamps", id, "reviews"]) => reviews::list_for_bootcamp(ctx, id),
        ("POST", ["bootcamps", id, "reviews"]) => {
            let user = ctx.protect(token)?;
            reviews::create(ctx, &user, id, &body).await
        }

        // Courses
        ("GET", ["courses"]) => courses::list(ctx, query).await,
        ("GET", ["courses", id]) => courses::get_one(ctx, id),
        ("PUT", ["courses", id]) => {
            let user = ctx.protect(token)?;
            courses::update(ctx, &user, id, &body).await
        }
        ("DELETE", ["courses", id]) => {
            let user = ctx.protect(token)?;
            courses::delete(ctx, &user, id).await
        }

        // Reviews
        ("GET", ["reviews"]) => reviews::list(ctx, query).await,
        ("GET", ["reviews", id]) => reviews::get_one(ctx, id),
        ("PUT", ["reviews", id]) => {
            let user = ctx.protect(token)?;
            reviews::update(ctx, &user, id, &body).await
        }
        ("DELETE", ["reviews", id]) => {
            let user = ctx.protect(token)?;
            reviews::delete(ctx, &user, id).await
        }

        // Auth
        ("POST", ["auth", "register"]) => auth::register(ctx, &body).await,
        ("POST", ["auth", "login"]) => auth::login(ctx, &body).await,
        ("GET", ["auth", "logout"]) => auth::logout(),
        ("GET", ["auth", "me"]) => {
            let user = ctx.protect(token)?;
            auth::me(&user)
        }
        ("PUT", ["auth", "updatedetails"]) => {
            let user = ctx.protect(token)?;
            auth::update_details(ctx, &user, &body).await
        }
        ("PUT", ["auth", "updatepassword"]) => {
            let user = ctx.protect(token)?;
            auth::update_password(ctx, &user, &body).await
        }
        ("POST", ["auth", "forgotpassword"]) => auth::forgot_password(ctx, &body).await,
        ("PUT", ["auth", "resetpassword", reset_token]) => {
            auth::reset_password(ctx, reset_token, &body).await
        }

        // Users (admin)
        ("GET", ["users"]) => {
            let admin = ctx.protect(token)?;
            users::list(ctx, &admin, query).await
        }
        ("POST", ["users"]) => {
            let admin = ctx.protect(token)?;
            users::create(ctx, &admin, &body).await
        }
        ("GET", ["users", id]) => {
            let admin = ctx.protect(token)?;
            users::get_one(ctx, &admin, id)
        }
        ("PUT", ["users", id]) => {
            let admin = ctx.protect(token)?;
            users::update(ctx, &admin, id, &body).await
        }
        ("DELETE", ["users", id]) => {
            let admin = ctx.protect(token)?;
            users::delete(ctx, &admin, id).await
        }

        _ => Err(not_found()),
    }
}
