use crate::api::{authorize, own_or_admin, parse_body, to_json, ApiCtx};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::model::{Review, Role, User};
use crate::query::ListQuery;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct ReviewInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub rating: Option<f64>,
}

pub async fn list(ctx: &ApiCtx, query: Option<&str>) -> ApiResult<ApiOutput> {
    let result = ListQuery::parse(query).apply(&ctx.store.reviews.all())?;
    Ok(ApiOutput::list(result))
}

pub fn list_for_bootcamp(ctx: &ApiCtx, bootcamp_id: &str) -> ApiResult<ApiOutput> {
    let reviews = ctx
        .store
        .reviews
        .find(|review| review.bootcamp == bootcamp_id);
    let items = reviews.into_iter().map(to_json).collect::<ApiResult<Vec<_>>>()?;
    Ok(ApiOutput::counted(items))
}

pub fn get_one(ctx: &ApiCtx, id: &str) -> ApiResult<ApiOutput> {
    let review = ctx
        .store
        .reviews
        .get(id)
        .ok_or_else(|| ApiError::not_found("Review", id))?;
    Ok(ApiOutput::ok(to_json(review)?))
}

pub async fn create(
    ctx: &ApiCtx,
    user: &User,
    bootcamp_id: &str,
    body: &Bytes,
) -> ApiResult<ApiOutput> {
    authorize(user, &[Role::User, Role::Admin])?;
    let bootcamp = ctx
        .store
        .bootcamps
        .get(bootcamp_id)
        .ok_or_else(|| ApiError::not_found("Bootcamp", bootcamp_id))?;

    // One review per user per bootcamp.
    if !ctx
        .store
        .reviews
        .find(|review| review.bootcamp == bootcamp.id && review.user == user.id)
        .is_empty()
    {
        return Err(ApiError::BadRequest("Duplication error".to_string()));
    }

    let input: ReviewInput = parse_body(body)?;
    let review = Review {
        id: ctx.store.next_id()?,
        title: input.title.unwrap_or_default(),
        text: input.text.unwrap_or_default(),
        rating: input.rating.unwrap_or_default(),
        bootcamp: bootcamp.id,
        user: user.id.clone(),
        created_at: ctx.now()?,
    };
    review
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_review(review.clone()).await?;
    Ok(ApiOutput::created(to_json(review)?))
}

pub async fn update(ctx: &ApiCtx, user: &User, id: &str, body: &Bytes) -> ApiResult<ApiOutput> {
    let mut review = ctx
        .store
        .reviews
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No review with id {} found", id)))?;
    own_or_admin(
        user,
        &review.user,
        "You cannot edit somebody else's review".to_string(),
    )?;

    let input: ReviewInput = parse_body(body)?;
    if let Some(title) = input.title {
        review.title = title;
    }
    if let Some(text) = input.text {
        review.text = text;
    }
    if let Some(rating) = input.rating {
        review.rating = rating;
    }
    review
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_review(review.clone()).await?;
    Ok(ApiOutput::ok(to_json(review)?))
}

pub async fn delete(ctx: &ApiCtx, user: &User, id: &str) -> ApiResult<ApiOutput> {
    let review = ctx
        .store
        .reviews
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No review with id {} found", id)))?;
    own_or_admin(
        user,
        &review.user,
        "You cannot delete somebody else's review".to_string(),
    )?;

    ctx.store.delete_review(id).await?;
    Ok(ApiOutput::ok(json!({})))
}
