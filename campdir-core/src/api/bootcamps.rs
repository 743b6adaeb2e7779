use crate::api::{authorize, own_or_admin, parse_body, to_json, ApiCtx};
use crate::geo::{haversine_miles, Geocoder};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::model::{slugify, Bootcamp, Location, Role, User};
use crate::query::ListQuery;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct BootcampInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub careers: Option<Vec<String>>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

pub async fn list(ctx: &ApiCtx, query: Option<&str>) -> ApiResult<ApiOutput> {
    let result = ListQuery::parse(query).apply(&ctx.store.bootcamps.all())?;
    Ok(ApiOutput::list(result))
}

pub fn get_one(ctx: &ApiCtx, id: &str) -> ApiResult<ApiOutput> {
    let bootcamp = ctx
        .store
        .bootcamps
        .get(id)
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))?;
    Ok(ApiOutput::ok(to_json(bootcamp)?))
}

pub async fn create(ctx: &ApiCtx, user: &User, body: &Bytes) -> ApiResult<ApiOutput> {
    authorize(user, &[Role::Publisher, Role::Admin])?;

    // A publisher gets exactly one listing.
    if user.role != Role::Admin
        && !ctx
            .store
            .bootcamps
            .find(|bootcamp| bootcamp.user == user.id)
            .is_empty()
    {
        return Err(ApiError::BadRequest(format!(
            "The user with ID {} has already published a bootcamp",
            user.id
        )));
    }

    let input: BootcampInput = parse_body(body)?;
    let name = input.name.unwrap_or_default();
    let mut bootcamp = Bootcamp {
        id: ctx.store.next_id()?,
        slug: slugify(&name),
        name,
        description: input.description.unwrap_or_default(),
        website: input.website,
        phone: input.phone,
        email: input.email,
        address: input.address.unwrap_or_default(),
        careers: input.careers.unwrap_or_default(),
        housing: input.housing.unwrap_or_default(),
        job_assistance: input.job_assistance.unwrap_or_default(),
        job_guarantee: input.job_guarantee.unwrap_or_default(),
        accept_gi: input.accept_gi.unwrap_or_default(),
        user: user.id.clone(),
        created_at: ctx.now()?,
        ..Default::default()
    };
    bootcamp
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !ctx
        .store
        .bootcamps
        .find(|existing| existing.slug == bootcamp.slug)
        .is_empty()
    {
        return Err(ApiError::BadRequest("Duplication error".to_string()));
    }

    bootcamp.location = geocode_address(ctx, &bootcamp.address).await;

    ctx.store.save_bootcamp(bootcamp.clone()).await?;
    Ok(ApiOutput::created(
        to_json(bootcamp)?,
    ))
}

pub async fn update(ctx: &ApiCtx, user: &User, id: &str, body: &Bytes) -> ApiResult<ApiOutput> {
    let mut bootcamp = ctx
        .store
        .bootcamps
        .get(id)
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))?;
    own_or_admin(
        user,
        &bootcamp.user,
        format!("User {} is not authorized to update this bootcamp", user.id),
    )?;

    let input: BootcampInput = parse_body(body)?;
    if let Some(name) = input.name {
        bootcamp.slug = slugify(&name);
        bootcamp.name = name;
    }
    if let Some(description) = input.description {
        bootcamp.description = description;
    }
    if input.website.is_some() {
        bootcamp.website = input.website;
    }
    if input.phone.is_some() {
        bootcamp.phone = input.phone;
    }
    if input.email.is_some() {
        bootcamp.email = input.email;
    }
    if let Some(careers) = input.careers {
        bootcamp.careers = careers;
    }
    if let Some(housing) = input.housing {
        bootcamp.housing = housing;
    }
    if let Some(job_assistance) = input.job_assistance {
        bootcamp.job_assistance = job_assistance;
    }
    if let Some(job_guarantee) = input.job_guarantee {
        bootcamp.job_guarantee = job_guarantee;
    }
    if let Some(accept_gi) = input.accept_gi {
        bootcamp.accept_gi = accept_gi;
    }
    if let Some(address) = input.address {
        bootcamp.location = geocode_address(ctx, &address).await;
        bootcamp.address = address;
    }

    bootcamp
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if !ctx
        .store
        .bootcamps
        .find(|existing| existing.slug == bootcamp.slug && existing.id != bootcamp.id)
        .is_empty()
    {
        return Err(ApiError::BadRequest("Duplication error".to_string()));
    }

    ctx.store.save_bootcamp(bootcamp.clone()).await?;
    Ok(ApiOutput::ok(
        to_json(bootcamp)?,
    ))
}

pub async fn delete(ctx: &ApiCtx, user: &User, id: &str) -> ApiResult<ApiOutput> {
    let bootcamp = ctx
        .store
        .bootcamps
        .get(id)
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))?;
    own_or_admin(
        user,
        &bootcamp.user,
        format!("User {} is not authorized to delete this bootcamp", user.id),
    )?;

    ctx.store.delete_bootcamp(id).await?;
    Ok(ApiOutput::ok(json!({})))
}

/// `GET /bootcamps/radius/:zipcode/:distance` with distance in miles.
pub async fn radius(ctx: &ApiCtx, zipcode: &str, distance: &str) -> ApiResult<ApiOutput> {
    let distance: f64 = distance
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid distance: {}", distance)))?;
    let geo = ctx
        .app_ctx
        .blueprint
        .geo
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Geocoder is not configured".to_string()))?;

    let center = Geocoder::new(geo)
        .geocode(zipcode, &ctx.app_ctx.runtime)
        .await
        .map_err(|_| ApiError::BadRequest(format!("Unable to geocode: {}", zipcode)))?;

    let within = |location: &Option<Location>| {
        location
            .as_ref()
            .map(|location| haversine_miles(&center, location) <= distance)
            .unwrap_or(false)
    };
    let hits = ctx.store.bootcamps.find(|bootcamp| within(&bootcamp.location));
    let items = hits.into_iter().map(to_json).collect::<ApiResult<Vec<_>>>()?;
    Ok(ApiOutput::counted(items))
}

pub async fn upload_photo(
    ctx: &ApiCtx,
    user: &User,
    id: &str,
    content_type: Option<&str>,
    body: Bytes,
) -> ApiResult<ApiOutput> {
    let mut bootcamp = ctx
        .store
        .bootcamps
        .get(id)
        .ok_or_else(|| ApiError::not_found("Bootcamp", id))?;
    own_or_admin(
        user,
        &bootcamp.user,
        format!("User {} is not authorized to update this bootcamp", user.id),
    )?;

    let server = &ctx.app_ctx.blueprint.server;
    let ext = content_type
        .and_then(|ct| ct.strip_prefix("image/"))
        .ok_or_else(|| ApiError::BadRequest("Please upload an image file".to_string()))?
        .to_string();
    if body.is_empty() || body.len() as u64 > server.max_file_upload {
        return Err(ApiError::BadRequest(format!(
            "Please upload an image less than {} bytes",
            server.max_file_upload
        )));
    }

    let file_name = format!("photo_{}.{}", bootcamp.id, ext);
    let runtime = &ctx.app_ctx.runtime;
    runtime.file.create_dirs(&server.upload_dir).await?;
    runtime
        .file
        .write(&format!("{}/{}", server.upload_dir, file_name), &body)
        .await?;

    bootcamp.photo = Some(file_name.clone());
    ctx.store.save_bootcamp(bootcamp).await?;
    Ok(ApiOutput::ok(json!(file_name)))
}

async fn geocode_address(ctx: &ApiCtx, address: &str) -> Option<Location> {
    let geo = ctx.app_ctx.blueprint.geo.as_ref()?;
    match Geocoder::new(geo).geocode(address, &ctx.app_ctx.runtime).await {
        Ok(location) => Some(location),
        Err(e) => {
            log::warn!("unable to geocode {:?}: {}", address, e);
            None
        }
    }
}
