use crate::api::{own_or_admin, parse_body, to_json, ApiCtx};
use crate::http::error::{ApiError, ApiResult};
use crate::http::response::ApiOutput;
use crate::model::{Course, MinimumSkill, User};
use crate::query::ListQuery;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct CourseInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<u32>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

pub async fn list(ctx: &ApiCtx, query: Option<&str>) -> ApiResult<ApiOutput> {
    let result = ListQuery::parse(query).apply(&ctx.store.courses.all())?;
    Ok(ApiOutput::list(result))
}

pub fn list_for_bootcamp(ctx: &ApiCtx, bootcamp_id: &str) -> ApiResult<ApiOutput> {
    let courses = ctx
        .store
        .courses
        .find(|course| course.bootcamp == bootcamp_id);
    let items = courses.into_iter().map(to_json).collect::<ApiResult<Vec<_>>>()?;
    Ok(ApiOutput::counted(items))
}

/// Single course, with the parent bootcamp inlined as
/// `{id, name, description}`.
pub fn get_one(ctx: &ApiCtx, id: &str) -> ApiResult<ApiOutput> {
    let course = ctx
        .store
        .courses
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No course found with id {}", id)))?;
    let mut data = to_json(&course)?;
    if let Some(bootcamp) = ctx.store.bootcamps.get(&course.bootcamp) {
        data["bootcamp"] = json!({
            "id": bootcamp.id,
            "name": bootcamp.name,
            "description": bootcamp.description,
        });
    }
    Ok(ApiOutput::ok(data))
}

pub async fn create(
    ctx: &ApiCtx,
    user: &User,
    bootcamp_id: &str,
    body: &Bytes,
) -> ApiResult<ApiOutput> {
    let bootcamp = ctx
        .store
        .bootcamps
        .get(bootcamp_id)
        .ok_or_else(|| ApiError::NotFound(format!("No bootcamp found with id {}", bootcamp_id)))?;
    own_or_admin(
        user,
        &bootcamp.user,
        format!(
            "User {} is not allowed to add a course to bootcamp {}",
            user.id, bootcamp.id
        ),
    )?;

    let input: CourseInput = parse_body(body)?;
    let course = Course {
        id: ctx.store.next_id()?,
        title: input.title.unwrap_or_default(),
        description: input.description.unwrap_or_default(),
        weeks: input.weeks.unwrap_or_default(),
        tuition: input.tuition.unwrap_or_default(),
        minimum_skill: input.minimum_skill.unwrap_or_default(),
        scholarship_available: input.scholarship_available.unwrap_or_default(),
        bootcamp: bootcamp.id.clone(),
        user: user.id.clone(),
        created_at: ctx.now()?,
    };
    course
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_course(course.clone()).await?;
    Ok(ApiOutput::ok(to_json(course)?))
}

pub async fn update(ctx: &ApiCtx, user: &User, id: &str, body: &Bytes) -> ApiResult<ApiOutput> {
    let mut course = ctx
        .store
        .courses
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No course found with id {}", id)))?;
    own_or_admin(
        user,
        &course.user,
        format!("User {} is not allowed to update course {}", user.id, course.id),
    )?;

    let input: CourseInput = parse_body(body)?;
    if let Some(title) = input.title {
        course.title = title;
    }
    if let Some(description) = input.description {
        course.description = description;
    }
    if let Some(weeks) = input.weeks {
        course.weeks = weeks;
    }
    if let Some(tuition) = input.tuition {
        course.tuition = tuition;
    }
    if let Some(minimum_skill) = input.minimum_skill {
        course.minimum_skill = minimum_skill;
    }
    if let Some(scholarship_available) = input.scholarship_available {
        course.scholarship_available = scholarship_available;
    }
    course
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    ctx.store.save_course(course.clone()).await?;
    Ok(ApiOutput::ok(to_json(course)?))
}

pub async fn delete(ctx: &ApiCtx, user: &User, id: &str) -> ApiResult<ApiOutput> {
    let course = ctx
        .store
        .courses
        .get(id)
        .ok_or_else(|| ApiError::NotFound(format!("No course found with id {}", id)))?;
    own_or_admin(
        user,
        &course.user,
        format!("User {} is not allowed to delete course {}", user.id, course.id),
    )?;

    ctx.store.delete_course(id).await?;
    Ok(ApiOutput::ok(json!({})))
}
