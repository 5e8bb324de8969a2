//! `/profile/*` handlers: dependents, family overview, profile edits.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::common::{AppError, DependentId};
use crate::domains::family;
use crate::domains::users::actions::{
    self, added_message, DependentUpdateInput, NewDependentInput, UpdateProfileInput,
};
use crate::server::app::AppState;
use crate::server::middleware::CurrentUser;

fn dependent_id(raw: &str) -> Result<DependentId, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("Child not found"))
}

pub async fn list_children_handler(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "children": user.dependents }))
}

pub async fn add_child_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<NewDependentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(input) = body?;
    let child = actions::add_dependent(&state.deps, &user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": added_message(child.relationship),
            "child": child,
        })),
    ))
}

pub async fn update_child_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<DependentUpdateInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = dependent_id(&id)?;
    let Json(input) = body?;
    let child = actions::update_dependent(&state.deps, &user, id, input).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "child": child,
    })))
}

pub async fn remove_child_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = dependent_id(&id)?;
    actions::remove_dependent(&state.deps, &user, id).await?;
    Ok(Json(json!({ "message": "Profile removed successfully" })))
}

pub async fn family_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<family::FamilyOverview>, AppError> {
    Ok(Json(family::family_overview(&state.deps, &user).await?))
}

pub async fn update_profile_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<UpdateProfileInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(input) = body?;
    let updated = actions::update_profile(&state.deps, &user, input).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": updated,
    })))
}
