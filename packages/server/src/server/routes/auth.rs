//! `/auth/*` handlers.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::common::AppError;
use crate::domains::auth::actions::{
    self, AuthSession, LoginInput, RegisterInput, SessionUser,
};
use crate::domains::family;
use crate::server::app::AppState;
use crate::server::middleware::CurrentUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinFamilyRequest {
    #[serde(default)]
    pub family_code: String,
}

fn session_body(message: &str, session: &AuthSession) -> Value {
    json!({
        "message": message,
        "token": session.token,
        "user": SessionUser::from(&session.user),
    })
}

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(input) = body?;
    let session = actions::register(&state.deps, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(session_body("User created successfully", &session)),
    ))
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(input) = body?;
    let session = actions::login(&state.deps, input).await?;
    Ok(Json(session_body("Login successful", &session)))
}

pub async fn join_family_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<JoinFamilyRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = body?;
    family::join_family(&state.deps, &user, &request.family_code).await?;
    Ok(Json(json!({ "message": "Successfully joined family" })))
}

pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>, AppError> {
    let profile = actions::get_profile(&state.deps, &user).await?;
    Ok(Json(json!({ "user": profile })))
}
