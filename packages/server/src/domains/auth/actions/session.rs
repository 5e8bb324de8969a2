use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{AppError, UserId};
use crate::domains::users::models::{Dependent, Role, User, UserSummary};
use crate::kernel::ServerDeps;

/// A freshly authenticated user and their bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

pub(crate) fn issue_session(deps: &ServerDeps, user: User) -> Result<AuthSession, AppError> {
    let token = deps.jwt_service.create_token(user.id)?;
    Ok(AuthSession { token, user })
}

/// User block returned by register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub family_code: Option<String>,
    pub role: Role,
    pub children: Vec<Dependent>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            family_code: user.family_code.clone(),
            role: user.role,
            children: user.dependents.clone(),
        }
    }
}

/// `GET /auth/profile` payload: the user with members resolved to summaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: String,
    pub role: Role,
    pub family_code: Option<String>,
    pub family_members: Vec<UserSummary>,
    pub children: Vec<Dependent>,
    pub is_email_verified: bool,
    pub last_login: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
