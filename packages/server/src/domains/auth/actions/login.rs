use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use super::session::{issue_session, AuthSession};
use crate::common::AppError;
use crate::domains::auth::password::verify_password;
use crate::domains::users::models::normalize_email;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn invalid_credentials() -> AppError {
    AppError::validation("Invalid credentials")
}

/// Check credentials and issue a token. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn login(deps: &ServerDeps, input: LoginInput) -> Result<AuthSession, AppError> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let Some(mut user) = deps.users.find_by_email(&email).await? else {
        debug!("Login for unknown email");
        return Err(invalid_credentials());
    };

    let password = input.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(anyhow::Error::from)??;
    if !matches {
        debug!(user_id = %user.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let now = Utc::now();
    deps.users.record_login(user.id, now).await?;
    user.last_login = now;

    info!(user_id = %user.id, "User logged in");
    issue_session(deps, user)
}
