//! Register action - creates an account with its own family code

use serde::Deserialize;
use tracing::{info, warn};

use super::session::{issue_session, AuthSession};
use crate::common::{AppError, StoreError};
use crate::domains::auth::password::{hash_password, MIN_PASSWORD_LEN};
use crate::domains::family::allocate_family_code;
use crate::domains::users::models::{normalize_email, Role, User};
use crate::kernel::ServerDeps;

const MAX_INSERT_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Option<String>,
}

struct ValidRegistration {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    role: Role,
}

impl RegisterInput {
    fn validate(self) -> Result<ValidRegistration, AppError> {
        let email = normalize_email(&self.email);
        if !looks_like_email(&email) {
            return Err(AppError::validation("A valid email is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AppError::validation("First and last name are required"));
        }
        let role = match self.role.as_deref() {
            None | Some("") => Role::default(),
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| AppError::validation("Role must be parent or guardian"))?,
        };
        Ok(ValidRegistration {
            email,
            password: self.password,
            first_name,
            last_name,
            role,
        })
    }
}

/// `local@domain.tld` with no whitespace.
pub(crate) fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Register a new user.
///
/// This action:
/// 1. Validates and normalizes the input
/// 2. Rejects an email that is already registered
/// 3. Hashes the password and allocates a fresh family code
/// 4. Inserts the user, retrying with a new code if the code was taken
///    concurrently
pub async fn register(deps: &ServerDeps, input: RegisterInput) -> Result<AuthSession, AppError> {
    let input = input.validate()?;

    if deps.users.find_by_email(&input.email).await?.is_some() {
        return Err(AppError::conflict("User already exists"));
    }

    let password = input.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let family_code = allocate_family_code(deps.users.as_ref()).await?;
        let user = User::new(
            input.email.clone(),
            password_hash.clone(),
            input.first_name.clone(),
            input.last_name.clone(),
            input.role,
            Some(family_code),
        );

        match deps.users.insert(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, family_code = ?user.family_code, "User registered");
                return issue_session(deps, user);
            }
            Err(StoreError::Conflict(constraint)) if constraint.contains("family_code") => {
                warn!(attempt, "Family code taken during insert, retrying");
            }
            Err(StoreError::Conflict(_)) => {
                return Err(AppError::conflict("User already exists"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "Could not register user after {} attempts",
        MAX_INSERT_ATTEMPTS
    )))
}
