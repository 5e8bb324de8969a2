use serde::Deserialize;
use tracing::info;

use crate::common::AppError;
use crate::domains::users::models::{ProfileUpdate, User};
use crate::kernel::ServerDeps;

/// `PUT /profile/update` body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl UpdateProfileInput {
    fn validate(self) -> Result<ProfileUpdate, AppError> {
        Ok(ProfileUpdate {
            first_name: non_empty(self.first_name, "First name cannot be empty")?,
            last_name: non_empty(self.last_name, "Last name cannot be empty")?,
            profile_picture: self.profile_picture,
        })
    }
}

fn non_empty(value: Option<String>, message: &str) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(AppError::validation(message)),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

pub async fn update_profile(
    deps: &ServerDeps,
    user: &User,
    input: UpdateProfileInput,
) -> Result<User, AppError> {
    let update = input.validate()?;
    let updated = deps
        .users
        .update_profile(user.id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    info!(user_id = %user.id, "Profile updated");
    Ok(updated)
}
