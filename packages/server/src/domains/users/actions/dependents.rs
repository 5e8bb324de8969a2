//! Child and pet profiles owned by a user.

use serde::Deserialize;
use tracing::info;

use crate::common::{AppError, DependentId};
use crate::domains::users::models::{parse_birth_date, Dependent, Relationship, User};
use crate::kernel::ServerDeps;

/// `POST /profile/children` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDependentInput {
    #[serde(default)]
    pub name: String,
    pub birth_date: Option<String>,
    pub relationship: Option<String>,
}

/// `PUT /profile/children/:id` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentUpdateInput {
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub profile_picture: Option<String>,
}

/// Confirmation message for a newly added dependent.
pub fn added_message(relationship: Relationship) -> &'static str {
    match relationship {
        Relationship::Child => "Child added successfully",
        Relationship::Pet => "Pet added successfully",
    }
}

fn child_not_found() -> AppError {
    AppError::not_found("Child not found")
}

pub async fn add_dependent(
    deps: &ServerDeps,
    user: &User,
    input: NewDependentInput,
) -> Result<Dependent, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    let relationship = match input.relationship.as_deref() {
        None => Relationship::default(),
        Some(raw) => raw
            .parse::<Relationship>()
            .map_err(|_| AppError::validation("Relationship must be child or pet"))?,
    };
    let birth_date = input
        .birth_date
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(parse_birth_date)
        .transpose()?;

    let dependent = Dependent::new(name.to_string(), birth_date, relationship);
    deps.users.insert_dependent(user.id, &dependent).await?;

    info!(user_id = %user.id, dependent_id = %dependent.id, %relationship, "Dependent added");
    Ok(dependent)
}

/// Apply the provided fields. An empty name leaves the current one in place.
pub async fn update_dependent(
    deps: &ServerDeps,
    user: &User,
    dependent_id: DependentId,
    input: DependentUpdateInput,
) -> Result<Dependent, AppError> {
    let mut dependent = user
        .dependents
        .iter()
        .find(|d| d.id == dependent_id)
        .cloned()
        .ok_or_else(child_not_found)?;

    if let Some(name) = input.name.as_deref().map(str::trim) {
        if !name.is_empty() {
            dependent.name = name.to_string();
        }
    }
    if let Some(raw) = input.birth_date.as_deref().filter(|raw| !raw.trim().is_empty()) {
        dependent.birth_date = Some(parse_birth_date(raw)?);
    }
    if let Some(picture) = input.profile_picture {
        dependent.profile_picture = Some(picture);
    }

    if !deps.users.update_dependent(user.id, &dependent).await? {
        return Err(child_not_found());
    }
    Ok(dependent)
}

pub async fn remove_dependent(
    deps: &ServerDeps,
    user: &User,
    dependent_id: DependentId,
) -> Result<(), AppError> {
    if !deps.users.remove_dependent(user.id, dependent_id).await? {
        return Err(child_not_found());
    }
    info!(user_id = %user.id, %dependent_id, "Dependent removed");
    Ok(())
}
