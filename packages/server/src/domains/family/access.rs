//! Family membership resolver.
//!
//! A user may act on a resource tagged with family code `C` when their own
//! code is `C`, or when one of their *direct* family members holds `C`.
//! Membership is never followed transitively.

use tracing::debug;

use crate::common::AppError;
use crate::domains::users::models::User;
use crate::kernel::BaseUserStore;

/// Pure access policy over already-resolved codes.
pub fn grants_access<'a>(
    own_code: Option<&str>,
    member_codes: impl IntoIterator<Item = Option<&'a str>>,
    resource_code: &str,
) -> bool {
    own_code == Some(resource_code)
        || member_codes
            .into_iter()
            .any(|code| code == Some(resource_code))
}

/// The family codes a user can reach: their own plus each direct member's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyScope {
    pub own_code: Option<String>,
    pub member_codes: Vec<Option<String>>,
}

impl FamilyScope {
    /// Load the user's direct members to learn their codes.
    pub async fn resolve(users: &dyn BaseUserStore, user: &User) -> Result<Self, AppError> {
        let members = users.find_many(&user.family_members).await?;
        Ok(Self {
            own_code: user.family_code.clone(),
            member_codes: members.into_iter().map(|m| m.family_code).collect(),
        })
    }

    pub fn can_access(&self, resource_code: &str) -> bool {
        grants_access(
            self.own_code.as_deref(),
            self.member_codes.iter().map(|c| c.as_deref()),
            resource_code,
        )
    }

    /// Distinct reachable codes, own code first.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        let all = std::iter::once(&self.own_code).chain(self.member_codes.iter());
        for code in all.flatten() {
            if !codes.contains(code) {
                codes.push(code.clone());
            }
        }
        codes
    }

    pub fn is_empty(&self) -> bool {
        self.codes().is_empty()
    }
}

/// The own-code match needs no lookup; otherwise the user's direct members
/// are fetched and compared.
pub async fn can_access_family_resource(
    users: &dyn BaseUserStore,
    user: &User,
    resource_code: &str,
) -> Result<bool, AppError> {
    if user.family_code.as_deref() == Some(resource_code) {
        return Ok(true);
    }
    if user.family_members.is_empty() {
        return Ok(false);
    }
    let allowed = FamilyScope::resolve(users, user)
        .await?
        .can_access(resource_code);
    debug!(user_id = %user.id, resource_code, allowed, "Resolved family access via members");
    Ok(allowed)
}
