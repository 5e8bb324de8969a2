use serde::Serialize;

use crate::common::AppError;
use crate::domains::users::models::{Dependent, User, UserSummary};
use crate::kernel::ServerDeps;

/// `GET /profile/family` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyOverview {
    pub family_code: Option<String>,
    pub family_members: Vec<FamilyMemberView>,
    pub all_children: Vec<FamilyChild>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMemberView {
    #[serde(flatten)]
    pub member: UserSummary,
    pub children: Vec<Dependent>,
}

/// A dependent annotated with the name of the user it belongs to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyChild {
    #[serde(flatten)]
    pub dependent: Dependent,
    pub parent_name: String,
}

/// The user's family: direct members with their dependents, and every
/// dependent (own first, then each member's in membership order).
pub async fn family_overview(deps: &ServerDeps, user: &User) -> Result<FamilyOverview, AppError> {
    let members = deps.users.find_many(&user.family_members).await?;

    let mut all_children: Vec<FamilyChild> = Vec::new();
    for owner in std::iter::once(user).chain(members.iter()) {
        let parent_name = owner.full_name();
        all_children.extend(owner.dependents.iter().map(|d| FamilyChild {
            dependent: d.clone(),
            parent_name: parent_name.clone(),
        }));
    }

    let family_members = members
        .into_iter()
        .map(|m| FamilyMemberView {
            member: m.summary(),
            children: m.dependents,
        })
        .collect();

    Ok(FamilyOverview {
        family_code: user.family_code.clone(),
        family_members,
        all_children,
    })
}
