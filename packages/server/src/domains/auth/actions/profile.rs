use super::session::ProfileView;
use crate::common::AppError;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// The acting user with direct family members resolved to summaries.
pub async fn get_profile(deps: &ServerDeps, user: &User) -> Result<ProfileView, AppError> {
    let members = deps.users.find_many(&user.family_members).await?;

    Ok(ProfileView {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        profile_picture: user.profile_picture.clone(),
        role: user.role,
        family_code: user.family_code.clone(),
        family_members: members.iter().map(User::summary).collect(),
        children: user.dependents.clone(),
        is_email_verified: user.is_email_verified,
        last_login: user.last_login,
        created_at: user.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::family::join_family;
    use crate::kernel::test_dependencies::TestDependencies;

    #[tokio::test]
    async fn test_profile_lists_member_summaries() {
        let deps = TestDependencies::new();
        let ann = deps.seed_user("Ann", Some("F1")).await;
        let ben = deps.seed_user("Ben", Some("F2")).await;
        let server_deps = deps.server_deps();
        join_family(&server_deps, &ben, "F1").await.unwrap();

        let profile = get_profile(&server_deps, &deps.user(ben.id)).await.unwrap();

        assert_eq!(profile.family_code.as_deref(), Some("F2"));
        assert_eq!(profile.family_members, vec![ann.summary()]);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["familyMembers"][0]["firstName"], "Ann");
        assert!(json.get("passwordHash").is_none());
    }
}
