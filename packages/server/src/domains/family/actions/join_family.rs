//! Join family action - links the acting user and the code's holder

use tracing::{error, info};

use crate::common::AppError;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Join the family identified by `code`.
///
/// This action:
/// 1. Finds the user holding `code` (`NotFound` if none)
/// 2. Rejects the join if the holder already lists the acting user
/// 3. Appends each user to the other's membership list
///
/// Step 3 is two independent writes. If the second fails the holder's side
/// stays linked and the error is returned; `repair_family_links` restores
/// the missing reverse edge.
///
/// Returns the family holder as loaded before the join.
pub async fn join_family(deps: &ServerDeps, acting: &User, code: &str) -> Result<User, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::validation("Family code is required"));
    }

    let owner = deps
        .users
        .find_by_family_code(code)
        .await?
        .ok_or_else(|| AppError::not_found("Family not found"))?;

    if owner.id == acting.id || owner.has_member(acting.id) {
        return Err(AppError::conflict("Already part of this family"));
    }

    deps.users.add_family_member(owner.id, acting.id).await?;

    if let Err(e) = deps.users.add_family_member(acting.id, owner.id).await {
        error!(
            owner_id = %owner.id,
            member_id = %acting.id,
            error = %e,
            "Family join left membership one-sided; reconciliation will repair it"
        );
        return Err(e.into());
    }

    info!(owner_id = %owner.id, member_id = %acting.id, family_code = code, "User joined family");
    Ok(owner)
}
