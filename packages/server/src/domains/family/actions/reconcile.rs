use tracing::{info, warn};

use crate::common::AppError;
use crate::kernel::BaseUserStore;

/// Restore symmetry for memberships left one-sided by an interrupted join.
pub async fn reconcile_family_links(
    users: &dyn BaseUserStore,
    dry_run: bool,
) -> Result<u64, AppError> {
    let count = users.repair_family_links(dry_run).await?;
    if count == 0 {
        info!("Family memberships are symmetric");
    } else if dry_run {
        warn!(count, "Found one-sided family memberships (dry run, not repaired)");
    } else {
        warn!(count, "Repaired one-sided family memberships");
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::TestDependencies;

    #[tokio::test]
    async fn test_dry_run_counts_without_repairing() {
        let deps = TestDependencies::new();
        let ann = deps.seed_user("Ann", Some("F1")).await;
        let ben = deps.seed_user("Ben", None).await;
        deps.users.add_family_member(ann.id, ben.id).await.unwrap();

        assert_eq!(reconcile_family_links(&*deps.users, true).await.unwrap(), 1);
        assert!(deps.user(ben.id).family_members.is_empty());

        assert_eq!(reconcile_family_links(&*deps.users, false).await.unwrap(), 1);
        assert_eq!(deps.user(ben.id).family_members, vec![ann.id]);
        assert_eq!(reconcile_family_links(&*deps.users, false).await.unwrap(), 0);
    }
}
