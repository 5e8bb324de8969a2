use rand::Rng;
use tracing::debug;

use crate::common::AppError;
use crate::kernel::BaseUserStore;

pub const FAMILY_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_ATTEMPTS: usize = 8;

/// Random six-character upper-case alphanumeric code.
pub fn generate_family_code() -> String {
    let mut rng = rand::thread_rng();
    (0..FAMILY_CODE_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Pick a code no existing user holds. The unique index still has the final
/// say; callers retry on a conflicting insert.
pub async fn allocate_family_code(users: &dyn BaseUserStore) -> Result<String, AppError> {
    for attempt in 1..=MAX_ATTEMPTS {
        let code = generate_family_code();
        if !users.family_code_exists(&code).await? {
            return Ok(code);
        }
        debug!(attempt, "Family code collision, retrying");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "Could not allocate a unique family code after {} attempts",
        MAX_ATTEMPTS
    )))
}
