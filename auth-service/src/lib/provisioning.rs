use auth::PasswordHasher;

use crate::config::AccountSeed;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Account;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CredentialStore;

/// Insert configured accounts that do not exist yet.
///
/// Seeds with an invalid user ID or a malformed password hash are skipped
/// with a warning. Existing accounts keep their hash and failure counter.
///
/// # Arguments
/// * `store` - Credential store to provision into
/// * `seeds` - Accounts from configuration
///
/// # Returns
/// Number of accounts inserted
///
/// # Errors
/// * `Unavailable` - Store could not be reached
pub async fn seed_accounts<CS>(store: &CS, seeds: &[AccountSeed]) -> Result<usize, AuthError>
where
    CS: CredentialStore,
{
    let mut inserted = 0;

    for seed in seeds {
        let user_id = match UserId::new(seed.user_id.clone()) {
            Ok(user_id) => user_id,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping account seed with invalid user ID");
                continue;
            }
        };

        if !PasswordHasher::is_valid_hash(&seed.password_hash) {
            tracing::warn!(
                user_id = %user_id,
                "Skipping account seed with malformed password hash"
            );
            continue;
        }

        if store
            .provision(Account::new(user_id.clone(), seed.password_hash.clone()))
            .await?
        {
            tracing::info!(user_id = %user_id, "Account provisioned");
            inserted += 1;
        }
    }

    Ok(inserted)
}
