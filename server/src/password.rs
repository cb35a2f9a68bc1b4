use crate::error::AppError;

/// Verified against when the email is unknown, so both failure paths cost one
/// bcrypt round.
const UNKNOWN_USER_HASH: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash worker failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("bcrypt hash failed: {e}")))
}

/// `None` hash means the account does not exist; the result is then always false.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool, AppError> {
    let known = hash.is_some();
    let hash = hash.unwrap_or_else(|| UNKNOWN_USER_HASH.to_string());
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify worker failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("bcrypt verify failed: {e}")))?;
    Ok(known && matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("abc12345".to_string(), 4)
            .await
            .expect("hash password");
        assert!(hash.starts_with("$2"));
        assert!(
            verify_password("abc12345".to_string(), Some(hash.clone()))
                .await
                .expect("verify")
        );
        assert!(
            !verify_password("abc12346".to_string(), Some(hash))
                .await
                .expect("verify wrong password")
        );
    }

    #[tokio::test]
    async fn unknown_user_never_verifies() {
        assert!(
            !verify_password("anything".to_string(), None)
                .await
                .expect("verify unknown user")
        );
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_internal_error() {
        let result = verify_password("abc12345".to_string(), Some("not-a-hash".to_string())).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
