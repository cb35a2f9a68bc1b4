use std::time::Duration;

use tracing::{info, warn};

use crate::config::SESSION_PURGE_INTERVAL_SECS;
use crate::state::AppState;

/// Hourly removal of expired sessions. Lookups already ignore them; this only
/// keeps the table from growing.
pub async fn run(state: AppState) {
    info!(
        store = state.store.kind(),
        "Session reaper started (interval: {}s)", SESSION_PURGE_INTERVAL_SECS
    );

    let mut interval = tokio::time::interval(Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
    loop {
        interval.tick().await;
        purge_once(&state).await;
    }
}

pub(crate) async fn purge_once(state: &AppState) -> u64 {
    match state.store.purge_expired_sessions(chrono::Utc::now()).await {
        Ok(0) => 0,
        Ok(removed) => {
            info!(removed, "purged expired sessions");
            removed
        }
        Err(e) => {
            warn!(error = %e, "failed to purge expired sessions");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};

    use super::purge_once;
    use crate::state::AppState;
    use crate::store::NewUser;

    #[tokio::test]
    async fn purge_once_reports_removed_sessions() {
        let state = AppState::for_tests();
        let user = state
            .store
            .create_user(NewUser {
                email: "a@example.ph".to_string(),
                display_name: "A".to_string(),
                password_hash: "x".to_string(),
                is_admin: false,
            })
            .await
            .expect("create user");
        state
            .store
            .create_session("expired", user.id, Utc::now() - TimeDelta::minutes(5))
            .await
            .expect("create session");

        assert_eq!(purge_once(&state).await, 1);
        assert_eq!(purge_once(&state).await, 0);
    }
}
