pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 604_800; // 7 days
pub const DEFAULT_STATIC_DIR: &str = "client/dist";
pub const SESSION_PURGE_INTERVAL_SECS: u64 = 3600; // hourly

pub const REFERENCE_CACHE_CONTROL: &str = "public, max-age=300";
pub const REGION_MAP_CACHE_CONTROL: &str = "public, max-age=86400";

/// `None` selects the in-memory user store.
pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn db_max_connections() -> u32 {
    std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
}

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn bcrypt_cost() -> u32 {
    std::env::var("BCRYPT_COST")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_BCRYPT_COST)
        .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST)
}

pub fn session_ttl_secs() -> i64 {
    std::env::var("SESSION_TTL_SECS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SESSION_TTL_SECS)
}

pub fn static_dir() -> String {
    std::env::var("STATIC_DIR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
}

pub fn cookie_secure() -> bool {
    std::env::var("COOKIE_SECURE")
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        temp_env::with_vars_unset(
            [
                "DATABASE_URL",
                "DB_MAX_CONNECTIONS",
                "SERVER_PORT",
                "BCRYPT_COST",
                "SESSION_TTL_SECS",
                "STATIC_DIR",
                "COOKIE_SECURE",
            ],
            || {
                assert_eq!(database_url(), None);
                assert_eq!(db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(bcrypt_cost(), DEFAULT_BCRYPT_COST);
                assert_eq!(session_ttl_secs(), DEFAULT_SESSION_TTL_SECS);
                assert_eq!(static_dir(), DEFAULT_STATIC_DIR);
                assert!(!cookie_secure());
            },
        );
    }

    #[test]
    fn zero_and_garbage_values_fall_back_to_defaults() {
        temp_env::with_vars(
            [
                ("DB_MAX_CONNECTIONS", Some("0")),
                ("SERVER_PORT", Some("not-a-port")),
                ("SESSION_TTL_SECS", Some("-5")),
                ("DATABASE_URL", Some("   ")),
            ],
            || {
                assert_eq!(db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
                assert_eq!(server_port(), DEFAULT_SERVER_PORT);
                assert_eq!(session_ttl_secs(), DEFAULT_SESSION_TTL_SECS);
                assert_eq!(database_url(), None);
            },
        );
    }

    #[test]
    fn bcrypt_cost_is_clamped_to_supported_range() {
        temp_env::with_var("BCRYPT_COST", Some("2"), || {
            assert_eq!(bcrypt_cost(), MIN_BCRYPT_COST);
        });
        temp_env::with_var("BCRYPT_COST", Some("40"), || {
            assert_eq!(bcrypt_cost(), MAX_BCRYPT_COST);
        });
        temp_env::with_var("BCRYPT_COST", Some("12"), || {
            assert_eq!(bcrypt_cost(), 12);
        });
    }

    #[test]
    fn cookie_secure_accepts_common_truthy_values() {
        for value in ["1", "true", "YES", " on "] {
            temp_env::with_var("COOKIE_SECURE", Some(value), || {
                assert!(cookie_secure(), "{value:?} should enable secure cookies");
            });
        }
        temp_env::with_var("COOKIE_SECURE", Some("off"), || {
            assert!(!cookie_secure());
        });
    }
}
