use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::TimeDelta;
use lakbay_shared::ReferenceData;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::config::{bcrypt_cost, cookie_secure, session_ttl_secs, static_dir};
use crate::store::UserStore;

/// Reference catalog serialised once at start, shared by every request via Arc.
#[derive(Debug, Clone)]
pub struct ReferencePayload {
    pub json: Bytes,
    pub etag: String,
}

impl ReferencePayload {
    pub fn from_data(data: &ReferenceData) -> Self {
        let json = serde_json::to_vec(data.tables())
            .map(Bytes::from)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to serialize reference tables");
                Bytes::from_static(b"{}")
            });
        let digest = hex::encode(Sha256::digest(&json));
        Self {
            etag: format!("\"reference-{}\"", &digest[..16]),
            json,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub bcrypt_cost: u32,
    pub session_ttl: TimeDelta,
    pub cookie_secure: bool,
}

impl AuthSettings {
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: bcrypt_cost(),
            session_ttl: TimeDelta::seconds(session_ttl_secs()),
            cookie_secure: cookie_secure(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: UserStore,
    pub reference: &'static ReferenceData,
    pub reference_payload: Arc<ReferencePayload>,
    pub auth: Arc<AuthSettings>,
    pub static_dir: Arc<str>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    registrations_total: AtomicU64,
    registration_rejections_total: AtomicU64,
    logins_total: AtomicU64,
    login_failures_total: AtomicU64,
    logouts_total: AtomicU64,
    reference_requests_total: AtomicU64,
    region_map_requests_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub registrations_total: u64,
    pub registration_rejections_total: u64,
    pub logins_total: u64,
    pub login_failures_total: u64,
    pub logouts_total: u64,
    pub reference_requests_total: u64,
    pub region_map_requests_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            registrations_total: self.registrations_total.load(Ordering::Relaxed),
            registration_rejections_total: self
                .registration_rejections_total
                .load(Ordering::Relaxed),
            logins_total: self.logins_total.load(Ordering::Relaxed),
            login_failures_total: self.login_failures_total.load(Ordering::Relaxed),
            logouts_total: self.logouts_total.load(Ordering::Relaxed),
            reference_requests_total: self.reference_requests_total.load(Ordering::Relaxed),
            region_map_requests_total: self.region_map_requests_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_registration(&self) {
        self.registrations_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_rejection(&self) {
        self.registration_rejections_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login(&self) {
        self.logins_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login_failure(&self) {
        self.login_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_logout(&self) {
        self.logouts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reference_request(&self) {
        self.reference_requests_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_region_map_request(&self) {
        self.region_map_requests_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    /// PostgreSQL-backed when a pool is given, in-memory otherwise.
    pub fn new(db: Option<PgPool>) -> Self {
        let store = match db {
            Some(pool) => UserStore::Postgres(pool),
            None => UserStore::in_memory(),
        };
        Self::with_parts(store, AuthSettings::from_env(), static_dir())
    }

    pub fn with_parts(store: UserStore, auth: AuthSettings, static_dir: String) -> Self {
        let reference = ReferenceData::embedded();
        Self {
            store,
            reference,
            reference_payload: Arc::new(ReferencePayload::from_data(reference)),
            auth: Arc::new(auth),
            static_dir: Arc::from(static_dir),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }

    /// In-memory store with the cheapest bcrypt cost.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::with_parts(
            UserStore::in_memory(),
            AuthSettings {
                bcrypt_cost: crate::config::MIN_BCRYPT_COST,
                session_ttl: TimeDelta::hours(1),
                cookie_secure: false,
            },
            crate::config::DEFAULT_STATIC_DIR.to_string(),
        )
    }
}
