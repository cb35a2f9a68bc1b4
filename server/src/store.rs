use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lakbay_shared::SessionUser;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    /// Already normalised.
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx_core::Error),
}

type UserRow = (i64, String, String, String, bool, DateTime<Utc>);

/// Users and sessions, either in PostgreSQL or in process memory.
#[derive(Clone)]
pub enum UserStore {
    Postgres(PgPool),
    Memory(Arc<MemoryStore>),
}

impl UserStore {
    pub fn in_memory() -> Self {
        UserStore::Memory(Arc::new(MemoryStore::default()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UserStore::Postgres(_) => "postgres",
            UserStore::Memory(_) => "memory",
        }
    }

    pub async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                let inserted = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
                    "INSERT INTO users (email, display_name, password_hash, is_admin) \
                     VALUES ($1, $2, $3, $4) RETURNING id, created_at",
                )
                .bind(&user.email)
                .bind(&user.display_name)
                .bind(&user.password_hash)
                .bind(user.is_admin)
                .fetch_one(pool)
                .await;
                match inserted {
                    Ok((id, created_at)) => Ok(UserRecord {
                        id,
                        email: user.email,
                        display_name: user.display_name,
                        password_hash: user.password_hash,
                        is_admin: user.is_admin,
                        created_at,
                    }),
                    Err(sqlx_core::Error::Database(db_err)) if db_err.is_unique_violation() => {
                        Err(StoreError::DuplicateEmail)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            UserStore::Memory(memory) => memory.create_user(user),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                let row = sqlx::query_as::<_, UserRow>(
                    "SELECT id, email, display_name, password_hash, is_admin, created_at \
                     FROM users WHERE email = $1",
                )
                .bind(email)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(user_from_row))
            }
            UserStore::Memory(memory) => Ok(memory.users.get(email).map(|user| user.value().clone())),
        }
    }

    pub async fn create_session(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                sqlx::query(
                    "INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)",
                )
                .bind(token_hash)
                .bind(user_id)
                .bind(expires_at)
                .execute(pool)
                .await?;
                Ok(())
            }
            UserStore::Memory(memory) => {
                memory.sessions.insert(
                    token_hash.to_string(),
                    MemorySession {
                        user_id,
                        expires_at,
                    },
                );
                Ok(())
            }
        }
    }

    /// The user behind an unexpired session, if any.
    pub async fn session_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionUser>, StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                let row = sqlx::query_as::<_, (i64, String, String)>(
                    "SELECT u.id, u.email, u.display_name \
                     FROM sessions s JOIN users u ON u.id = s.user_id \
                     WHERE s.token_hash = $1 AND s.expires_at > $2",
                )
                .bind(token_hash)
                .bind(now)
                .fetch_optional(pool)
                .await?;
                Ok(row.map(|(id, email, display_name)| SessionUser {
                    id,
                    email,
                    display_name,
                }))
            }
            UserStore::Memory(memory) => Ok(memory.session_user(token_hash, now)),
        }
    }

    pub async fn delete_session(&self, token_hash: &str) -> Result<(), StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                    .bind(token_hash)
                    .execute(pool)
                    .await?;
                Ok(())
            }
            UserStore::Memory(memory) => {
                memory.sessions.remove(token_hash);
                Ok(())
            }
        }
    }

    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        match self {
            UserStore::Postgres(pool) => {
                let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
                    .bind(now)
                    .execute(pool)
                    .await?;
                Ok(result.rows_affected())
            }
            UserStore::Memory(memory) => {
                let before = memory.sessions.len();
                memory.sessions.retain(|_, session| session.expires_at > now);
                Ok(before.saturating_sub(memory.sessions.len()) as u64)
            }
        }
    }
}

fn user_from_row(row: UserRow) -> UserRecord {
    let (id, email, display_name, password_hash, is_admin, created_at) = row;
    UserRecord {
        id,
        email,
        display_name,
        password_hash,
        is_admin,
        created_at,
    }
}

#[derive(Debug, Clone, Copy)]
struct MemorySession {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, UserRecord>,
    emails_by_id: DashMap<i64, String>,
    sessions: DashMap<String, MemorySession>,
    next_id: AtomicI64,
}

impl MemoryStore {
    fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateEmail),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
                let record = UserRecord {
                    id,
                    email: user.email,
                    display_name: user.display_name,
                    password_hash: user.password_hash,
                    is_admin: user.is_admin,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                self.emails_by_id.insert(id, record.email.clone());
                Ok(record)
            }
        }
    }

    fn session_user(&self, token_hash: &str, now: DateTime<Utc>) -> Option<SessionUser> {
        let session = *self.sessions.get(token_hash)?;
        if session.expires_at <= now {
            self.sessions.remove(token_hash);
            return None;
        }
        let email = self.emails_by_id.get(&session.user_id)?.value().clone();
        self.users.get(&email).map(|user| user.session_user())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use sqlx::postgres::PgPoolOptions;

    const REAL_DB_TEST_LOCK: i64 = 41_207_001;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Juan".to_string(),
            password_hash: "$2b$04$placeholder".to_string(),
            is_admin: false,
        }
    }

    async fn exercise_store(store: &UserStore) {
        let user = store
            .create_user(new_user("juan@example.ph"))
            .await
            .expect("create user");
        assert!(user.id > 0);
        assert!(matches!(
            store.create_user(new_user("juan@example.ph")).await,
            Err(StoreError::DuplicateEmail)
        ));

        let found = store
            .find_user_by_email("juan@example.ph")
            .await
            .expect("find user")
            .expect("user should exist");
        assert_eq!(found.id, user.id);
        assert!(
            store
                .find_user_by_email("maria@example.ph")
                .await
                .expect("find missing user")
                .is_none()
        );

        let now = Utc::now();
        store
            .create_session("live", user.id, now + TimeDelta::hours(1))
            .await
            .expect("create live session");
        store
            .create_session("stale", user.id, now - TimeDelta::seconds(1))
            .await
            .expect("create stale session");

        let session = store
            .session_user("live", now)
            .await
            .expect("read live session")
            .expect("live session should resolve");
        assert_eq!(session.email, "juan@example.ph");
        assert!(
            store
                .session_user("stale", now)
                .await
                .expect("read stale session")
                .is_none()
        );

        store.delete_session("live").await.expect("delete session");
        assert!(
            store
                .session_user("live", now)
                .await
                .expect("read deleted session")
                .is_none()
        );
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = UserStore::in_memory();
        assert_eq!(store.kind(), "memory");
        exercise_store(&store).await;
    }

    #[tokio::test]
    async fn memory_store_assigns_increasing_ids() {
        let store = UserStore::in_memory();
        let first = store.create_user(new_user("a@example.ph")).await.expect("first");
        let second = store.create_user(new_user("b@example.ph")).await.expect("second");
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = UserStore::in_memory();
        let user = store.create_user(new_user("a@example.ph")).await.expect("user");
        let now = Utc::now();
        store
            .create_session("old", user.id, now - TimeDelta::minutes(1))
            .await
            .expect("old session");
        store
            .create_session("new", user.id, now + TimeDelta::minutes(1))
            .await
            .expect("new session");

        assert_eq!(store.purge_expired_sessions(now).await.expect("purge"), 1);
        assert!(store.session_user("new", now).await.expect("read").is_some());
    }

    #[tokio::test]
    async fn postgres_store_round_trip() {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("Skipping postgres store test: DATABASE_URL is not set");
            return;
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("connect real postgres");

        let mut lock_conn = pool.acquire().await.expect("acquire lock connection");
        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(REAL_DB_TEST_LOCK)
            .execute(&mut *lock_conn)
            .await
            .expect("acquire db lock");

        crate::db_migrations::run(&pool)
            .await
            .expect("run migrations");
        sqlx::query("TRUNCATE TABLE sessions, users RESTART IDENTITY")
            .execute(&pool)
            .await
            .expect("truncate tables");

        let store = UserStore::Postgres(pool.clone());
        assert_eq!(store.kind(), "postgres");
        exercise_store(&store).await;

        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(REAL_DB_TEST_LOCK)
            .execute(&mut *lock_conn)
            .await
            .expect("release db lock");
    }
}
