use std::path::Path;

const WORKSPACE_MIGRATIONS_DIR: &str = "server/migrations";
const CRATE_MIGRATIONS_DIR: &str = "./migrations";

/// Works from the workspace root (`cargo run -p lakbay-server`) and from the crate dir (tests).
fn migrations_path() -> &'static Path {
    let workspace_path = Path::new(WORKSPACE_MIGRATIONS_DIR);
    if workspace_path.exists() {
        return workspace_path;
    }
    Path::new(CRATE_MIGRATIONS_DIR)
}

/// Creates the users and sessions tables.
pub async fn run(pool: &sqlx::PgPool) -> Result<(), sqlx_core::migrate::MigrateError> {
    let migrator = sqlx_core::migrate::Migrator::new(migrations_path()).await?;
    migrator.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::migrations_path;

    #[test]
    fn migrations_directory_holds_user_and_session_tables() {
        let mut names: Vec<String> = std::fs::read_dir(migrations_path())
            .expect("migrations dir should exist")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("_create_users.sql"));
        assert!(names[1].ends_with("_create_sessions.sql"));
    }
}
