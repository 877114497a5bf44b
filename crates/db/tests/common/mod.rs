use agora_core::roles::Role;
use agora_db::models::user::{CreateUser, User};
use agora_db::repositories::UserRepo;
use agora_db::DbPool;
use tempfile::TempDir;

/// A migrated database living in a temporary directory.
///
/// The directory is removed when the value is dropped, so keep it alive for
/// the whole test.
pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = TempDir::new().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("test.db").display());
    let pool = agora_db::create_pool(&url).await.expect("open pool");
    agora_db::run_migrations(&pool).await.expect("run migrations");
    TestDb { pool, _dir: dir }
}

pub async fn create_user(pool: &DbPool, username: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: Role::User,
            provider: None,
            provider_id: None,
        },
    )
    .await
    .expect("create user")
}
