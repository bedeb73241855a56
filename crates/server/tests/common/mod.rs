//! Shared fixtures: configuration, in-memory database and a server wired to a
//! mocked OAuth2 provider.
#![allow(dead_code)]

use axum_test::TestServer;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use service_account::{
    AppResources,
    api::build_router,
    config::{AppConfig, DatabaseConfig, HttpConfig, OAuth2Config},
    hydra::HydraClient,
    oauth2::Argon2idHasher,
    repository::SeaOrmUserRepository,
    service::{SignUpInput, UserService},
};
use std::sync::Arc;
use wiremock::MockServer;

pub const SALT: &str = "test-salt-0123456789";
pub const CLIENT_ID: &str = "client-auth-code-service-account";
pub const CLIENT_SECRET: &str = "client-secret";

/// Configuration pointing the admin API and the token endpoint at `provider`.
pub fn test_config(provider: &str) -> AppConfig {
    AppConfig {
        http: HttpConfig {
            proto: "http".to_string(),
            listen_addr: "127.0.0.1".to_string(),
            port: 3000,
        },
        oauth2: OAuth2Config {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            hydra_proto: "http".to_string(),
            redirect_addr: "127.0.0.1:3000".to_string(),
            hydra_public_host: "127.0.0.1:4444".to_string(),
            hydra_public_host_private_lan: provider.to_string(),
            hydra_admin_host_private_lan: provider.to_string(),
            scopes: vec!["openid".to_string(), "offline".to_string()],
            remember_for: 3600,
        },
        database: DatabaseConfig {
            dsn: "sqlite::memory:".to_string(),
            salt: SALT.to_string(),
        },
    }
}

/// In-memory SQLite database with the `tb_users` table.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        r#"CREATE TABLE tb_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash BLOB NOT NULL,
            date_registration TEXT NOT NULL,
            date_last_online TEXT NOT NULL
        );"#,
    ))
    .await
    .expect("create tb_users table");

    db
}

pub struct TestApp {
    pub server: TestServer,
    pub provider: MockServer,
    pub users: Arc<UserService>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_database(create_test_db().await).await
    }

    /// Server over `db` as is; pass a schemaless database to make every
    /// repository call fail.
    pub async fn with_database(db: DatabaseConnection) -> Self {
        let provider = MockServer::start().await;
        let config = Arc::new(test_config(&provider.uri()));
        let db = Arc::new(db);

        let users = Arc::new(UserService::new(
            Arc::new(SeaOrmUserRepository::new(db)),
            Arc::new(Argon2idHasher),
            SALT.as_bytes().to_vec(),
        ));
        let hydra = Arc::new(HydraClient::new(&config).expect("build provider client"));

        let resources = AppResources {
            config,
            hydra,
            users: users.clone(),
        };
        let server = TestServer::new(build_router(resources)).expect("create test server");

        Self {
            server,
            provider,
            users,
        }
    }

    /// Register `alice@example.com` with password `hunter22` and return her id.
    pub async fn register_alice(&self) -> i32 {
        self.users
            .sign_up(SignUpInput {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .expect("sign up")
            .id
    }
}
