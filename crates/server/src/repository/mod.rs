//! Persistence of user records.

mod seaorm;

pub use seaorm::SeaOrmUserRepository;

use crate::entity::user;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Data needed to insert a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Vec<u8>,
    pub date_registration: OffsetDateTime,
    pub date_last_online: OffsetDateTime,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored row with its generated id.
    async fn create(&self, user: NewUser) -> Result<user::Model, RepositoryError>;

    async fn get_user_by_email(&self, email: &str) -> Result<user::Model, RepositoryError>;

    async fn get_user_by_id(&self, id: i32) -> Result<user::Model, RepositoryError>;

    /// Set `date_last_online` of the user to `at`.
    async fn touch_last_online(
        &self,
        id: i32,
        at: OffsetDateTime,
    ) -> Result<(), RepositoryError>;
}
