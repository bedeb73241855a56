use super::{NewUser, RepositoryError, UserRepository};
use crate::entity::user;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use std::sync::Arc;
use time::OffsetDateTime;

/// [`UserRepository`] backed by the `tb_users` table.
#[derive(Clone, Debug)]
pub struct SeaOrmUserRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn map_insert_error(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::AlreadyExists,
        _ => RepositoryError::Database(err),
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<user::Model, RepositoryError> {
        let active = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            date_registration: Set(new_user.date_registration),
            date_last_online: Set(new_user.date_last_online),
            ..Default::default()
        };

        active
            .insert(self.db.as_ref())
            .await
            .map_err(map_insert_error)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<user::Model, RepositoryError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_id(&self, id: i32) -> Result<user::Model, RepositoryError> {
        user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn touch_last_online(
        &self,
        id: i32,
        at: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        let user = self.get_user_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();
        active.date_last_online = Set(at);
        active.update(self.db.as_ref()).await?;
        Ok(())
    }
}
