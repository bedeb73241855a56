//! User entity - account profile and credential record.

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tb_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Raw Argon2id output for the password and the configured salt.
    pub password_hash: Vec<u8>,
    pub date_registration: OffsetDateTime,
    pub date_last_online: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Subject string handed to the OAuth2 provider for this user.
    pub fn subject(&self) -> String {
        self.id.to_string()
    }
}
