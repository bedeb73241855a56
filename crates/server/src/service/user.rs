//! Credential service: sign-up, sign-in and user lookup.

use crate::entity::user;
use crate::oauth2::password::{HashError, PasswordHasher, hashes_match};
use crate::repository::{NewUser, RepositoryError, UserRepository};
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("Password is incorrect")]
    PasswordIncorrect,
    #[error("User already exists")]
    AlreadyExists,
    #[error("Failed to hash password: {0}")]
    Hash(#[from] HashError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UserError::NotFound,
            RepositoryError::AlreadyExists => UserError::AlreadyExists,
            other => UserError::Repository(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    salt: Vec<u8>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

/// Emails are compared case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        salt: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            repo,
            hasher,
            salt: salt.into(),
        }
    }

    /// Hash the password and store a new user.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<user::Model, UserError> {
        let password_hash = self.hasher.hash(&input.password, &self.salt)?;
        let now = OffsetDateTime::now_utc();

        let created = self
            .repo
            .create(NewUser {
                username: input.username.trim().to_string(),
                email: normalize_email(&input.email),
                password_hash,
                date_registration: now,
                date_last_online: now,
            })
            .await?;

        tracing::info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Check the credentials and return the matching user.
    ///
    /// The last-online timestamp is refreshed on success; a failure to do so
    /// is only logged.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<user::Model, UserError> {
        let candidate = self.hasher.hash(&input.password, &self.salt)?;
        let user = self
            .repo
            .get_user_by_email(&normalize_email(&input.email))
            .await?;

        if !hashes_match(&user.password_hash, &candidate) {
            return Err(UserError::PasswordIncorrect);
        }

        if let Err(e) = self
            .repo
            .touch_last_online(user.id, OffsetDateTime::now_utc())
            .await
        {
            tracing::warn!(user_id = user.id, error = %e, "Failed to update last online time");
        }

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<user::Model, UserError> {
        Ok(self.repo.get_user_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sea_orm::DbErr;
    use std::sync::Mutex;

    /// Cheap stand-in so the tests do not pay for Argon2.
    struct ReverseHasher;

    impl PasswordHasher for ReverseHasher {
        fn hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>, HashError> {
            let mut out: Vec<u8> = password.bytes().rev().collect();
            out.extend_from_slice(salt);
            Ok(out)
        }
    }

    #[derive(Default)]
    struct MemoryRepo {
        users: Mutex<Vec<user::Model>>,
        touched: Mutex<Vec<i32>>,
        broken: bool,
    }

    #[async_trait]
    impl UserRepository for MemoryRepo {
        async fn create(&self, new_user: NewUser) -> Result<user::Model, RepositoryError> {
            if self.broken {
                return Err(RepositoryError::Database(DbErr::Custom("down".into())));
            }
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == new_user.email) {
                return Err(RepositoryError::AlreadyExists);
            }
            let model = user::Model {
                id: users.len() as i32 + 1,
                username: new_user.username,
                email: new_user.email,
                password_hash: new_user.password_hash,
                date_registration: new_user.date_registration,
                date_last_online: new_user.date_last_online,
            };
            users.push(model.clone());
            Ok(model)
        }

        async fn get_user_by_email(&self, email: &str) -> Result<user::Model, RepositoryError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }

        async fn get_user_by_id(&self, id: i32) -> Result<user::Model, RepositoryError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(RepositoryError::NotFound)
        }

        async fn touch_last_online(
            &self,
            id: i32,
            _at: OffsetDateTime,
        ) -> Result<(), RepositoryError> {
            self.touched.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn service(repo: Arc<MemoryRepo>) -> UserService {
        UserService::new(repo, Arc::new(ReverseHasher), b"pepper-salt".to_vec())
    }

    fn alice() -> SignUpInput {
        SignUpInput {
            username: "alice".into(),
            email: " Alice@Example.COM ".into(),
            password: "hunter22".into(),
        }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let repo = Arc::new(MemoryRepo::default());
        let svc = service(repo.clone());

        let created = svc.sign_up(alice()).await.unwrap();
        assert_eq!(created.email, "alice@example.com");
        assert_eq!(created.date_registration, created.date_last_online);

        let signed_in = svc
            .sign_in(SignInInput {
                email: "ALICE@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.id, created.id);
        assert_eq!(*repo.touched.lock().unwrap(), vec![created.id]);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let svc = service(Arc::new(MemoryRepo::default()));
        svc.sign_up(alice()).await.unwrap();

        let err = svc
            .sign_in(SignInInput {
                email: "alice@example.com".into(),
                password: "hunter23".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::PasswordIncorrect));
    }

    #[tokio::test]
    async fn test_sign_in_unknown_email() {
        let svc = service(Arc::new(MemoryRepo::default()));
        let err = svc
            .sign_in(SignInInput {
                email: "nobody@example.com".into(),
                password: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let svc = service(Arc::new(MemoryRepo::default()));
        svc.sign_up(alice()).await.unwrap();
        let err = svc.sign_up(alice()).await.unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_database_errors_are_not_remapped() {
        let repo = Arc::new(MemoryRepo {
            broken: true,
            ..Default::default()
        });
        let err = service(repo).sign_up(alice()).await.unwrap_err();
        assert!(matches!(
            err,
            UserError::Repository(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let svc = service(Arc::new(MemoryRepo::default()));
        let created = svc.sign_up(alice()).await.unwrap();

        assert_eq!(svc.get_user_by_id(created.id).await.unwrap().username, "alice");
        assert!(matches!(
            svc.get_user_by_id(42).await,
            Err(UserError::NotFound)
        ));
    }
}
