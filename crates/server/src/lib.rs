//! Account management service.
//!
//! Serves the login, consent and logout pages of an ORY Hydra compatible
//! OAuth2 provider and keeps the user records those pages authenticate against.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::hydra::HydraAdmin;
use crate::service::UserService;

pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod hydra;
pub mod oauth2;
pub mod repository;
pub mod service;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppResources {
    pub config: Arc<AppConfig>,
    pub hydra: Arc<dyn HydraAdmin>,
    pub users: Arc<UserService>,
}

impl std::fmt::Debug for AppResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppResources")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
