use color_eyre::eyre::WrapErr;
use rustls::crypto;
use rustls::crypto::CryptoProvider;
use sea_orm::Database;
use service_account::AppResources;
use service_account::api::start_webserver;
use service_account::config::load_config;
use service_account::hydra::HydraClient;
use service_account::oauth2::Argon2idHasher;
use service_account::repository::SeaOrmUserRepository;
use service_account::service::UserService;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_tracing() {
    let default_directives = "service_account=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    initialize_tracing();

    let config = Arc::new(load_config().wrap_err("Failed to load configuration")?);
    tracing::info!(
        listen = %config.http.host(),
        admin_url = %config.oauth2.admin_url(),
        callback_url = %config.callback_url(),
        "Configuration loaded"
    );

    CryptoProvider::install_default(crypto::ring::default_provider())
        .map_err(|_| color_eyre::Report::msg("Failed to install crypto provider"))?;

    let db = Arc::new(
        Database::connect(&config.database.dsn)
            .await
            .wrap_err("Failed to connect to database")?,
    );

    let hydra = Arc::new(HydraClient::new(&config).wrap_err("Failed to build OAuth2 client")?);
    let users = Arc::new(UserService::new(
        Arc::new(SeaOrmUserRepository::new(db)),
        Arc::new(Argon2idHasher),
        config.database.salt.as_bytes().to_vec(),
    ));

    let resources = AppResources {
        config,
        hydra,
        users,
    };

    start_webserver(resources).await
}
