use config::Config;
use sea_orm_migration::prelude::*;
use std::env;

/// `SERVICE_ACCOUNT_DSN` first, then `database.dsn` from the service config file.
fn dsn_from_service_config() -> Option<String> {
    if let Some(dsn) = env::var("SERVICE_ACCOUNT_DSN").ok().filter(|v| !v.is_empty()) {
        return Some(dsn);
    }

    let path = env::var("SERVICE_ACCOUNT_CONFIG").unwrap_or_else(|_| "config.yaml".into());
    Config::builder()
        .add_source(config::File::with_name(&path))
        .build()
        .ok()?
        .get_string("database.dsn")
        .ok()
}

#[tokio::main]
async fn main() {
    // DATABASE_URL wins over the service configuration
    if env::var("DATABASE_URL").is_err() {
        if let Some(url) = dsn_from_service_config() {
            env::set_var("DATABASE_URL", url);
        }
    }
    cli::run_cli(migration::Migrator).await;
}
