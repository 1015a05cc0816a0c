//! Vérifie la connexion à un serveur Subsonic
//!
//! Usage :
//!
//! ```text
//! cargo run -p pmosubsonic --example ping -- http://navidrome.local:4533 alice secret
//! ```
//!
//! Sans argument, le serveur est lu dans la configuration pmoconfig
//! (`accounts.subsonic`).

use pmosubsonic::{ServerConfig, SubsonicClient, ValidationError, validate_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let client = match args.as_slice() {
        [url, username, password] => {
            SubsonicClient::new(ServerConfig::new(url.as_str(), username.as_str(), password.as_str()))?
        }
        _ => SubsonicClient::from_config()?,
    };

    println!("=== PMOSubsonic - Ping ===\n");
    println!("Serveur : {}", client.server_config().base_url);

    match validate_server(client.server_config()).await {
        Ok(()) => println!("✓ Serveur joignable, credentials acceptés"),
        Err(ValidationError::InvalidAuth) => println!("✗ Credentials refusés"),
        Err(ValidationError::CannotConnect) => println!("✗ Serveur injoignable"),
    }

    println!("ping: {}", client.ping().await?);
    client.close();
    Ok(())
}

/// Installe le logging : `RUST_LOG` s'il est défini, sinon `host.logger` de pmoconfig
fn init_logging() -> anyhow::Result<()> {
    let config = pmoconfig::get_config();
    if !config.get_log_enable_console()? {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(config.get_log_min_level()?.to_lowercase()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
