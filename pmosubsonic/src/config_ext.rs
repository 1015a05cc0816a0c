//! Extension pour intégrer la configuration Subsonic dans pmoconfig
//!
//! Ce module fournit le trait `SubsonicConfigExt` qui ajoute à
//! `pmoconfig::Config` les méthodes de lecture du serveur Subsonic :
//!
//! ```yaml
//! accounts:
//!   subsonic:
//!     url: http://navidrome.local:4533
//!     username: alice
//!     password: secret
//!     timeout_secs: 8
//!     user_agent: Home Assistant/2025.1
//!     album_concurrency: 1
//! ```

use crate::api::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, ServerConfig};
use crate::client::DEFAULT_ALBUM_CONCURRENCY;
use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::Value;

const SUBSONIC: [&str; 2] = ["accounts", "subsonic"];

fn path(key: &str) -> [&str; 3] {
    [SUBSONIC[0], SUBSONIC[1], key]
}

/// Trait d'extension pour gérer la configuration Subsonic dans pmoconfig
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::get_config;
/// use pmosubsonic::SubsonicConfigExt;
///
/// let config = get_config();
/// let server = config.get_subsonic_server_config()?;
/// println!("Subsonic server: {}", server.base_url);
/// ```
pub trait SubsonicConfigExt {
    /// Récupère l'URL du serveur
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'URL n'est pas configurée
    fn get_subsonic_url(&self) -> Result<String>;

    /// Définit l'URL du serveur
    fn set_subsonic_url(&self, url: &str) -> Result<()>;

    /// Récupère le nom d'utilisateur
    fn get_subsonic_username(&self) -> Result<String>;

    /// Définit le nom d'utilisateur
    fn set_subsonic_username(&self, username: &str) -> Result<()>;

    /// Récupère le mot de passe
    fn get_subsonic_password(&self) -> Result<String>;

    /// Définit le mot de passe
    fn set_subsonic_password(&self, password: &str) -> Result<()>;

    /// Récupère URL, utilisateur et mot de passe d'un coup
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'une des trois valeurs n'est pas configurée
    fn get_subsonic_server_config(&self) -> Result<ServerConfig>;

    /// Délai maximum d'une requête, en secondes (8 par défaut)
    fn get_subsonic_timeout_secs(&self) -> Result<u64>;

    /// User-Agent envoyé au serveur
    fn get_subsonic_user_agent(&self) -> Result<String>;

    /// Nombre d'albums récupérés en parallèle pour un artiste (1 par défaut)
    fn get_subsonic_album_concurrency(&self) -> Result<usize>;
}

impl SubsonicConfigExt for Config {
    fn get_subsonic_url(&self) -> Result<String> {
        match self.get_value(&path("url"))? {
            Value::String(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(anyhow!("Subsonic server url not configured")),
        }
    }

    fn set_subsonic_url(&self, url: &str) -> Result<()> {
        self.set_value(&path("url"), Value::String(url.to_string()))
    }

    fn get_subsonic_username(&self) -> Result<String> {
        match self.get_value(&path("username"))? {
            Value::String(s) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!("Subsonic username not configured")),
        }
    }

    fn set_subsonic_username(&self, username: &str) -> Result<()> {
        self.set_value(&path("username"), Value::String(username.to_string()))
    }

    fn get_subsonic_password(&self) -> Result<String> {
        match self.get_value(&path("password"))? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(anyhow!("Subsonic password not configured")),
        }
    }

    fn set_subsonic_password(&self, password: &str) -> Result<()> {
        self.set_value(&path("password"), Value::String(password.to_string()))
    }

    fn get_subsonic_server_config(&self) -> Result<ServerConfig> {
        let url = self.get_subsonic_url()?;
        let username = self.get_subsonic_username()?;
        let password = self.get_subsonic_password()?;
        Ok(ServerConfig::new(url, username, password))
    }

    fn get_subsonic_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&path("timeout_secs")) {
            Ok(Value::Number(n)) => Ok(n.as_u64().filter(|t| *t > 0).unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)),
            Ok(_) => Ok(DEFAULT_REQUEST_TIMEOUT_SECS), // Wrong type
            Err(_) => Ok(DEFAULT_REQUEST_TIMEOUT_SECS), // Not configured
        }
    }

    fn get_subsonic_user_agent(&self) -> Result<String> {
        match self.get_value(&path("user_agent")) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Ok(DEFAULT_USER_AGENT.to_string()),
        }
    }

    fn get_subsonic_album_concurrency(&self) -> Result<usize> {
        match self.get_value(&path("album_concurrency")) {
            Ok(Value::Number(n)) => Ok(n
                .as_u64()
                .map(|c| (c as usize).max(1))
                .unwrap_or(DEFAULT_ALBUM_CONCURRENCY)),
            _ => Ok(DEFAULT_ALBUM_CONCURRENCY),
        }
    }
}
