//! Signature token/salt des requêtes Subsonic
//!
//! Depuis la version 1.13.0 du protocole, le mot de passe ne circule plus :
//! chaque requête porte un `salt` aléatoire et `t = md5(password + salt)`.

use md5::{Digest, Md5};
use tracing::warn;

/// Version du protocole Subsonic annoncée au serveur
pub const PROTOCOL_VERSION: &str = "1.16.1";

/// Nom du client annoncé au serveur (paramètre `c`)
pub const CLIENT_NAME: &str = "HomeAssistant";

/// Nombre d'octets aléatoires du salt (10 caractères hexadécimaux)
const SALT_BYTES: usize = 5;

/// Clés réservées à l'authentification, jamais écrasables par l'appelant
pub const RESERVED_KEYS: [&str; 6] = ["u", "t", "s", "v", "c", "p"];

/// Signature d'une requête, recalculée à chaque appel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSignature {
    pub username: String,
    pub token: String,
    pub salt: String,
    pub protocol_version: &'static str,
    pub client_name: &'static str,
}

impl RequestSignature {
    /// Génère une signature avec un salt neuf
    pub fn new(username: &str, password: &str) -> Self {
        Self::with_salt(username, password, generate_salt())
    }

    /// Génère une signature avec un salt imposé
    pub fn with_salt(username: &str, password: &str, salt: String) -> Self {
        Self {
            username: username.to_string(),
            token: generate_token(password, &salt),
            salt,
            protocol_version: PROTOCOL_VERSION,
            client_name: CLIENT_NAME,
        }
    }

    /// Paramètres de requête `u`, `t`, `s`, `v`, `c`
    pub fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("u".to_string(), self.username.clone()),
            ("t".to_string(), self.token.clone()),
            ("s".to_string(), self.salt.clone()),
            ("v".to_string(), self.protocol_version.to_string()),
            ("c".to_string(), self.client_name.to_string()),
        ]
    }
}

/// Génère un salt hexadécimal aléatoire
pub fn generate_salt() -> String {
    let bytes: [u8; SALT_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Calcule `hex(md5(password + salt))`
pub fn generate_token(password: &str, salt: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Indique si une clé de paramètre est réservée à l'authentification
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Signe une requête et y ajoute les paramètres de l'appelant
///
/// Les paramètres d'authentification viennent en premier. Un paramètre de
/// l'appelant portant une clé réservée est ignoré (avec un warning).
pub fn sign(username: &str, password: &str, extra: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut params = RequestSignature::new(username, password).to_params();

    for (key, value) in extra {
        if is_reserved_key(key) {
            warn!("Ignoring reserved Subsonic parameter '{}'", key);
            continue;
        }
        params.push((key.to_string(), value.to_string()));
    }

    params
}
