//! Gestion des erreurs pour le client Subsonic

use thiserror::Error;

/// Type Result personnalisé pour pmosubsonic
pub type Result<T> = std::result::Result<T, SubsonicError>;

/// Codes d'erreur Subsonic liés à l'authentification
const AUTH_ERROR_CODES: [u32; 4] = [40, 41, 44, 45];

/// Code d'erreur Subsonic "ressource introuvable"
const NOT_FOUND_CODE: u32 = 70;

/// Erreurs possibles lors de l'utilisation du client Subsonic
#[derive(Error, Debug)]
pub enum SubsonicError {
    /// Le délai de la requête est dépassé
    #[error("Timeout error")]
    Timeout,

    /// Erreur de transport (DNS, connexion refusée, protocole, statut HTTP non 2xx)
    #[error("Error connecting to Subsonic server: {0}")]
    Connection(#[from] reqwest::Error),

    /// Le serveur a répondu avec un élément `<error>` (authentification, ressource absente...)
    #[error("Subsonic server rejected the request (code {code}): {message}")]
    ServerRejected { code: u32, message: String },

    /// Corps XML illisible
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Corps JSON illisible
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL de base invalide
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Requête émise après `close()`
    #[error("Subsonic client session is closed")]
    Closed,
}

impl SubsonicError {
    /// Vérifie si le serveur a refusé les credentials
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SubsonicError::ServerRejected { code, .. } if AUTH_ERROR_CODES.contains(code))
    }

    /// Vérifie si le serveur a signalé une ressource introuvable
    pub fn is_not_found(&self) -> bool {
        matches!(self, SubsonicError::ServerRejected { code, .. } if *code == NOT_FOUND_CODE)
    }

    /// Vérifie si l'erreur vient du transport (timeout ou connexion)
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, SubsonicError::Timeout | SubsonicError::Connection(_))
    }
}

impl From<quick_xml::events::attributes::AttrError> for SubsonicError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        SubsonicError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

impl From<quick_xml::encoding::EncodingError> for SubsonicError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        SubsonicError::Xml(quick_xml::Error::Encoding(err))
    }
}
