//! Couche d'accès à l'API REST Subsonic
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec un serveur
//! Subsonic (Navidrome, Airsonic, Gonic...) : signature des requêtes, envoi
//! avec délai borné et décodage des réponses.

pub mod catalog;
pub mod signing;

use crate::decode::{Document, Payload};
use crate::error::{Result, SubsonicError};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Délai par défaut d'une requête
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 8;

/// User-Agent par défaut
pub const DEFAULT_USER_AGENT: &str = concat!("pmosubsonic/", env!("CARGO_PKG_VERSION"));

/// Paramètres de connexion à un serveur Subsonic
#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// URL de base du serveur (sans `/rest`)
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl ServerConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
        }
    }
}

// Le mot de passe n'apparaît jamais dans les logs
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// État de la session HTTP
enum Session {
    /// Pas encore de client HTTP
    Idle,
    Open(Client),
    /// Session libérée par `close()`
    Closed,
}

/// Client API bas-niveau pour communiquer avec un serveur Subsonic
pub struct SubsonicApi {
    config: ServerConfig,
    /// `{base_url}/rest/`
    rest_base: Url,
    user_agent: String,
    request_timeout: Duration,
    session: Mutex<Session>,
}

impl SubsonicApi {
    /// Crée une nouvelle instance de l'API
    ///
    /// Le client HTTP est créé au premier appel.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let rest_base = Url::parse(&format!("{}/rest/", config.base_url))?;

        Ok(Self {
            config,
            rest_base,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            session: Mutex::new(Session::Idle),
        })
    }

    /// Partage un client HTTP existant (pool de connexions commun)
    pub fn with_client(mut self, client: Client) -> Self {
        self.session = Mutex::new(Session::Open(client));
        self
    }

    /// Définit le User-Agent envoyé à chaque requête
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    /// Définit le délai maximum d'une requête
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.request_timeout = timeout;
    }

    /// Retourne la configuration du serveur
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// User-Agent envoyé au serveur
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Délai maximum d'une requête
    pub fn timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Indique si la session a été fermée
    pub fn is_closed(&self) -> bool {
        matches!(
            *self.session.lock().unwrap_or_else(PoisonError::into_inner),
            Session::Closed
        )
    }

    /// Libère la session HTTP
    ///
    /// Retourne `true` si cet appel a effectivement libéré la session ; les
    /// appels suivants sont sans effet et retournent `false`.
    pub fn close(&self) -> bool {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *session, Session::Closed) {
            Session::Closed => false,
            Session::Idle | Session::Open(_) => {
                info!("Closing Subsonic session for {}", self.config.base_url);
                true
            }
        }
    }

    /// Client HTTP de la session, créé au premier usage
    fn http(&self) -> Result<Client> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        match &*session {
            Session::Open(client) => Ok(client.clone()),
            Session::Closed => Err(SubsonicError::Closed),
            Session::Idle => {
                debug!("Opening Subsonic session for {}", self.config.base_url);
                let client = Client::builder().user_agent(&self.user_agent).build()?;
                *session = Session::Open(client.clone());
                Ok(client)
            }
        }
    }

    /// URL `{base_url}/rest/{endpoint}.view`
    pub fn endpoint_url(&self, endpoint: &str) -> Url {
        let mut url = self.rest_base.clone();
        let path = format!("{}{}.view", self.rest_base.path(), endpoint);
        url.set_path(&path);
        url
    }

    /// Signe les paramètres d'une requête (salt neuf à chaque appel)
    pub fn sign(&self, params: &[(&str, &str)]) -> Vec<(String, String)> {
        signing::sign(&self.config.username, &self.config.password, params)
    }

    /// Construit une URL signée sans émettre de requête
    ///
    /// Utilisé pour les pochettes et les flux, consommés par un lecteur externe.
    pub fn build_signed_url(&self, endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.endpoint_url(endpoint);
        url.query_pairs_mut().extend_pairs(self.sign(params));
        url.into()
    }

    /// Effectue une requête GET et décode la réponse
    ///
    /// Une réponse `status="failed"` devient [`SubsonicError::ServerRejected`].
    pub(crate) async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Document> {
        let payload = self.request(Method::GET, endpoint, params).await?;
        let document = Document::from_payload(&payload)?;

        if let Some((code, message)) = document.failure() {
            warn!("Subsonic API error on {} (code {}): {}", endpoint, code, message);
            return Err(SubsonicError::ServerRejected { code, message });
        }

        Ok(document)
    }

    /// Effectue une requête à l'API (générique)
    ///
    /// Le corps JSON est parsé, le corps XML est retourné brut.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Payload> {
        let client = self.http()?;
        let url = self.endpoint_url(endpoint);
        let query = self.sign(params);

        debug!("{} {} with {} params", method, url, params.len());

        let call = async {
            let response = client
                .request(method, url)
                .header(USER_AGENT, &self.user_agent)
                .query(&query)
                .send()
                .await?
                .error_for_status()?;

            debug!("Response status: {}", response.status());

            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains("application/json"));

            if is_json {
                let bytes = response.bytes().await?;
                Ok::<_, SubsonicError>(Payload::Json(serde_json::from_slice(&bytes)?))
            } else {
                Ok(Payload::Xml(response.text().await?))
            }
        };

        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(Ok(payload)) => Ok(payload),
            Ok(Err(SubsonicError::Connection(e))) if e.is_timeout() => {
                error!("Timeout error on {}", endpoint);
                Err(SubsonicError::Timeout)
            }
            Ok(Err(e)) => {
                if e.is_connection_failure() {
                    error!("Error connecting to Subsonic server: {}", e);
                }
                Err(e)
            }
            Err(_) => {
                error!("Timeout error on {}", endpoint);
                Err(SubsonicError::Timeout)
            }
        }
    }
}

impl fmt::Debug for SubsonicApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsonicApi")
            .field("config", &self.config)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .field("closed", &self.is_closed())
            .finish()
    }
}
