//! Client principal pour interagir avec un serveur Subsonic
//!
//! Ce module fournit un client haut-niveau au-dessus de [`SubsonicApi`] :
//! construction depuis la configuration, navigation dans la bibliothèque et
//! résolution de médias (voir [`crate::resolver`]).

use crate::api::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, ServerConfig, SubsonicApi};
use crate::config_ext::SubsonicConfigExt;
use crate::error::Result;
use crate::models::*;
use pmoconfig::Config;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// Nombre d'albums récupérés en parallèle lors de la résolution d'un artiste
pub const DEFAULT_ALBUM_CONCURRENCY: usize = 1;

/// Client Subsonic haut-niveau
#[derive(Debug)]
pub struct SubsonicClient {
    /// API bas-niveau
    api: SubsonicApi,
    /// Largeur du fan-out des albums d'un artiste (1 = séquentiel)
    album_concurrency: usize,
}

impl SubsonicClient {
    /// Crée un client avec les réglages par défaut
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use pmosubsonic::{ServerConfig, SubsonicClient};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = ServerConfig::new("http://navidrome.local:4533", "alice", "secret");
    ///     let client = SubsonicClient::new(config)?;
    ///     println!("ping: {}", client.ping().await?);
    ///     client.close();
    ///     Ok(())
    /// }
    /// ```
    pub fn new(config: ServerConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Crée un builder pour configurer le client
    pub fn builder(config: ServerConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Crée un client en utilisant la configuration globale de pmoconfig
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use pmosubsonic::SubsonicClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let client = SubsonicClient::from_config()?;
    ///     let albums = client.list_albums().await?;
    ///     println!("{} albums", albums.len());
    ///     Ok(())
    /// }
    /// ```
    pub fn from_config() -> Result<Self> {
        let config = pmoconfig::get_config();
        Self::from_config_obj(config.as_ref())
    }

    /// Crée un client depuis un objet Config spécifique
    pub fn from_config_obj(config: &Config) -> Result<Self> {
        let server = config.get_subsonic_server_config()?;

        Self::builder(server)
            .timeout(Duration::from_secs(config.get_subsonic_timeout_secs()?))
            .user_agent(config.get_subsonic_user_agent()?)
            .album_concurrency(config.get_subsonic_album_concurrency()?)
            .build()
    }

    /// Retourne l'API bas-niveau
    pub fn api(&self) -> &SubsonicApi {
        &self.api
    }

    /// Retourne la configuration du serveur
    pub fn server_config(&self) -> &ServerConfig {
        self.api.config()
    }

    pub fn album_concurrency(&self) -> usize {
        self.album_concurrency
    }

    /// Libère la session HTTP (idempotent)
    pub fn close(&self) -> bool {
        self.api.close()
    }

    /// Vérifie la connexion au serveur
    pub async fn ping(&self) -> Result<bool> {
        self.api.ping().await
    }

    // ============ Bibliothèque ============

    /// Liste les albums
    pub async fn list_albums(&self) -> Result<Vec<Album>> {
        self.api.get_albums().await
    }

    /// Liste les playlists
    pub async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        self.api.get_playlists().await
    }

    /// Liste les artistes
    pub async fn list_artists(&self) -> Result<Vec<Artist>> {
        self.api.get_artists().await
    }

    /// Liste les genres
    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        self.api.get_genres().await
    }

    /// Liste les stations de radio internet
    pub async fn list_radio_stations(&self) -> Result<Vec<RadioStation>> {
        self.api.get_radio_stations().await
    }

    // ============ Entités ============

    /// Récupère un album et ses pistes
    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        self.api.get_album(album_id).await
    }

    /// Récupère une playlist et ses pistes
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        self.api.get_playlist(playlist_id).await
    }

    /// Récupère une piste
    pub async fn get_song(&self, song_id: &str) -> Result<Option<Song>> {
        self.api.get_song(song_id).await
    }

    /// Récupère un artiste et ses albums
    pub async fn get_artist(&self, artist_id: &str) -> Result<Artist> {
        self.api.get_artist(artist_id).await
    }

    /// Récupère les pistes d'un genre
    pub async fn get_songs_by_genre(&self, genre: &str) -> Result<Vec<Song>> {
        self.api.get_songs_by_genre(genre).await
    }

    // ============ URLs signées ============

    /// URL signée de la pochette
    pub fn cover_art_url(&self, id: &str) -> String {
        self.api.cover_art_url(id)
    }

    /// URL signée du flux audio d'une piste
    pub fn stream_url(&self, song_id: &str) -> String {
        self.api.stream_url(song_id)
    }
}

/// Builder pour configurer un [`SubsonicClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    config: ServerConfig,
    client: Option<Client>,
    request_timeout: Duration,
    user_agent: String,
    album_concurrency: usize,
}

impl ClientBuilder {
    /// Crée un builder avec les réglages par défaut
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            client: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            album_concurrency: DEFAULT_ALBUM_CONCURRENCY,
        }
    }

    /// Partage un client HTTP existant
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Délai maximum de chaque requête
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// User-Agent envoyé au serveur
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Nombre d'albums récupérés en parallèle pour un artiste (minimum 1)
    pub fn album_concurrency(mut self, concurrency: usize) -> Self {
        self.album_concurrency = concurrency.max(1);
        self
    }

    /// Construit le client
    pub fn build(self) -> Result<SubsonicClient> {
        info!(
            "Creating Subsonic client for {} (user {})",
            self.config.base_url, self.config.username
        );

        let mut api = SubsonicApi::new(self.config)?;
        api.set_timeout(self.request_timeout);
        api.set_user_agent(self.user_agent);

        if let Some(client) = self.client {
            api = api.with_client(client);
        }

        Ok(SubsonicClient {
            api,
            album_concurrency: self.album_concurrency,
        })
    }
}
