//! Couche de services : lecture de médias sur des lecteurs cibles
//!
//! Le framework hôte fournit les lecteurs via le trait [`MediaPlayer`].
//! [`SubsonicService`] résout la référence demandée puis envoie la première
//! piste à chaque cible. Il n'y a pas de file d'attente : les pistes suivantes
//! sont ignorées.

use crate::api::{ServerConfig, SubsonicApi};
use crate::client::SubsonicClient;
use crate::error::{Result, SubsonicError};
use crate::models::{Album, TrackDescriptor};
use crate::resolver::MediaType;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Lecteur cible capable de jouer une URL
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Demande au lecteur `entity_id` de jouer `url`
    async fn play_media(&self, entity_id: &str, url: &str, mime_type: &str) -> anyhow::Result<()>;
}

/// Demande de lecture générique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayMediaRequest {
    /// Lecteurs cibles
    pub entity_ids: Vec<String>,
    /// Catégorie (`album`, `playlist`, `track`, `genre`, `artist`)
    pub media_type: String,
    pub media_id: String,
    pub shuffle: bool,
    /// Accepté mais sans effet : il n'y a pas de file d'attente
    pub enqueue: bool,
}

/// Demande de lecture d'un artiste, mélangée par défaut
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayArtistRequest {
    pub entity_ids: Vec<String>,
    pub artist_id: String,
    pub shuffle: bool,
}

impl PlayArtistRequest {
    pub fn new(entity_ids: Vec<String>, artist_id: impl Into<String>) -> Self {
        Self {
            entity_ids,
            artist_id: artist_id.into(),
            shuffle: true,
        }
    }

    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

/// Filtre de sélection d'un album au hasard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RandomAlbumFilter {
    /// Sous-chaîne recherchée dans le genre (insensible à la casse)
    pub genre: Option<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
}

impl RandomAlbumFilter {
    fn has_year_bound(&self) -> bool {
        self.year_from.is_some() || self.year_to.is_some()
    }

    /// Vérifie si un album passe le filtre
    pub fn matches(&self, album: &Album) -> bool {
        if self.has_year_bound() {
            let Some(year) = album.year else {
                return false;
            };
            if self.year_from.is_some_and(|from| year < from) {
                return false;
            }
            if self.year_to.is_some_and(|to| year > to) {
                return false;
            }
        }

        match self.genre.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
            Some(wanted) => album
                .genre
                .as_deref()
                .is_some_and(|g| g.to_lowercase().contains(&wanted.to_lowercase())),
            None => true,
        }
    }
}

/// Résultat d'une demande de lecture
#[derive(Debug, Clone, PartialEq)]
pub enum PlayOutcome {
    /// Aucun lecteur cible
    NoTarget,
    /// Type ou identifiant manquant
    MissingMedia,
    /// La résolution n'a donné aucune piste
    NothingResolved,
    /// La première piste n'a pas d'URL de streaming
    NoStreamUrl,
    /// La première piste a été envoyée aux cibles
    Dispatched {
        track: Box<TrackDescriptor>,
        targets: Vec<String>,
    },
}

/// Échec de validation d'un serveur
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid Subsonic credentials")]
    InvalidAuth,

    #[error("Cannot connect to Subsonic server")]
    CannotConnect,
}

/// Services de lecture adossés à un [`SubsonicClient`]
#[derive(Clone)]
pub struct SubsonicService {
    client: Arc<SubsonicClient>,
    player: Arc<dyn MediaPlayer>,
}

impl SubsonicService {
    pub fn new(client: Arc<SubsonicClient>, player: Arc<dyn MediaPlayer>) -> Self {
        Self { client, player }
    }

    pub fn client(&self) -> &Arc<SubsonicClient> {
        &self.client
    }

    /// Résout un média et joue la première piste sur chaque cible
    ///
    /// # Errors
    ///
    /// Les erreurs de résolution sont propagées. Un échec d'un lecteur est
    /// journalisé sans interrompre l'envoi aux autres cibles.
    pub async fn play_media(&self, request: PlayMediaRequest) -> Result<PlayOutcome> {
        if request.entity_ids.is_empty() {
            warn!("play_media called without target entity");
            return Ok(PlayOutcome::NoTarget);
        }

        if request.media_type.trim().is_empty() || request.media_id.trim().is_empty() {
            warn!("play_media called without media type or id");
            return Ok(PlayOutcome::MissingMedia);
        }

        if request.enqueue {
            debug!("Enqueue requested for {}, playing immediately", request.media_id);
        }

        let tracks = self
            .client
            .resolve(&request.media_type, &request.media_id, request.shuffle)
            .await?;

        let Some(track) = tracks.into_iter().next() else {
            warn!(
                "No tracks found for {} {}",
                request.media_type, request.media_id
            );
            return Ok(PlayOutcome::NothingResolved);
        };

        let Some(url) = track.stream_url.clone() else {
            error!("First track {:?} has no stream URL", track.id());
            return Ok(PlayOutcome::NoStreamUrl);
        };

        for entity_id in &request.entity_ids {
            info!(
                "Playing {} on {} ({})",
                track.song.title.as_deref().unwrap_or("?"),
                entity_id,
                track.mime_type
            );
            if let Err(e) = self
                .player
                .play_media(entity_id, &url, &track.mime_type)
                .await
            {
                warn!("Player {} failed to play media: {}", entity_id, e);
            }
        }

        Ok(PlayOutcome::Dispatched {
            track: Box::new(track),
            targets: request.entity_ids,
        })
    }

    pub async fn play_album(
        &self,
        entity_ids: Vec<String>,
        album_id: &str,
        shuffle: bool,
    ) -> Result<PlayOutcome> {
        self.play_typed(entity_ids, MediaType::Album, album_id, shuffle)
            .await
    }

    pub async fn play_playlist(
        &self,
        entity_ids: Vec<String>,
        playlist_id: &str,
        shuffle: bool,
    ) -> Result<PlayOutcome> {
        self.play_typed(entity_ids, MediaType::Playlist, playlist_id, shuffle)
            .await
    }

    /// Joue une piste (jamais mélangée)
    pub async fn play_track(&self, entity_ids: Vec<String>, track_id: &str) -> Result<PlayOutcome> {
        self.play_typed(entity_ids, MediaType::Track, track_id, false)
            .await
    }

    pub async fn play_artist(&self, request: PlayArtistRequest) -> Result<PlayOutcome> {
        self.play_typed(
            request.entity_ids,
            MediaType::Artist,
            &request.artist_id,
            request.shuffle,
        )
        .await
    }

    /// Choisit un album au hasard parmi ceux qui passent le filtre et le joue
    pub async fn play_random_album(
        &self,
        entity_ids: Vec<String>,
        filter: RandomAlbumFilter,
        shuffle: bool,
    ) -> Result<PlayOutcome> {
        if entity_ids.is_empty() {
            warn!("play_random_album called without target entity");
            return Ok(PlayOutcome::NoTarget);
        }

        let albums = self.client.list_albums().await?;
        let candidates: Vec<&Album> = albums
            .iter()
            .filter(|album| album.id.is_some() && filter.matches(album))
            .collect();

        debug!(
            "{} of {} album(s) match {:?}",
            candidates.len(),
            albums.len(),
            filter
        );

        let Some(album_id) = candidates
            .choose(&mut rand::rng())
            .and_then(|album| album.id.clone())
        else {
            warn!("No album matches {:?}", filter);
            return Ok(PlayOutcome::NothingResolved);
        };

        info!("Random album picked: {}", album_id);
        self.play_typed(entity_ids, MediaType::Album, &album_id, shuffle)
            .await
    }

    async fn play_typed(
        &self,
        entity_ids: Vec<String>,
        media_type: MediaType,
        media_id: &str,
        shuffle: bool,
    ) -> Result<PlayOutcome> {
        self.play_media(PlayMediaRequest {
            entity_ids,
            media_type: media_type.to_string(),
            media_id: media_id.to_string(),
            shuffle,
            enqueue: false,
        })
        .await
    }
}

impl std::fmt::Debug for SubsonicService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsonicService")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

/// Vérifie qu'un serveur répond et accepte les credentials
///
/// Le client éphémère est fermé avant de rendre la main.
pub async fn validate_server(config: &ServerConfig) -> std::result::Result<(), ValidationError> {
    let api = SubsonicApi::new(config.clone()).map_err(|e| {
        warn!("Invalid Subsonic server url {}: {}", config.base_url, e);
        ValidationError::CannotConnect
    })?;

    // `ping()` réduit un refus à `false` : on passe par `fetch` pour garder le code d'erreur
    let ping = api
        .fetch("ping", &[])
        .await
        .map(|document| document.status() == Some("ok"));
    let outcome = validation_outcome(ping);
    api.close();
    outcome
}

fn validation_outcome(ping: Result<bool>) -> std::result::Result<(), ValidationError> {
    match ping {
        Ok(true) => Ok(()),
        Ok(false) => Err(ValidationError::CannotConnect),
        Err(e) if e.is_auth_error() => Err(ValidationError::InvalidAuth),
        Err(SubsonicError::ServerRejected { code, message }) => {
            warn!("Server rejected validation (code {}): {}", code, message);
            Err(ValidationError::CannotConnect)
        }
        Err(e) => {
            warn!("Cannot validate Subsonic server: {}", e);
            Err(ValidationError::CannotConnect)
        }
    }
}
