//! Module d'accès au catalogue Subsonic (albums, playlists, pistes, artistes, genres, radios)

use super::SubsonicApi;
use crate::decode::Document;
use crate::error::{Result, SubsonicError};
use crate::models::*;
use reqwest::Method;
use tracing::{debug, info, warn};

/// Taille maximale demandée à `getAlbumList2`
const ALBUM_LIST_SIZE: &str = "5000";

impl SubsonicApi {
    /// Vérifie la connexion au serveur
    ///
    /// Retourne `true` si le statut décodé vaut `ok`, `false` s'il est absent,
    /// différent ou si le corps n'est pas décodable. Seules les erreurs de
    /// transport sont propagées.
    pub async fn ping(&self) -> Result<bool> {
        // Un corps JSON invalide échoue dès `request`
        let payload = match self.request(Method::GET, "ping", &[]).await {
            Ok(payload) => payload,
            Err(SubsonicError::Json(e)) => {
                warn!("Undecodable ping response: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let document = match Document::from_payload(&payload) {
            Ok(document) => document,
            Err(e) => {
                warn!("Undecodable ping response: {}", e);
                return Ok(false);
            }
        };

        let status = document.status();
        info!("Ping: {:?}", status);

        if let Some((code, message)) = document.failure() {
            warn!("Ping rejected by server (code {}): {}", code, message);
        }

        Ok(status == Some("ok"))
    }

    /// Récupère un album et ses pistes
    pub async fn get_album(&self, album_id: &str) -> Result<Album> {
        debug!("Fetching album {}", album_id);
        let document = self.fetch("getAlbum", &[("id", album_id)]).await?;
        Ok(Album::from_document(&document))
    }

    /// Récupère une playlist et ses pistes
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<Playlist> {
        debug!("Fetching playlist {}", playlist_id);
        let document = self.fetch("getPlaylist", &[("id", playlist_id)]).await?;
        Ok(Playlist::from_document(&document))
    }

    /// Récupère une piste
    ///
    /// Retourne `None` si la réponse ne contient pas d'élément `song`.
    pub async fn get_song(&self, song_id: &str) -> Result<Option<Song>> {
        debug!("Fetching song {}", song_id);
        let document = self.fetch("getSong", &[("id", song_id)]).await?;
        Ok(document
            .element("song")
            .map(|e| Song::from_attributes(&e.attributes)))
    }

    /// Récupère les pistes d'un genre
    pub async fn get_songs_by_genre(&self, genre: &str) -> Result<Vec<Song>> {
        debug!("Fetching songs for genre {}", genre);
        let document = self.fetch("getSongsByGenre", &[("genre", genre)]).await?;
        Ok(document
            .tags_attributes("song")
            .iter()
            .map(Song::from_attributes)
            .collect())
    }

    /// Récupère un artiste et la liste de ses albums (sans pistes)
    pub async fn get_artist(&self, artist_id: &str) -> Result<Artist> {
        debug!("Fetching artist {}", artist_id);
        let document = self.fetch("getArtist", &[("id", artist_id)]).await?;
        Ok(Artist::from_document(&document))
    }

    /// Liste les albums par ordre alphabétique
    pub async fn get_albums(&self) -> Result<Vec<Album>> {
        let params = [("type", "alphabeticalByName"), ("size", ALBUM_LIST_SIZE)];
        let document = self.fetch("getAlbumList2", &params).await?;
        Ok(document
            .tags_attributes("album")
            .iter()
            .map(Album::from_attributes)
            .collect())
    }

    /// Liste les playlists
    pub async fn get_playlists(&self) -> Result<Vec<Playlist>> {
        let document = self.fetch("getPlaylists", &[]).await?;
        Ok(document
            .tags_attributes("playlist")
            .iter()
            .map(Playlist::from_attributes)
            .collect())
    }

    /// Liste les artistes (tous index confondus)
    pub async fn get_artists(&self) -> Result<Vec<Artist>> {
        let document = self.fetch("getArtists", &[]).await?;
        Ok(document
            .tags_attributes("artist")
            .iter()
            .map(Artist::from_attributes)
            .collect())
    }

    /// Liste les genres
    pub async fn get_genres(&self) -> Result<Vec<Genre>> {
        let document = self.fetch("getGenres", &[]).await?;
        Ok(document
            .elements("genre")
            .into_iter()
            .map(Genre::from_element)
            .collect())
    }

    /// Liste les stations de radio internet
    pub async fn get_radio_stations(&self) -> Result<Vec<RadioStation>> {
        let document = self.fetch("getInternetRadioStations", &[]).await?;
        Ok(document
            .tags_attributes("internetRadioStation")
            .iter()
            .map(RadioStation::from_attributes)
            .collect())
    }

    /// URL signée de la pochette
    pub fn cover_art_url(&self, id: &str) -> String {
        self.build_signed_url("getCoverArt", &[("id", id)])
    }

    /// URL signée du flux audio d'une piste
    pub fn stream_url(&self, song_id: &str) -> String {
        self.build_signed_url("stream", &[("id", song_id)])
    }
}
