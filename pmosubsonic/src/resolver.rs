//! Résolution d'une référence de média en liste de pistes jouables
//!
//! Une référence `(type, id)` (album, playlist, piste, genre, artiste) est
//! transformée en liste ordonnée de [`TrackDescriptor`], chacun portant une
//! URL de streaming signée et un type MIME.

use crate::client::SubsonicClient;
use crate::error::Result;
use crate::models::{Song, TrackDescriptor};
use futures::stream::{self, StreamExt, TryStreamExt};
use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Type MIME retourné quand ni le serveur ni l'extension ne permettent de conclure
pub const FALLBACK_MIME_TYPE: &str = "music";

/// Catégorie de média résolvable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Album,
    Playlist,
    /// `track` ou `song`
    Track,
    /// `genre` ou `songs_by_genre`
    Genre,
    Artist,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Album => "album",
            MediaType::Playlist => "playlist",
            MediaType::Track => "track",
            MediaType::Genre => "genre",
            MediaType::Artist => "artist",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "album" => Ok(MediaType::Album),
            "playlist" => Ok(MediaType::Playlist),
            "track" | "song" => Ok(MediaType::Track),
            "genre" | "songs_by_genre" => Ok(MediaType::Genre),
            "artist" => Ok(MediaType::Artist),
            other => Err(format!("Unsupported media type: {}", other)),
        }
    }
}

/// Devine le type MIME d'une piste
///
/// Priorité au `contentType` du serveur, puis à l'extension, puis `"music"`.
pub fn infer_mime_type(song: &Song) -> String {
    if let Some(content_type) = song.content_type.as_deref().filter(|c| !c.is_empty()) {
        return content_type.to_string();
    }

    let suffix = song.suffix.as_deref().unwrap_or_default().to_ascii_lowercase();
    match suffix.as_str() {
        "flac" => "audio/flac",
        "mp3" | "mpeg" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        _ => FALLBACK_MIME_TYPE,
    }
    .to_string()
}

impl SubsonicClient {
    /// Résout une référence de média en liste de pistes jouables
    ///
    /// Un type inconnu donne une liste vide, pas une erreur. Les erreurs de
    /// transport sont propagées telles quelles, sans nouvelle tentative.
    ///
    /// ```rust,no_run
    /// use pmosubsonic::{ServerConfig, SubsonicClient};
    ///
    /// # tokio_test::block_on(async {
    /// let client = SubsonicClient::new(ServerConfig::new("http://navidrome.local:4533", "alice", "secret"))?;
    /// let tracks = client.resolve("artist", "ar-7", true).await?;
    /// if let Some(first) = tracks.first() {
    ///     println!("{:?} ({})", first.stream_url, first.mime_type);
    /// }
    /// # Ok::<(), pmosubsonic::SubsonicError>(())
    /// # }).unwrap();
    /// ```
    pub async fn resolve(
        &self,
        media_type: &str,
        media_id: &str,
        shuffle: bool,
    ) -> Result<Vec<TrackDescriptor>> {
        let Ok(kind) = media_type.parse::<MediaType>() else {
            debug!("Nothing to resolve for media type '{}'", media_type);
            return Ok(Vec::new());
        };

        self.resolve_media(kind, media_id, shuffle).await
    }

    /// Variante typée de [`SubsonicClient::resolve`]
    pub async fn resolve_media(
        &self,
        media_type: MediaType,
        media_id: &str,
        shuffle: bool,
    ) -> Result<Vec<TrackDescriptor>> {
        let mut songs = self.fetch_songs(media_type, media_id).await?;

        debug!(
            "Resolved {} {} into {} track(s)",
            media_type,
            media_id,
            songs.len()
        );

        if songs.is_empty() {
            return Ok(Vec::new());
        }

        if shuffle {
            songs.shuffle(&mut rand::rng());
        }

        Ok(songs
            .into_iter()
            .map(|song| self.describe(song))
            .collect())
    }

    /// Ajoute URL de streaming et type MIME à une piste
    fn describe(&self, song: Song) -> TrackDescriptor {
        let stream_url = song.id.as_deref().map(|id| self.stream_url(id));
        let mime_type = infer_mime_type(&song);
        TrackDescriptor {
            song,
            stream_url,
            mime_type,
        }
    }

    async fn fetch_songs(&self, media_type: MediaType, media_id: &str) -> Result<Vec<Song>> {
        match media_type {
            MediaType::Album => Ok(self.get_album(media_id).await?.songs),
            MediaType::Playlist => Ok(self.get_playlist(media_id).await?.songs),
            MediaType::Track => Ok(self.get_song(media_id).await?.into_iter().collect()),
            MediaType::Genre => self.get_songs_by_genre(media_id).await,
            MediaType::Artist => self.fetch_artist_songs(media_id).await,
        }
    }

    /// Pistes de tous les albums d'un artiste
    ///
    /// Un appel pour l'artiste puis un par album. `buffered` rend les albums
    /// dans l'ordre du serveur quelle que soit la largeur du fan-out.
    async fn fetch_artist_songs(&self, artist_id: &str) -> Result<Vec<Song>> {
        let artist = self.get_artist(artist_id).await?;
        let album_ids: Vec<String> = artist.albums.into_iter().filter_map(|a| a.id).collect();

        debug!(
            "Artist {} has {} album(s), fetching with concurrency {}",
            artist_id,
            album_ids.len(),
            self.album_concurrency()
        );

        let albums: Vec<_> = stream::iter(album_ids.iter())
            .map(|id| self.get_album(id))
            .buffered(self.album_concurrency())
            .try_collect()
            .await?;

        Ok(albums.into_iter().flat_map(|album| album.songs).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(content_type: Option<&str>, suffix: Option<&str>) -> Song {
        Song {
            id: Some("1".to_string()),
            content_type: content_type.map(str::to_string),
            suffix: suffix.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!("album".parse::<MediaType>(), Ok(MediaType::Album));
        assert_eq!("ALBUM".parse::<MediaType>(), Ok(MediaType::Album));
        assert_eq!("Playlist".parse::<MediaType>(), Ok(MediaType::Playlist));
        assert_eq!("song".parse::<MediaType>(), Ok(MediaType::Track));
        assert_eq!("track".parse::<MediaType>(), Ok(MediaType::Track));
        assert_eq!("songs_by_genre".parse::<MediaType>(), Ok(MediaType::Genre));
        assert_eq!("Artist".parse::<MediaType>(), Ok(MediaType::Artist));
        assert!("podcast".parse::<MediaType>().is_err());
        assert!("".parse::<MediaType>().is_err());
        assert!(" album ".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_mime_prefers_content_type() {
        assert_eq!(infer_mime_type(&song(Some("audio/ogg"), Some("flac"))), "audio/ogg");
    }

    #[test]
    fn test_mime_from_suffix() {
        assert_eq!(infer_mime_type(&song(None, Some("flac"))), "audio/flac");
        assert_eq!(infer_mime_type(&song(None, Some("FLAC"))), "audio/flac");
        assert_eq!(infer_mime_type(&song(None, Some("mp3"))), "audio/mpeg");
        assert_eq!(infer_mime_type(&song(None, Some("mpeg"))), "audio/mpeg");
        assert_eq!(infer_mime_type(&song(None, Some("m4a"))), "audio/mp4");
        assert_eq!(infer_mime_type(&song(None, Some("mp4"))), "audio/mp4");
    }

    #[test]
    fn test_mime_fallback() {
        assert_eq!(infer_mime_type(&song(None, Some("opus"))), FALLBACK_MIME_TYPE);
        assert_eq!(infer_mime_type(&song(None, None)), FALLBACK_MIME_TYPE);
        assert_eq!(infer_mime_type(&song(Some(""), None)), FALLBACK_MIME_TYPE);
    }
}
