//! Structures de données pour représenter les objets Subsonic
//!
//! Chaque entité est construite depuis la carte d'attributs d'un élément
//! décodé (voir [`crate::decode`]). Un attribut absent ou illisible donne
//! `None`, une liste d'enfants absente donne un vecteur vide : le décodage
//! d'une entité n'échoue jamais.

use crate::decode::{Attributes, Document, Element};
use serde::{Deserialize, Serialize};

fn text(attrs: &Attributes, key: &str) -> Option<String> {
    attrs
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number<T: std::str::FromStr>(attrs: &Attributes, key: &str) -> Option<T> {
    attrs.get(key).and_then(|v| v.trim().parse().ok())
}

fn flag(attrs: &Attributes, key: &str) -> Option<bool> {
    match attrs.get(key).map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "true" => Some(true),
        Some(v) if v == "false" => Some(false),
        _ => None,
    }
}

fn children<'a>(element: Option<&'a Element>, name: &'a str) -> impl Iterator<Item = &'a Element> {
    element
        .into_iter()
        .flat_map(move |e| e.children.iter().filter(move |c| c.name == name))
}

/// Représente une piste (`song` ou `entry` de playlist)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Identifiant unique de la piste
    pub id: Option<String>,
    /// Titre de la piste
    pub title: Option<String>,
    /// Titre de l'album
    pub album: Option<String>,
    /// Nom de l'artiste
    pub artist: Option<String>,
    pub album_id: Option<String>,
    pub artist_id: Option<String>,
    /// Numéro de piste
    pub track: Option<u32>,
    /// Numéro de disque
    pub disc_number: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    /// Identifiant de la pochette (pour `getCoverArt`)
    pub cover_art: Option<String>,
    /// Durée en secondes
    pub duration: Option<u32>,
    /// Débit en kbps
    pub bit_rate: Option<u32>,
    /// Taille du fichier en octets
    pub size: Option<u64>,
    /// Type MIME déclaré par le serveur
    pub content_type: Option<String>,
    /// Extension du fichier (flac, mp3...)
    pub suffix: Option<String>,
    pub path: Option<String>,
}

impl Song {
    /// Construit une piste depuis ses attributs
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            id: text(attrs, "id"),
            title: text(attrs, "title"),
            album: text(attrs, "album"),
            artist: text(attrs, "artist"),
            album_id: text(attrs, "albumId"),
            artist_id: text(attrs, "artistId"),
            track: number(attrs, "track"),
            disc_number: number(attrs, "discNumber"),
            year: number(attrs, "year"),
            genre: text(attrs, "genre"),
            cover_art: text(attrs, "coverArt"),
            duration: number(attrs, "duration"),
            bit_rate: number(attrs, "bitRate"),
            size: number(attrs, "size"),
            content_type: text(attrs, "contentType"),
            suffix: text(attrs, "suffix"),
            path: text(attrs, "path"),
        }
    }
}

/// Représente un album Subsonic (ID3)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Option<String>,
    /// Titre de l'album
    pub name: Option<String>,
    /// Artiste principal
    pub artist: Option<String>,
    pub artist_id: Option<String>,
    pub cover_art: Option<String>,
    /// Nombre de pistes déclaré par le serveur
    pub song_count: Option<u32>,
    /// Durée totale en secondes
    pub duration: Option<u32>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    /// Pistes de l'album (vide dans les listes et dans `getArtist`)
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Album {
    /// Construit un album depuis ses attributs, sans pistes
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            id: text(attrs, "id"),
            name: text(attrs, "name").or_else(|| text(attrs, "title")),
            artist: text(attrs, "artist"),
            artist_id: text(attrs, "artistId"),
            cover_art: text(attrs, "coverArt"),
            song_count: number(attrs, "songCount"),
            duration: number(attrs, "duration"),
            year: number(attrs, "year"),
            genre: text(attrs, "genre"),
            songs: Vec::new(),
        }
    }

    /// Décode la réponse de `getAlbum` (album + éléments `song`)
    pub fn from_document(doc: &Document) -> Self {
        let element = doc.element("album");
        let mut album = element
            .map(|e| Self::from_attributes(&e.attributes))
            .unwrap_or_default();
        album.songs = children(element, "song")
            .map(|e| Song::from_attributes(&e.attributes))
            .collect();
        album
    }
}

/// Représente une playlist Subsonic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    /// Propriétaire de la playlist
    pub owner: Option<String>,
    pub public: Option<bool>,
    pub song_count: Option<u32>,
    pub duration: Option<u32>,
    pub cover_art: Option<String>,
    /// Pistes de la playlist (éléments `entry`)
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Construit une playlist depuis ses attributs, sans pistes
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            id: text(attrs, "id"),
            name: text(attrs, "name"),
            comment: text(attrs, "comment"),
            owner: text(attrs, "owner"),
            public: flag(attrs, "public"),
            song_count: number(attrs, "songCount"),
            duration: number(attrs, "duration"),
            cover_art: text(attrs, "coverArt"),
            songs: Vec::new(),
        }
    }

    /// Décode la réponse de `getPlaylist` (playlist + éléments `entry`)
    pub fn from_document(doc: &Document) -> Self {
        let element = doc.element("playlist");
        let mut playlist = element
            .map(|e| Self::from_attributes(&e.attributes))
            .unwrap_or_default();
        playlist.songs = children(element, "entry")
            .map(|e| Song::from_attributes(&e.attributes))
            .collect();
        playlist
    }
}

/// Représente un artiste Subsonic (ID3)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: Option<String>,
    pub name: Option<String>,
    pub cover_art: Option<String>,
    pub album_count: Option<u32>,
    /// Albums de l'artiste, dans l'ordre du serveur, sans pistes
    #[serde(default)]
    pub albums: Vec<Album>,
}

impl Artist {
    /// Construit un artiste depuis ses attributs, sans albums
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            id: text(attrs, "id"),
            name: text(attrs, "name"),
            cover_art: text(attrs, "coverArt"),
            album_count: number(attrs, "albumCount"),
            albums: Vec::new(),
        }
    }

    /// Décode la réponse de `getArtist` (artiste + éléments `album`)
    pub fn from_document(doc: &Document) -> Self {
        let element = doc.element("artist");
        let mut artist = element
            .map(|e| Self::from_attributes(&e.attributes))
            .unwrap_or_default();
        artist.albums = children(element, "album")
            .map(|e| Album::from_attributes(&e.attributes))
            .collect();
        artist
    }
}

/// Représente un genre musical
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    /// Nom du genre (texte de l'élément)
    pub name: String,
    pub song_count: Option<u32>,
    pub album_count: Option<u32>,
}

impl Genre {
    /// Construit un genre depuis un élément `genre`
    pub fn from_element(element: &Element) -> Self {
        Self {
            name: element.text.trim().to_string(),
            song_count: number(&element.attributes, "songCount"),
            album_count: number(&element.attributes, "albumCount"),
        }
    }
}

/// Représente une station de radio internet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioStation {
    pub id: Option<String>,
    pub name: Option<String>,
    /// URL du flux de la station
    pub stream_url: Option<String>,
    pub home_page_url: Option<String>,
}

impl RadioStation {
    /// Construit une station depuis ses attributs
    pub fn from_attributes(attrs: &Attributes) -> Self {
        Self {
            id: text(attrs, "id"),
            name: text(attrs, "name"),
            stream_url: text(attrs, "streamUrl"),
            home_page_url: text(attrs, "homePageUrl"),
        }
    }
}

/// Piste prête à être jouée : la piste, son URL de streaming signée et son type MIME
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    #[serde(flatten)]
    pub song: Song,
    /// URL signée (absente si la piste n'a pas d'identifiant)
    pub stream_url: Option<String>,
    /// Type MIME déclaré ou deviné (`"music"` à défaut)
    pub mime_type: String,
}

impl TrackDescriptor {
    /// Identifiant de la piste
    pub fn id(&self) -> Option<&str> {
        self.song.id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_song_from_attributes() {
        let song = Song::from_attributes(&attrs(&[
            ("id", "S1"),
            ("title", "So What"),
            ("track", "1"),
            ("duration", "545"),
            ("contentType", "audio/flac"),
            ("suffix", "flac"),
            ("albumId", "AL1"),
        ]));

        assert_eq!(song.id.as_deref(), Some("S1"));
        assert_eq!(song.track, Some(1));
        assert_eq!(song.duration, Some(545));
        assert_eq!(song.album_id.as_deref(), Some("AL1"));
        assert_eq!(song.content_type.as_deref(), Some("audio/flac"));
    }

    #[test]
    fn test_malformed_attributes_degrade_to_none() {
        let song = Song::from_attributes(&attrs(&[("id", ""), ("track", "one"), ("year", "")]));
        assert!(song.id.is_none());
        assert!(song.track.is_none());
        assert!(song.year.is_none());
    }

    #[test]
    fn test_album_from_document() {
        let doc = Document::from_xml(
            r#"<subsonic-response status="ok">
                <album id="AL1" name="Blue" songCount="2" year="1971">
                    <song id="S1"/><song id="S2"/>
                </album>
            </subsonic-response>"#,
        )
        .unwrap();

        let album = Album::from_document(&doc);
        assert_eq!(album.name.as_deref(), Some("Blue"));
        assert_eq!(album.year, Some(1971));
        assert_eq!(album.songs.len(), 2);
    }

    #[test]
    fn test_album_without_songs() {
        let doc = Document::from_xml(
            r#"<subsonic-response status="ok"><album id="missing-id"/></subsonic-response>"#,
        )
        .unwrap();
        assert!(Album::from_document(&doc).songs.is_empty());
    }

    #[test]
    fn test_missing_album_element() {
        let doc = Document::from_xml(r#"<subsonic-response status="ok"/>"#).unwrap();
        let album = Album::from_document(&doc);
        assert_eq!(album, Album::default());
    }

    #[test]
    fn test_playlist_entries() {
        let doc = Document::from_xml(
            r#"<subsonic-response status="ok">
                <playlist id="P1" name="Road trip" public="true" songCount="3">
                    <entry id="S3"/><entry id="S1"/><entry id="S2"/>
                </playlist>
            </subsonic-response>"#,
        )
        .unwrap();

        let playlist = Playlist::from_document(&doc);
        assert_eq!(playlist.public, Some(true));
        let ids: Vec<_> = playlist.songs.iter().filter_map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["S3", "S1", "S2"]);
    }

    #[test]
    fn test_artist_albums() {
        let doc = Document::from_xml(
            r#"<subsonic-response status="ok">
                <artist id="A1" name="Miles Davis" albumCount="2">
                    <album id="AL1" name="Kind of Blue"/>
                    <album id="AL2" name="Bitches Brew"/>
                </artist>
            </subsonic-response>"#,
        )
        .unwrap();

        let artist = Artist::from_document(&doc);
        assert_eq!(artist.album_count, Some(2));
        assert_eq!(artist.albums.len(), 2);
        assert_eq!(artist.albums[1].id.as_deref(), Some("AL2"));
        assert!(artist.albums[0].songs.is_empty());
    }

    #[test]
    fn test_genre_from_element() {
        let doc = Document::from_xml(
            r#"<subsonic-response status="ok"><genres>
                <genre songCount="12" albumCount="2">Jazz</genre>
            </genres></subsonic-response>"#,
        )
        .unwrap();

        let genre = Genre::from_element(doc.element("genre").unwrap());
        assert_eq!(genre.name, "Jazz");
        assert_eq!(genre.song_count, Some(12));
    }
}
