//! # pmosubsonic - Client Subsonic/Navidrome
//!
//! Cette crate fournit un client Rust pour les serveurs compatibles Subsonic
//! (Navidrome, Airsonic, Gonic...) et une fine couche de services permettant à
//! une box domotique de lancer la lecture d'un média sur ses lecteurs.
//!
//! ## Vue d'ensemble
//!
//! `pmosubsonic` permet :
//! - de signer chaque requête (`t = md5(password + salt)`, sel aléatoire par requête)
//! - de décoder indifféremment les réponses XML ou JSON en un arbre d'éléments
//! - de naviguer dans la bibliothèque (albums, playlists, artistes, genres, radios)
//! - de résoudre une référence `(type, id)` en liste ordonnée de pistes jouables
//! - de jouer le résultat sur des lecteurs cibles via le trait [`MediaPlayer`]
//!
//! ## Structure des modules
//!
//! ```text
//! pmosubsonic/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client haut-niveau + builder
//! │   ├── resolver.rs         # Résolution de médias
//! │   ├── service.rs          # play_media et services dérivés
//! │   ├── models.rs           # Structures de données
//! │   ├── decode.rs           # Arbre d'éléments XML/JSON
//! │   ├── api/
//! │   │   ├── mod.rs          # Transport HTTP et session
//! │   │   ├── signing.rs      # Signature des requêtes
//! │   │   └── catalog.rs      # Endpoints de la bibliothèque
//! │   ├── config_ext.rs       # Intégration pmoconfig
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ### Résolution d'un album
//!
//! ```rust,no_run
//! use pmosubsonic::{ServerConfig, SubsonicClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::new("http://navidrome.local:4533", "alice", "secret");
//!     let client = SubsonicClient::new(config)?;
//!
//!     for track in client.resolve("album", "al-42", false).await? {
//!         println!("{:?} -> {:?}", track.song.title, track.stream_url);
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ### Configuration automatique
//!
//! ```rust,no_run
//! use pmosubsonic::SubsonicClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Lit accounts.subsonic dans la configuration pmoconfig
//!     let client = SubsonicClient::from_config()?;
//!     println!("ping: {}", client.ping().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Gestion des erreurs
//!
//! La crate utilise `thiserror` pour définir des erreurs typées. Les refus du
//! serveur (`status="failed"`) sont distingués des erreurs de transport :
//!
//! ```rust,ignore
//! use pmosubsonic::SubsonicError;
//!
//! match client.get_album("al-1").await {
//!     Ok(album) => println!("Album: {:?}", album.name),
//!     Err(e) if e.is_auth_error() => println!("Wrong credentials"),
//!     Err(e) if e.is_not_found() => println!("Album not found"),
//!     Err(SubsonicError::Timeout) => println!("Server too slow"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```
//!
//! ## Voir aussi
//!
//! - [`pmoconfig`] : Configuration

pub mod api;
pub mod client;
pub mod config_ext;
pub mod decode;
pub mod error;
pub mod models;
pub mod resolver;
pub mod service;

pub use api::{ServerConfig, SubsonicApi};
pub use client::{ClientBuilder, SubsonicClient};
pub use config_ext::SubsonicConfigExt;
pub use decode::{Document, Element, Payload};
pub use error::{Result, SubsonicError};
pub use models::{Album, Artist, Genre, Playlist, RadioStation, Song, TrackDescriptor};
pub use resolver::{MediaType, infer_mime_type};
pub use service::{
    MediaPlayer, PlayArtistRequest, PlayMediaRequest, PlayOutcome, RandomAlbumFilter,
    SubsonicService, ValidationError, validate_server,
};
