//! Parcourt la bibliothèque d'un serveur Subsonic
//!
//! Cet exemple montre comment :
//! - Créer un client depuis la configuration pmoconfig
//! - Lister albums, playlists, artistes, genres et radios
//! - Récupérer le détail d'un album

use pmosubsonic::SubsonicClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    println!("=== PMOSubsonic - Bibliothèque ===\n");

    let client = SubsonicClient::from_config()?;

    let albums = client.list_albums().await?;
    println!("--- {} album(s) ---", albums.len());
    for album in albums.iter().take(10) {
        println!(
            "  {} - {} ({})",
            album.artist.as_deref().unwrap_or("?"),
            album.name.as_deref().unwrap_or("?"),
            album.year.map(|y| y.to_string()).unwrap_or_default()
        );
    }

    if let Some(id) = albums.first().and_then(|a| a.id.as_deref()) {
        let album = client.get_album(id).await?;
        println!("\n--- Détail de {:?} ---", album.name);
        for song in &album.songs {
            println!(
                "  {:>2}. {}",
                song.track.unwrap_or_default(),
                song.title.as_deref().unwrap_or("?")
            );
        }
        if let Some(cover) = &album.cover_art {
            println!("  Pochette : {}", client.cover_art_url(cover));
        }
    }

    let playlists = client.list_playlists().await?;
    println!("\n--- {} playlist(s) ---", playlists.len());
    for playlist in &playlists {
        println!(
            "  {} ({} pistes)",
            playlist.name.as_deref().unwrap_or("?"),
            playlist.song_count.unwrap_or_default()
        );
    }

    let artists = client.list_artists().await?;
    println!("\n--- {} artiste(s) ---", artists.len());

    let genres = client.list_genres().await?;
    println!("\n--- {} genre(s) ---", genres.len());
    for genre in genres.iter().take(10) {
        println!("  {} ({} pistes)", genre.name, genre.song_count.unwrap_or_default());
    }

    let stations = client.list_radio_stations().await?;
    println!("\n--- {} radio(s) ---", stations.len());
    for station in &stations {
        println!(
            "  {} : {}",
            station.name.as_deref().unwrap_or("?"),
            station.stream_url.as_deref().unwrap_or("?")
        );
    }

    client.close();
    Ok(())
}

/// Installe le logging : `RUST_LOG` s'il est défini, sinon `host.logger` de pmoconfig
fn init_logging() -> anyhow::Result<()> {
    let config = pmoconfig::get_config();
    if !config.get_log_enable_console()? {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(config.get_log_min_level()?.to_lowercase()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
