//! Résout une référence de média en liste de pistes jouables
//!
//! Usage :
//!
//! ```text
//! cargo run -p pmosubsonic --example resolve_media -- album al-42 [--shuffle]
//! ```
//!
//! Types reconnus : album, playlist, track/song, genre, artist.

use pmosubsonic::SubsonicClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (Some(media_type), Some(media_id)) = (args.first(), args.get(1)) else {
        eprintln!("Usage: resolve_media <type> <id> [--shuffle]");
        std::process::exit(2);
    };
    let shuffle = args.iter().any(|a| a == "--shuffle");

    let client = SubsonicClient::from_config()?;
    let tracks = client.resolve(media_type, media_id, shuffle).await?;

    println!("✓ {} piste(s) pour {} {}\n", tracks.len(), media_type, media_id);
    for (i, track) in tracks.iter().enumerate() {
        println!(
            "  {:>3}. {} - {} [{}]",
            i + 1,
            track.song.artist.as_deref().unwrap_or("?"),
            track.song.title.as_deref().unwrap_or("?"),
            track.mime_type
        );
        if let Some(url) = &track.stream_url {
            println!("       {}", url);
        }
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
