use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use zonemap::script::{SessionScript, replay};
use zonemap::{Coordinate, NominatimGeocoder, ReverseGeocoder, ZoneMapConfig};

const USAGE: &str = "Usage:
  zonemap <session.json>         Replay a recorded editor session
  zonemap reverse <lat> <lng>    Reverse geocode one coordinate";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = ZoneMapConfig::load();
    let geocoder = NominatimGeocoder::new(&config).context("Failed to set up the geocoder")?;

    match args.as_slice() {
        [command, lat, lng] if command == "reverse" => {
            let at = parse_coordinate(lat, lng)?;
            let fields = geocoder
                .reverse_geocode(at)
                .await
                .with_context(|| format!("Reverse geocoding {}, {} failed", at.lat, at.lng))?;
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
        [path] if path != "-h" && path != "--help" => {
            let script = SessionScript::from_path(Path::new(path))?;
            for event in replay(&script, config, Arc::new(geocoder)).await? {
                println!("{}", event.to_json());
            }
        }
        _ => {
            println!("{USAGE}");
        }
    }
    Ok(())
}

fn parse_coordinate(lat: &str, lng: &str) -> Result<Coordinate> {
    let at = Coordinate::new(
        lat.parse().with_context(|| format!("Invalid latitude {lat:?}"))?,
        lng.parse().with_context(|| format!("Invalid longitude {lng:?}"))?,
    );
    if !at.is_valid() {
        bail!("Coordinate {}, {} is out of range", at.lat, at.lng);
    }
    Ok(at)
}
