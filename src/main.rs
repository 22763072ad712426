extern crate log;
pub mod geofile;
pub mod html;
pub mod map;
pub mod server;
pub mod session;
use crate::server::SharedSession;
use crate::session::editor::EditorSession;
use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::{fs::read_to_string, path::Path};

/// Browser based editor for vector geodata.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the input config file. Without one the built-in defaults
    /// apply.
    #[arg(short, long)]
    config_filepath: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct Config {
    bind_addr: SocketAddr,
    default_geofile_path: PathBuf,
    data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            default_geofile_path: PathBuf::from("./data/nyc_roads.geojson"),
            data_dir: PathBuf::from("."),
        }
    }
}

fn read_config(args: &Args) -> anyhow::Result<Config> {
    let config_filepath = match &args.config_filepath {
        Some(config_filepath) => config_filepath,
        None => return Ok(Config::default()),
    };
    if !Path::new(config_filepath).exists() {
        return Err(anyhow!("Config file {} not found", config_filepath));
    }
    let config_contents = read_to_string(config_filepath)?;
    Ok(serde_yaml::from_str(&config_contents)?)
}

async fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config = read_config(&args)?;
    log::info!(
        "Editing sessions start from {:?}, exports land in {:?}",
        config.default_geofile_path,
        config.data_dir
    );

    let bind_addr = config.bind_addr;
    let session: SharedSession = Arc::new(Mutex::new(EditorSession::new(
        config.default_geofile_path,
        config.data_dir,
    )));
    server::serve(bind_addr, session).await
}

#[tokio::main]
async fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main().await {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("bind_addr: 0.0.0.0:9999\n").unwrap();

        assert_eq!(
            "0.0.0.0:9999".parse::<std::net::SocketAddr>().unwrap(),
            config.bind_addr
        );
        assert_eq!(
            std::path::PathBuf::from("./data/nyc_roads.geojson"),
            config.default_geofile_path
        );
        assert_eq!(std::path::PathBuf::from("."), config.data_dir);
    }
}
