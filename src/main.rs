use std::path::PathBuf;

use clap::Parser;

use qrcard::{web, Error, Result, ServerConfig};

/// Serve the contact-card QR generator
#[derive(Parser, Debug)]
#[command(name = "qrcard", version, about)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:9000")]
    addr: String,

    /// Directory holding pages and static files; defaults to `assets/` next
    /// to the executable
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let assets_dir = match cli.assets.map(Ok).unwrap_or_else(default_assets_dir) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("qrcard: {}", e);
            std::process::exit(1);
        }
    };

    let config = ServerConfig {
        addr: cli.addr,
        assets_dir,
        ..Default::default()
    };

    if let Err(e) = web::serve(config) {
        eprintln!("qrcard: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the assets directory next to the running executable. Not being
/// able to locate the executable's own directory is fatal at startup.
fn default_assets_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::ConfigError(format!("cannot resolve executable path: {}", e)))?;
    let dir = exe
        .parent()
        .ok_or_else(|| Error::ConfigError("executable has no parent directory".to_string()))?;
    Ok(dir.join("assets"))
}
