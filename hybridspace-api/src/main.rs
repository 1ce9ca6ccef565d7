// hybridspace-api/src/main.rs

use clap::Parser;
use rocket::error;
use rocket::info;
use std::env;

#[derive(Parser)]
#[command(name = "hybridspace-api")]
#[command(about = "HybridSpace API server for desk and room booking")]
#[command(version)]
struct Cli {}

#[rocket::main]
async fn main() {
    let _cli = Cli::parse();

    // Pulls DATABASE_URL and friends from .env in development.
    dotenvy::dotenv().ok();

    match env::current_dir() {
        Ok(path) => info!("Current directory: {}", path.display()),
        Err(e) => error!("Error getting current directory: {}", e),
    };

    info!("HybridSpace API v{} starting", env!("CARGO_PKG_VERSION"));

    hybridspace_api::rocket()
        .launch()
        .await
        .expect("Rocket server failed to launch");
}
