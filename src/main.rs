use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};
use std::path::Path;
mod config;
mod db;
mod env_setup;
mod errors;
mod formatters;
mod handlers;
mod models;
mod params;
mod render;
mod tables;
#[cfg(test)]
mod test_utils;
use config::Config;
use db::Database;
use render::PageRenderer;

/// This is where the app starts.
///
/// It sets up everything: .env, logger, database schema, page templates,
/// and finally, the web server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Create a default .env file if needed, then load it.
    let created_env = env_setup::setup_env(Path::new("."))?;
    dotenv().ok();
    env_logger::init();
    if created_env {
        info!("[Env] Created .env file with default configurations.");
    }
    let config = Config::from_env();

    // Set up the database. The app won't start if this fails.
    if let Err(e) = db::initialize_database(&config.database_path) {
        error!("Failed to start database: {}", e);
        return Err(std::io::Error::other("Database initialization failed"));
    }
    info!("[Main] Database is ready at {}.", config.database_path.display());

    // Templates are parsed once here and shared with every worker.
    let renderer = match PageRenderer::from_dir(&config.template_dir) {
        Ok(renderer) => renderer,
        Err(e) => {
            error!("Failed to load templates: {}", e);
            return Err(std::io::Error::other("Template loading failed"));
        }
    };
    info!("[Main] Templates loaded from {}.", config.template_dir.display());

    let database = web::Data::new(Database::new(&config.database_path));
    let renderer = web::Data::new(renderer);

    info!("Starting server on http://{}:{}", config.server_host, config.server_port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(database.clone())
            .app_data(renderer.clone())
            .configure(handlers::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
