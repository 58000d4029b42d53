use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use clap::{Arg, Command};
use leadform_api::config::{ApiConfig, CorsConfig};
use leadform_api::database::Database;
use leadform_api::error::AppResult;
use leadform_api::handlers::AppState;
use leadform_api::routes::configure_routes;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn build_cors(config: Option<&CorsConfig>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_DISPOSITION, header::RETRY_AFTER])
        .max_age(3600);

    match config {
        Some(config) => config
            .allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin)),
        None => cors,
    }
}

#[actix_web::main]
async fn main() -> AppResult<()> {
    let matches = Command::new("leadform-api")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Lead qualification questionnaire API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file")
                .value_name("FILE"),
        )
        .get_matches();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("leadform_api=info,leadform_core=info")),
        )
        .init();

    tracing::info!("Starting leadform API");

    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let (config, config_path) = ApiConfig::load(explicit.as_deref())?;
    tracing::info!("Loaded configuration from {}", config_path.display());

    let database = Database::new(&config.database.path)?;
    tracing::info!("Database initialized at {:?}", config.database.path);

    let app_state = web::Data::new(AppState::from_config(&config, &database)?);

    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting HTTP server on {}", server_addr);

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(cors_config.as_ref()))
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
