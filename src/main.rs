mod api;
mod catalog;
mod collaborative;
mod config;
mod content;
mod dataset;
mod hybrid;
mod providers;
mod scoring;
mod similarity;

use actix_cors::Cors;
use actix_files as fs;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use config::Config;
use dataset::Dataset;
use opentelemetry_instrumentation_actix_web::{RequestMetrics, RequestTracing};
use tracing::level_filters::LevelFilter;

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../static/index.html"))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // initialize logfire with info level filter to exclude trace/debug spans
    let logfire = logfire::configure()
        .with_default_level_filter(LevelFilter::INFO)
        .finish()
        .map_err(|e| anyhow::anyhow!("failed to initialize logfire: {}", e))?;

    let _guard = logfire.shutdown_guard();

    let config = Config::from_env()?;
    let host = config.host.clone();
    let port = config.port;

    // loaded once; every worker shares the same immutable copy
    let dataset = web::Data::new(
        Dataset::load(&config.data_path)
            .await
            .with_context(|| format!("failed to load dataset from {}", config.data_path))?,
    );

    logfire::info!("starting game recommender",
        host = &host,
        port = port as i64,
        games = dataset.catalog.len() as i64,
        collaborative_games = dataset.collaborative.len() as i64
    );

    // rate limiter: 60 requests per minute per IP
    let governor_conf = GovernorConfigBuilder::default()
        .milliseconds_per_request(1000)
        .burst_size(20)
        .finish()
        .context("invalid rate limiter configuration")?;

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            // opentelemetry tracing and metrics FIRST
            .wrap(RequestTracing::new())
            .wrap(RequestMetrics::default())
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(config.clone()))
            .app_data(dataset.clone())
            .route("/", web::get().to(index))
            .service(
                web::scope("/api")
                    .wrap(Governor::new(&governor_conf))
                    .route("/recommendations", web::post().to(api::recommend))
                    .route("/recommendations", web::get().to(api::recommend_get))
                    .route("/games", web::get().to(api::list_games))
                    .route("/health", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
            )
            .service(fs::Files::new("/static", "./static"))
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
