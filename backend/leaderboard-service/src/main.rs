use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_service::db::{create_pool, run_migrations, PgLeaderboardStore};
use leaderboard_service::services::{resync, LeaderboardService};
use leaderboard_service::{handlers, metrics, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Starting leaderboard-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Create database connection pool
    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    // Run migrations in non-production unless explicitly skipped
    let run_migrations_env = std::env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".into());
    if !config.is_production() && run_migrations_env != "false" {
        tracing::info!("Running database migrations...");
        match run_migrations(&db_pool).await {
            Ok(_) => tracing::info!("Database migrations completed"),
            Err(e) => tracing::warn!("Skipping migrations due to error: {:#}", e),
        }
    } else {
        tracing::info!(
            "Skipping database migrations (RUN_MIGRATIONS={})",
            run_migrations_env
        );
    }

    // Build the coordinator around its injected store and cache structures
    let store = Arc::new(PgLeaderboardStore::new(db_pool.clone()));
    let service = Arc::new(LeaderboardService::new(
        store,
        config.leaderboard.cache_capacity,
    ));
    tracing::info!(
        "Leaderboard coordinator initialized (cache bound: {})",
        config.leaderboard.cache_capacity
    );

    // Warm the cache from the store; an empty cache is still correct
    resync::run_startup_resync(&service).await;

    // Background: periodic resync job (disabled when interval is 0)
    let resync_handle = resync::spawn_periodic_resync(
        service.clone(),
        config.leaderboard.resync_interval_secs,
    );

    let server_config = config.clone();
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        // Build CORS configuration from allowed_origins
        let mut cors = Cors::default();
        for origin in server_config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .max_age(server_config.cors.max_age as usize);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(service.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // Prometheus metrics endpoint
            .route(
                "/metrics",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/plain; version=0.0.4")
                        .body(metrics::gather_metrics())
                }),
            )
            .service(
                web::scope("/api/v1")
                    .route("/health", web::get().to(handlers::health_check))
                    .route("/health/live", web::get().to(handlers::liveness_check))
                    .service(
                        web::scope("/leaderboard")
                            .route("/users", web::post().to(handlers::create_user))
                            .route(
                                "/users/{id}/score",
                                web::put().to(handlers::update_score),
                            )
                            .route("/users/{id}/rank", web::get().to(handlers::get_rank))
                            .route("/top", web::get().to(handlers::get_top)),
                    )
                    .route("/admin/resync", web::post().to(handlers::resync)),
            )
    })
    .bind(&bind_address)?
    .run();

    let result = server.await;

    tracing::info!("Server shutting down. Stopping background jobs...");
    if let Some(handle) = resync_handle {
        handle.abort();
    }
    tracing::info!("Server shutdown complete.");

    result
}
