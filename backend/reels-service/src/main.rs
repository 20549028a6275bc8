/// Reels Service - HTTP Server
///
/// Accounts, creator uploads, personalized feeds, comments, playlists,
/// and AI study-pack generation for the Studyreel platform.
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use reels_service::handlers;
use reels_service::middleware::AuthMiddleware;
use reels_service::providers::{OpenAiClient, PineconeClient};
use reels_service::security::jwt;
use reels_service::services::{FeedService, SummaryPipeline, VideoStore};
use reels_service::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");

    jwt::initialize(&config.auth.jwt_secret, config.auth.token_expiry_days)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("JWT init failed: {e}")))?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Reels Service starting HTTP server on {}", bind_address);

    // Database connection pool + embedded migrations
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {e}")))?;

    // Redis for the feed cache
    let redis_client = redis::Client::open(config.cache.redis_url.as_str())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Invalid REDIS_URL: {e}")))?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Redis unavailable: {e}")))?;

    // Local video store
    let video_store = VideoStore::new(&config.storage);
    video_store
        .ensure_root()
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Upload dir: {e}")))?;

    // AI providers; the vector store is optional until configured
    let openai = Arc::new(OpenAiClient::new(&config.openai));
    if !openai.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set; AI summary requests will fail");
    }
    let vector_store = PineconeClient::from_config(&config.vector_store);
    if vector_store.is_none() {
        tracing::warn!("Vector store not configured; AI summary requests will fail");
    }

    let feed_service = FeedService::new(db_pool.clone(), redis_conn, config.cache.feed_ttl_secs);
    let summary_pipeline = web::Data::new(SummaryPipeline::new(
        db_pool.clone(),
        openai,
        vector_store,
        &config.vector_store,
    ));

    let pool_data = web::Data::new(db_pool);
    let store_data = web::Data::new(video_store);
    let feed_data = web::Data::new(feed_service);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(store_data.clone())
            .app_data(feed_data.clone())
            .app_data(summary_pipeline.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .route("/api/health", web::get().to(handlers::health))
            .route(
                "/api/openapi.json",
                web::get().to(|| async {
                    use utoipa::OpenApi;
                    HttpResponse::Ok()
                        .content_type("application/json")
                        .json(reels_service::openapi::ApiDoc::openapi())
                }),
            )
            .route(
                "/uploads/{filename}",
                web::get().to(handlers::videos::serve_upload),
            )
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            .service(
                web::scope("/api/users")
                    .wrap(AuthMiddleware)
                    .route("/me", web::get().to(handlers::users::me))
                    .route("/playlists", web::get().to(handlers::users::my_playlists))
                    .route("/playlist", web::post().to(handlers::users::add_to_playlist))
                    .route(
                        "/{id}/follow",
                        web::post().to(handlers::users::toggle_follow),
                    ),
            )
            .service(
                web::scope("/api/videos")
                    .wrap(AuthMiddleware)
                    .route("/upload", web::post().to(handlers::videos::upload_video))
                    .route("/feed", web::get().to(handlers::videos::feed))
                    .route("/{id}", web::get().to(handlers::videos::get_video))
                    .route(
                        "/{id}/comment",
                        web::post().to(handlers::videos::add_comment),
                    ),
            )
            .service(
                web::scope("/api/ai").wrap(AuthMiddleware).route(
                    "/video/{id}/summary",
                    web::get().to(handlers::ai::video_summary),
                ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
