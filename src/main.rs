mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use service::{
    background_jobs::start_fund_release_job, badge_service::BadgeService,
    booking_service::BookingService, compliance_service::ComplianceService,
    dispute_service::DisputeService, earnings_service::EarningsService,
    notification_service::NotificationService, reliability_service::ReliabilityService,
    social_service::SocialService, wallet_service::WalletService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub notification_service: Arc<NotificationService>,
    pub wallet_service: Arc<WalletService>,
    pub compliance_service: Arc<ComplianceService>,
    pub booking_service: Arc<BookingService>,
    pub dispute_service: Arc<DisputeService>,
    pub reliability_service: Arc<ReliabilityService>,
    pub earnings_service: Arc<EarningsService>,
    pub badge_service: Arc<BadgeService>,
    pub social_service: Arc<SocialService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(
            db_client.clone(),
            config.push_webhook_url.clone(),
            config.push_webhook_token.clone(),
        ));
        let social_service = Arc::new(SocialService::new(
            db_client.clone(),
            config.social_webhook_url.clone(),
        ));
        let badge_service = Arc::new(BadgeService::new(
            db_client.clone(),
            notification_service.clone(),
            social_service.clone(),
        ));
        let compliance_service = Arc::new(ComplianceService::new(db_client.clone()));
        let wallet_service = Arc::new(WalletService::new(
            db_client.clone(),
            notification_service.clone(),
            config.dispute_window_hours,
        ));
        let booking_service = Arc::new(BookingService::new(
            db_client.clone(),
            compliance_service.clone(),
            notification_service.clone(),
            badge_service.clone(),
            config.platform_fee_bps,
        ));
        let dispute_service = Arc::new(DisputeService::new(
            db_client.clone(),
            notification_service.clone(),
            config.dispute_window_hours,
        ));

        Self {
            env: config,
            reliability_service: Arc::new(ReliabilityService::new(db_client.clone())),
            earnings_service: Arc::new(EarningsService::new(db_client.clone())),
            db_client,
            notification_service,
            wallet_service,
            compliance_service,
            booking_service,
            dispute_service,
            badge_service,
            social_service,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = Config::init()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    tracing::info!("Connection to the database is successful");

    let db_client = DBClient::new(pool);
    db_client.migrate().await.context("Failed to run migrations")?;

    let allowed_origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let port = config.port;
    let app_state = Arc::new(AppState::new(db_client, config));

    tokio::spawn(start_fund_release_job(app_state.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Server is running on http://localhost:{}", port);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
