use music_rooms::{
    article::repository::{InMemoryArticleRepository, PostgresArticleRepository},
    build_router,
    product::repository::{InMemoryProductRepository, PostgresProductRepository},
    room::repository::{InMemoryRoomRepository, PostgresRoomRepository},
    session::{
        self,
        repository::{InMemorySessionRepository, PostgresSessionRepository},
        service::SessionService,
        token::TokenConfig,
    },
    AppConfig, AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "music_rooms=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting music rooms server");

    let config = AppConfig::from_env()?;
    let token_config = TokenConfig::new(config.jwt_secret.clone(), config.session_expiration_days);

    let app_state = match &config.database_url {
        Some(database_url) => {
            info!("Using PostgreSQL storage");
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            AppState::new(
                Arc::new(SessionService::new(
                    Arc::new(PostgresSessionRepository::new(pool.clone())),
                    token_config,
                )),
                Arc::new(PostgresRoomRepository::new(pool.clone())),
                Arc::new(PostgresProductRepository::new(pool.clone())),
                Arc::new(PostgresArticleRepository::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            AppState::new(
                Arc::new(SessionService::new(
                    Arc::new(InMemorySessionRepository::new()),
                    token_config,
                )),
                Arc::new(InMemoryRoomRepository::new()),
                Arc::new(InMemoryProductRepository::new()),
                Arc::new(InMemoryArticleRepository::new()),
            )
        }
    };

    tokio::spawn(session::start_cleanup_task(
        Arc::clone(&app_state.session_service),
        config.session_cleanup_interval,
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
