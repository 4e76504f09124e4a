use axum::Router;
use std::sync::Arc;

use music_rooms::{
    article::repository::InMemoryArticleRepository,
    build_router,
    product::repository::InMemoryProductRepository,
    room::repository::InMemoryRoomRepository,
    session::{
        generators::{FixedUsernameGenerator, PetNameUsernameGenerator, UsernameGenerator},
        repository::InMemorySessionRepository,
        service::SessionService,
        token::TokenConfig,
    },
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub products: Arc<InMemoryProductRepository>,
    pub articles: Arc<InMemoryArticleRepository>,
}

pub struct TestSetupBuilder {
    username: Option<String>,
    expiration_days: i64,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            username: None,
            expiration_days: 7,
        }
    }

    /// Every session created by this setup gets the same username
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    pub fn build(self) -> TestSetup {
        let rooms = Arc::new(InMemoryRoomRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let products = Arc::new(InMemoryProductRepository::new());
        let articles = Arc::new(InMemoryArticleRepository::new());

        let username_generator: Arc<dyn UsernameGenerator> = match self.username {
            Some(name) => Arc::new(FixedUsernameGenerator(name)),
            None => Arc::new(PetNameUsernameGenerator::new()),
        };
        let session_service = Arc::new(SessionService::with_username_generator(
            sessions.clone(),
            TokenConfig::new("integration-secret", self.expiration_days),
            username_generator,
        ));

        let state = AppState::new(
            session_service,
            rooms.clone(),
            products.clone(),
            articles.clone(),
        );

        TestSetup {
            app: build_router(state.clone()),
            state,
            rooms,
            sessions,
            products,
            articles,
        }
    }
}
