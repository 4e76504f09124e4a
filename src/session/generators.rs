use async_trait::async_trait;

/// Trait for generating session usernames
#[async_trait]
pub trait UsernameGenerator: Send + Sync {
    async fn generate(&self) -> String;
}

/// Pet name-based username generator, e.g. "clever-badger"
#[derive(Default)]
pub struct PetNameUsernameGenerator;

impl PetNameUsernameGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UsernameGenerator for PetNameUsernameGenerator {
    async fn generate(&self) -> String {
        petname::Petnames::default().generate_one(2, "-")
    }
}

/// Always hands out the same name; useful where tests need a known author
pub struct FixedUsernameGenerator(pub String);

#[async_trait]
impl UsernameGenerator for FixedUsernameGenerator {
    async fn generate(&self) -> String {
        self.0.clone()
    }
}
