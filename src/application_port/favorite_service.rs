use crate::application_port::ClientError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait FavoriteService: Send + Sync {
    async fn list(&self) -> Result<Vec<Favorite>, ClientError>;
    async fn add(&self, target: &FavoriteTarget) -> Result<Favorite, ClientError>;
    async fn remove(&self, target: &FavoriteTarget) -> Result<(), ClientError>;
    async fn toggle(
        &self,
        target: &FavoriteTarget,
        currently_favorite: bool,
    ) -> Result<bool, ClientError>;
}
