use crate::application_impl::ApiClient;
use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use reqwest::Method;

pub struct RealFavoriteService {
    api: ApiClient,
}

impl RealFavoriteService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn item_path(target: &FavoriteTarget) -> Result<String, ClientError> {
        if target.target_id.is_empty() || target.target_id.contains('/') {
            return Err(ClientError::InvalidRequest(format!(
                "invalid favorite id: {:?}",
                target.target_id
            )));
        }
        Ok(format!(
            "/favorites/{}/{}",
            target.target_type.as_path_segment(),
            target.target_id
        ))
    }
}

#[async_trait::async_trait]
impl FavoriteService for RealFavoriteService {
    async fn list(&self) -> Result<Vec<Favorite>, ClientError> {
        self.api
            .request(Method::GET, "/favorites", None, RequestOptions::default())
            .await?
            .envelope()
    }

    async fn add(&self, target: &FavoriteTarget) -> Result<Favorite, ClientError> {
        let body =
            serde_json::to_value(target).map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        let favorite: Favorite = self
            .api
            .request(
                Method::POST,
                "/favorites",
                Some(body),
                RequestOptions::default(),
            )
            .await?
            .envelope()?;
        debug!(kind = %target.target_type, id = %target.target_id, "favorite added");
        Ok(favorite)
    }

    async fn remove(&self, target: &FavoriteTarget) -> Result<(), ClientError> {
        let path = Self::item_path(target)?;
        self.api
            .request(Method::DELETE, &path, None, RequestOptions::default())
            .await?
            .acknowledge()?;
        debug!(kind = %target.target_type, id = %target.target_id, "favorite removed");
        Ok(())
    }

    async fn toggle(
        &self,
        target: &FavoriteTarget,
        currently_favorite: bool,
    ) -> Result<bool, ClientError> {
        if currently_favorite {
            self.remove(target).await?;
            Ok(false)
        } else {
            self.add(target).await?;
            Ok(true)
        }
    }
}
