mod api_client;
mod auth_service;
mod favorite_service;

pub use api_client::*;
pub use auth_service::*;
pub use favorite_service::*;
