mod api_client_impl;
mod auth_service_impl;
mod favorite_service_impl;
mod refresh_gate;

pub use api_client_impl::*;
pub use auth_service_impl::*;
pub use favorite_service_impl::*;
pub use refresh_gate::*;
