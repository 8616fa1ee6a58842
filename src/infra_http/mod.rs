mod http_token_refresher;

pub use http_token_refresher::*;
