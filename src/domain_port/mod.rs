// store

mod token_store;

pub use token_store::*;

// remote

mod token_refresher;

pub use token_refresher::*;
