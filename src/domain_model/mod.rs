mod credentials;
mod envelope;
mod favorite;
mod user;

pub use credentials::*;
pub use envelope::*;
pub use favorite::*;
pub use user::*;
