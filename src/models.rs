//! Wire and session data shared by the client, the store and the router.

pub mod book;
pub mod credentials;
pub mod user;

pub use book::*;
pub use credentials::*;
pub use user::*;
