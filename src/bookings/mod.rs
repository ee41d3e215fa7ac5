pub mod access_token;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod policy_store;
pub mod repository;
pub mod service;

pub use access_token::*;
pub use error::*;
pub use handlers::*;
pub use lifecycle::*;
pub use models::*;
pub use policy_store::*;
pub use repository::*;
pub use service::*;
