pub mod models;
pub mod split;
pub mod store;

mod error;

pub use error::Error;
pub use models::{JoinedScheme, SchemeDetail, SchemeId, SchemeMaster};
pub use store::SchemeStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;
