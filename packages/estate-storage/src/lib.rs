pub mod db;
pub mod features;
pub mod models;
pub mod notes;
pub mod outbox;
pub mod properties;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
