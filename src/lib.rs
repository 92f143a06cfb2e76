pub mod config;
pub mod error;
pub mod router;
pub mod middleware;
pub mod handlers;
pub mod db;

pub use config::Config;
pub use db::Store;
pub use error::SqlitebotError;
