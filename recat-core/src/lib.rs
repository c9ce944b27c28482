pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{PeriodRepository, RepositoryError};
pub use models::*;
