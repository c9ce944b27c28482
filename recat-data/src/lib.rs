pub mod factory;
pub mod loader;
pub mod repository;

pub use factory::CsvRepositoryFactory;
pub use loader::{BracketLoader, FeeComponentLoader, LoadError, TaxpayerLoader};
pub use repository::{CsvPeriodRepository, OpenError};
