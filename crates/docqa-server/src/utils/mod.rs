pub mod error;
pub mod limiters;
pub mod logger;

pub use error::ApiError;
