pub mod api;
pub mod error;
pub mod types;

pub use api::{ClientConfig, DeconzApi};
pub use error::{ApiError, ApiResult};
pub use types::*;
