pub mod error;
pub mod value;

pub use error::{DriverError, Result};
pub use value::Value;
