pub mod article;
pub mod error;
pub mod http;
pub mod recent;

pub use error::RestError;
