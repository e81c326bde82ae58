pub mod entity;
pub mod error;
pub mod port;
pub mod service;

pub use entity::*;
pub use error::DomainError;
pub use port::*;
pub use service::*;
