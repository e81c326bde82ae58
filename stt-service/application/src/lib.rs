pub mod dto;
pub mod error;
pub mod upload;
pub mod usecase;

pub use dto::*;
pub use error::*;
pub use upload::ScopedUpload;
pub use usecase::{ModelDescriptor, SttUseCase, SttUseCaseImpl};
