pub mod dto;
pub mod error;
pub mod usecase;
pub mod wav;

pub use dto::*;
pub use error::*;
pub use usecase::{ModelDescriptor, TtsUseCase, TtsUseCaseImpl};
pub use wav::encode_wav_pcm16;
