pub mod health;
pub mod tts;
pub mod voices;

pub use health::health;
pub use tts::synthesize_speech;
pub use voices::list_voices;
