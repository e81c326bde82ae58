pub mod catalog;
pub mod client;

pub use catalog::FileVoiceCatalog;
pub use client::{RestRuntimeConfig, RestSynthesisClient};
