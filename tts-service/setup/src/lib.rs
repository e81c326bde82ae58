pub mod app;
pub mod loader;

pub use app::{build_and_run, Application};
pub use loader::{ModelLoader, RuntimeModelLoader};
