pub mod app;

pub use app::{build_and_run, Application, ModelLoader};
