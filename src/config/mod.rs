pub mod app;

pub use app::{AppConfig, Backend, HfConfig};
