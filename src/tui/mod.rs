pub mod app;
pub mod input;
pub mod render;

pub use app::{App, run};
