pub mod cache;
pub mod closed;
pub mod config;
pub mod cycle;
pub mod feed;
pub mod model;
pub mod rotation;
pub mod slides;
pub mod tasks {
    pub mod console;
    pub mod refresh;
}
