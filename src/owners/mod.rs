pub mod analytics;
pub mod dto;
pub mod handlers;
pub mod model;
pub mod service;

pub use handlers::router;
