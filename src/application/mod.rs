// Application layer - Use cases over the analytics engine
pub mod analytics_service;
pub mod data_source;
pub mod streaming_service;
