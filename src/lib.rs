// Trip segmentation and fleet analytics over device telemetry
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
