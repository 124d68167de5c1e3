// Domain layer - Telemetry models and the trip analytics engine
pub mod finalizer;
pub mod fleet;
pub mod format;
pub mod fuel;
pub mod geodesy;
pub mod idle;
pub mod ingest;
pub mod report;
pub mod segmentation;
pub mod statistics;
pub mod telemetry;
pub mod trip;
