pub mod processing_task;
pub mod telemetry_task;
pub mod tick_task;
