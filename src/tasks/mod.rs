//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache maintenance: fires the periodic `cache-maintenance` event at the configured interval

mod maintenance;

pub use maintenance::spawn_maintenance_task;
