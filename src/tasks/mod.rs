//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a
//! session.
//!
//! # Tasks
//! - Cache sweep: removes expired and corrupt entries at configured intervals

mod sweep;

pub use sweep::spawn_sweep_task;
