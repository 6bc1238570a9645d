// src/tasks/mod.rs

pub mod dispatch_worker;
pub mod expiry_sweep;

pub use dispatch_worker::spawn_dispatch_worker_task;
pub use expiry_sweep::spawn_expiry_sweep_task;
