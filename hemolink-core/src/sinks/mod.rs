// src/sinks/mod.rs

pub mod mail;

pub use mail::{HttpMailSink, NullMailSink};
