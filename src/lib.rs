// Watermarker Library

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod watermark;
