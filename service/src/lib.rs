//! Runtime settings and logging shared by the contacts tools.

pub mod config;
pub mod logging;
