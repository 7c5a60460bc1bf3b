//! Application Layer
//!
//! Use cases, shared services and the ports they depend on. Nothing here
//! knows about HTTP, YAML or environment variables.

pub mod ports;
pub mod services;
pub mod use_cases;
