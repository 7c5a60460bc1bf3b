//! Domain Layer
//!
//! Pure types and rules with no I/O:
//!
//! - [`trade`]: path resolution, field mapping and canonical trades
//! - [`auth`]: bearer tokens and expiry rules
//! - [`broker`]: declarative broker descriptors and refresh templates

pub mod auth;
pub mod broker;
pub mod trade;
