//! # Algorithms Module
//!
//! Write routing.

pub mod routing;

pub use routing::route_write;
