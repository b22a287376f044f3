//! # Subsystem Wiring
//!
//! Choreography between subsystems. Subsystems only publish; the runtime
//! subscribes and calls the next subsystem's inbound port.
//!
//! | Event | From | Handler | Effect |
//! |-------|------|---------|--------|
//! | `TransferCompleted` | Bridge (3) | [`RelocationHandler`] | relocate + resubmit on Write Batcher (2) |
//! | `TransferFailed` | Bridge (3) | [`RelocationHandler`] | logged |

pub mod relocation;

pub use relocation::{relocate, Relocation, RelocationHandler};
