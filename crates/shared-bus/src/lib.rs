//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Carries [`SyncEvent`]s between the write batcher, the bridge
//! coordinator and the runtime.
//!
//! ## Choreography Pattern
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ sc-03 Bridge │                    │ node-runtime │
//! │              │    publish()       │  relocation  │
//! │              │ ──────┐            │   watcher    │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! `TransferCompleted` is the only event that drives behavior; the rest
//! exist so write and transfer outcomes are observable.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SyncEvent, BRIDGE_SUBSYSTEM, WRITE_BATCHER_SUBSYSTEM};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
