//! # Sync Events
//!
//! Defines all event types that flow through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, LedgerReceipt};

/// Subsystem id of the write batcher.
pub const WRITE_BATCHER_SUBSYSTEM: u8 = 2;

/// Subsystem id of the bridge coordinator.
pub const BRIDGE_SUBSYSTEM: u8 = 3;

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncEvent {
    // =========================================================================
    // SUBSYSTEM 2: WRITE BATCHER
    // =========================================================================
    /// A ledger write for a shipment or event settled (success or failure).
    LedgerWriteSettled {
        /// Owning shipment.
        shipment_id: String,
        /// Event id, `None` for the shipment registration itself.
        event_id: Option<String>,
        /// Chain the write addressed.
        chain: ChainId,
        /// Gateway result.
        receipt: LedgerReceipt,
    },

    /// A write was dropped: not locally responsible and bridging disabled.
    WriteDropped {
        /// Owning shipment.
        shipment_id: String,
        /// Event id, `None` for the shipment registration itself.
        event_id: Option<String>,
    },

    /// A flush cycle finished.
    FlushCompleted {
        /// Writes taken from the queue.
        attempted: usize,
        /// Writes that landed.
        succeeded: usize,
        /// Writes that failed.
        failed: usize,
    },

    // =========================================================================
    // SUBSYSTEM 3: BRIDGE
    // =========================================================================
    /// A transfer was accepted and scheduled.
    TransferInitiated {
        /// Transfer id.
        transfer_id: String,
        /// Shipment being relocated.
        shipment_id: String,
        /// Chain the shipment currently lives on.
        source_chain: ChainId,
        /// Chain the shipment moves to.
        target_chain: ChainId,
    },

    /// The shipment is registered on its target chain.
    /// **CHOREOGRAPHY:** the runtime relocates the shipment and resubmits
    /// its unrecorded writes.
    TransferCompleted {
        /// Transfer id.
        transfer_id: String,
        /// Shipment relocated.
        shipment_id: String,
        /// New canonical chain.
        target_chain: ChainId,
        /// Registration transaction on the target chain.
        target_tx_hash: Option<String>,
    },

    /// The transfer reached `failed`.
    TransferFailed {
        /// Transfer id.
        transfer_id: String,
        /// Shipment that stays on its source chain.
        shipment_id: String,
        /// Failure description.
        error: String,
    },
}

impl SyncEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::LedgerWriteSettled { .. }
            | Self::WriteDropped { .. }
            | Self::FlushCompleted { .. } => EventTopic::Ledger,
            Self::TransferInitiated { .. }
            | Self::TransferCompleted { .. }
            | Self::TransferFailed { .. } => EventTopic::Bridge,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self.topic() {
            EventTopic::Bridge => BRIDGE_SUBSYSTEM,
            _ => WRITE_BATCHER_SUBSYSTEM,
        }
    }

    /// Shipment the event concerns, if any.
    #[must_use]
    pub fn shipment_id(&self) -> Option<&str> {
        match self {
            Self::LedgerWriteSettled { shipment_id, .. }
            | Self::WriteDropped { shipment_id, .. }
            | Self::TransferInitiated { shipment_id, .. }
            | Self::TransferCompleted { shipment_id, .. }
            | Self::TransferFailed { shipment_id, .. } => Some(shipment_id),
            Self::FlushCompleted { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Ledger write outcomes (subsystem 2).
    Ledger,
    /// Transfer lifecycle (subsystem 3).
    Bridge,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SyncEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
