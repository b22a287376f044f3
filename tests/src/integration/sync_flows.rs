//! # Shard Assignment + Write Batcher Flows
//!
//! Routing, synchronous writes and the deferred flush, exercised through
//! the batcher's inbound port with the mock ledger gateway.
//!
//! ## Flows Tested
//!
//! 1. **Shard (1) → Batcher (2)**: locally owned shards write directly
//! 2. **Deferred mode**: records turn recorded only after a flush tick
//! 3. **Settle-all flush**: FIFO per shipment, failures isolated
//! 4. **Remote shards**: held for the bridge or dropped loudly

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::sync::watch;

    use sc_01_shard_assignment::{ShardAssigner, ShardConfig, ShardError, ShardingApi};
    use sc_02_write_batcher::{BatcherConfig, LedgerOutcome, ShipmentSyncApi, WriteBatcher};
    use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, SyncEvent};
    use shared_types::{
        ChainId, GatewayCall, InMemoryRecordStore, MockLedgerGateway, NewEvent, NewShipment,
    };

    use crate::integration::id_in_shard;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        batcher: Arc<WriteBatcher>,
        ledger: Arc<MockLedgerGateway>,
        bus: Arc<InMemoryEventBus>,
    }

    fn harness(config: BatcherConfig, sharding: ShardConfig) -> Harness {
        let ledger = Arc::new(MockLedgerGateway::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let batcher = Arc::new(WriteBatcher::new(
            config,
            Arc::new(ShardAssigner::new(sharding).unwrap()),
            ledger.clone(),
            Arc::new(InMemoryRecordStore::new()),
            bus.clone(),
        ));
        Harness {
            batcher,
            ledger,
            bus,
        }
    }

    fn deferred() -> BatcherConfig {
        BatcherConfig {
            write_interval_ms: 5_000,
            ..BatcherConfig::default()
        }
    }

    fn event_calls(ledger: &MockLedgerGateway) -> Vec<String> {
        ledger
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::RecordEvent { event_type, .. } => Some(event_type),
                _ => None,
            })
            .collect()
    }

    // =============================================================================
    // SHARD ASSIGNMENT → ROUTING
    // =============================================================================

    #[tokio::test]
    async fn test_owned_shard_writes_directly() {
        let assigner = ShardAssigner::new(ShardConfig::single_node("node-a", 16)).unwrap();
        let shard = assigner.shard_of("abc123").unwrap();
        assert_eq!(assigner.shard_of("abc123").unwrap(), shard);
        assert!(shard < 16);
        assert!(assigner.is_locally_responsible(shard));

        let h = harness(
            BatcherConfig::for_testing(),
            ShardConfig::single_node("node-a", 16),
        );
        h.batcher
            .create_shipment(NewShipment::with_id("abc123", json!({})), true)
            .await
            .unwrap();
        let receipt = h
            .batcher
            .record_event("abc123", NewEvent::new("pickup"), true)
            .await
            .unwrap();

        assert!(receipt.ledger.is_recorded());
        assert!(receipt.record.blockchain_recorded);
        assert!(h
            .ledger
            .calls()
            .iter()
            .all(|call| *call.chain() == ChainId::new("ethereum")));
    }

    #[test]
    fn test_empty_identifier_has_no_shard() {
        let assigner = ShardAssigner::new(ShardConfig::default()).unwrap();
        assert!(matches!(
            assigner.shard_of(""),
            Err(ShardError::InvalidIdentifier(_))
        ));
    }

    // =============================================================================
    // SYNCHRONOUS MODE
    // =============================================================================

    #[tokio::test]
    async fn test_sync_recorded_iff_gateway_succeeded() {
        let h = harness(BatcherConfig::for_testing(), ShardConfig::default());
        h.ledger.fail_shipment("S2");

        let ok = h
            .batcher
            .create_shipment(NewShipment::with_id("S1", json!({"origin": "Lyon"})), true)
            .await
            .unwrap();
        let failed = h
            .batcher
            .create_shipment(NewShipment::with_id("S2", json!({})), true)
            .await
            .unwrap();

        assert!(h.batcher.get_shipment("S1").unwrap().unwrap().blockchain_recorded);
        assert!(ok.ledger.is_recorded());
        assert!(!h.batcher.get_shipment("S2").unwrap().unwrap().blockchain_recorded);
        assert!(matches!(failed.ledger, LedgerOutcome::Failed { .. }));
        assert_eq!(h.batcher.metrics().sync_failures, 1);
    }

    // =============================================================================
    // DEFERRED MODE
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_recorded_after_one_tick() {
        let h = harness(deferred(), ShardConfig::default());
        let (_tx, rx) = watch::channel(false);
        let _task = h.batcher.spawn_flush_task(rx).unwrap();
        h.ledger.push_tx_hash("0xabc");

        let receipt = h
            .batcher
            .create_shipment(NewShipment::with_id("S1", json!({})), true)
            .await
            .unwrap();
        assert!(!receipt.record.blockchain_recorded);
        assert_eq!(
            receipt.ledger,
            LedgerOutcome::Pending {
                chain: ChainId::new("ethereum")
            }
        );

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert!(!h.batcher.get_shipment("S1").unwrap().unwrap().blockchain_recorded);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let stored = h.batcher.get_shipment("S1").unwrap().unwrap();
        assert!(stored.blockchain_recorded);
        assert_eq!(stored.blockchain_tx_hash.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn test_back_to_back_events_flush_in_order() {
        let h = harness(deferred(), ShardConfig::default());
        h.ledger.fail_event_type("lost");
        h.batcher
            .create_shipment(NewShipment::with_id("S1", json!({})), true)
            .await
            .unwrap();
        let departed = h
            .batcher
            .record_event("S1", NewEvent::new("departed"), true)
            .await
            .unwrap();
        let lost = h
            .batcher
            .record_event("S1", NewEvent::new("lost"), true)
            .await
            .unwrap();

        let report = h.batcher.flush().await;

        assert_eq!(report.attempted, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(event_calls(&h.ledger), vec!["departed", "lost"]);
        assert!(h.batcher.get_event(&departed.record.id).unwrap().unwrap().blockchain_recorded);
        assert!(!h.batcher.get_event(&lost.record.id).unwrap().unwrap().blockchain_recorded);
        assert_eq!(h.batcher.pending_writes(), 0);
    }

    #[tokio::test]
    async fn test_failed_shipment_does_not_block_others() {
        let h = harness(deferred(), ShardConfig::default());
        h.ledger.fail_shipment("S1");
        for id in ["S1", "S2"] {
            h.batcher
                .create_shipment(NewShipment::with_id(id, json!({})), true)
                .await
                .unwrap();
        }

        let report = h.batcher.flush().await;

        assert_eq!((report.succeeded, report.failed), (1, 1));
        assert!(!h.batcher.get_shipment("S1").unwrap().unwrap().blockchain_recorded);
        assert!(h.batcher.get_shipment("S2").unwrap().unwrap().blockchain_recorded);
    }

    #[tokio::test]
    async fn test_concurrent_flushes_never_repeat_a_write() {
        let h = harness(deferred(), ShardConfig::default());
        for n in 0..20 {
            h.batcher
                .create_shipment(NewShipment::with_id(format!("S{n}"), json!({})), true)
                .await
                .unwrap();
        }

        let reports = futures::future::join_all((0..4).map(|_| h.batcher.flush())).await;

        assert_eq!(reports.iter().map(|r| r.attempted).sum::<usize>(), 20);
        assert_eq!(h.ledger.write_count(), 20);
    }

    #[tokio::test]
    async fn test_recorded_flag_survives_later_failure() {
        let h = harness(deferred(), ShardConfig::default());
        h.batcher
            .create_shipment(NewShipment::with_id("S1", json!({})), true)
            .await
            .unwrap();
        h.batcher.flush().await;

        h.ledger.fail_shipment("S1");
        h.batcher
            .record_event("S1", NewEvent::new("delayed"), true)
            .await
            .unwrap();
        h.batcher.flush().await;

        assert!(h.batcher.get_shipment("S1").unwrap().unwrap().blockchain_recorded);
    }

    #[tokio::test]
    async fn test_flush_publishes_settlements() {
        let h = harness(deferred(), ShardConfig::default());
        let mut sub = h.bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));
        h.batcher
            .create_shipment(NewShipment::with_id("S1", json!({})), true)
            .await
            .unwrap();

        h.batcher.flush().await;

        let settled = sub.recv().await.unwrap();
        assert!(matches!(
            settled,
            SyncEvent::LedgerWriteSettled { ref shipment_id, .. } if shipment_id == "S1"
        ));
        assert!(matches!(
            sub.recv().await.unwrap(),
            SyncEvent::FlushCompleted { attempted: 1, .. }
        ));
    }

    // =============================================================================
    // REMOTE SHARDS
    // =============================================================================

    #[tokio::test]
    async fn test_remote_shard_waits_for_bridge() {
        // node-a owns shards 0-1 of 4
        let remote = id_in_shard("R", 4, |shard| shard >= 2);
        let config = BatcherConfig {
            bridge_enabled: true,
            ..BatcherConfig::for_testing()
        };
        let h = harness(config, ShardConfig::for_testing());

        let receipt = h
            .batcher
            .create_shipment(NewShipment::with_id(remote.clone(), json!({})), true)
            .await
            .unwrap();

        assert_eq!(receipt.ledger, LedgerOutcome::AwaitingBridge);
        assert_eq!(h.ledger.write_count(), 0);
        assert_eq!(h.batcher.metrics().awaiting_bridge, 1);
    }

    #[tokio::test]
    async fn test_remote_shard_dropped_without_bridge() {
        let remote = id_in_shard("R", 4, |shard| shard >= 2);
        let h = harness(BatcherConfig::for_testing(), ShardConfig::for_testing());
        let mut sub = h.bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));

        let receipt = h
            .batcher
            .create_shipment(NewShipment::with_id(remote.clone(), json!({})), true)
            .await
            .unwrap();

        assert_eq!(receipt.ledger, LedgerOutcome::Dropped);
        assert_eq!(h.ledger.write_count(), 0);
        assert!(matches!(
            sub.recv().await.unwrap(),
            SyncEvent::WriteDropped { ref shipment_id, .. } if *shipment_id == remote
        ));
    }
}
