//! # Node Runtime Flows
//!
//! The assembled node: relocation choreography through the event bus,
//! configuration from the environment, and a restart over the same data
//! directory with the production adapters.
//!
//! ## Choreography Tested
//!
//! ```text
//! Bridge (3) ──TransferCompleted──→ Event Bus ──→ RelocationHandler
//!                                                   │
//!                                                   ▼
//!                                  Write Batcher (2): apply_relocation + resubmit
//! ```

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;

    use node_runtime::{NodeConfig, NodeRuntime, SubsystemContainer};
    use sc_01_shard_assignment::ShardConfig;
    use sc_02_write_batcher::{LedgerOutcome, ShipmentSyncApi};
    use sc_03_bridge::{BridgeApi, TransferStatus};
    use shared_types::{
        ChainId, GatewayCall, InMemoryRecordStore, MockLedgerGateway, NewEvent, NewShipment,
    };

    use crate::integration::{eventually, id_in_shard};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn eth() -> ChainId {
        ChainId::new("ethereum")
    }

    fn polygon() -> ChainId {
        ChainId::new("polygon")
    }

    fn config_from(vars: &[(&str, &str)]) -> NodeConfig {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        NodeConfig::from_lookup(|key| map.get(key).map(|v| v.to_string())).unwrap()
    }

    /// Sharded node `node-a` owning shards 0-1 of 4, bridge on, sync writes.
    fn sharded_bridge_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.sharding = ShardConfig::for_testing();
        config.batcher.write_interval_ms = 0;
        config.batcher.bridge_enabled = true;
        config.bridge.enabled = true;
        config.bridge.persist_interval_ms = 0;
        config
    }

    // =============================================================================
    // RELOCATION CHOREOGRAPHY
    // =============================================================================

    #[tokio::test]
    async fn test_completed_transfer_relocates_remote_shipment() {
        let remote = id_in_shard("R", 4, |shard| shard >= 2);
        let ledger = Arc::new(MockLedgerGateway::new());
        let container = SubsystemContainer::with_adapters(
            sharded_bridge_config(),
            ledger.clone(),
            Arc::new(InMemoryRecordStore::new()),
        )
        .unwrap();
        let runtime = NodeRuntime::with_container(container);
        runtime.start().await.unwrap();
        let c = runtime.container();

        let created = c
            .batcher
            .create_shipment(NewShipment::with_id(remote.clone(), json!({"to": "Oslo"})), true)
            .await
            .unwrap();
        let event = c
            .batcher
            .record_event(&remote, NewEvent::new("pickup").at("Lyon"), true)
            .await
            .unwrap();
        assert_eq!(created.ledger, LedgerOutcome::AwaitingBridge);
        assert_eq!(event.ledger, LedgerOutcome::AwaitingBridge);
        assert_eq!(ledger.write_count(), 0);

        // The owning node registered it on ethereum.
        ledger.preregister(&eth(), &remote, &created.record.metadata_digest());
        ledger.push_tx_hash("0xpolygon-registration");

        let initiation = c.bridge.initiate_transfer(&remote, &eth(), &polygon()).await;
        let transfer_id = initiation.transfer_id.unwrap();
        let done = c.bridge.wait_for_transfer(&transfer_id).await.unwrap();
        assert_eq!(done.status, TransferStatus::Completed);

        let batcher = c.batcher.clone();
        let id = remote.clone();
        assert!(
            eventually(|| {
                batcher
                    .get_event(&event.record.id)
                    .ok()
                    .flatten()
                    .is_some_and(|e| e.blockchain_recorded)
            })
            .await
        );

        let shipment = c.batcher.get_shipment(&id).unwrap().unwrap();
        assert_eq!(shipment.target_chain, Some(polygon()));
        assert!(shipment.blockchain_recorded);
        assert_eq!(
            shipment.blockchain_tx_hash.as_deref(),
            Some("0xpolygon-registration")
        );
        assert!(ledger.calls().iter().any(|call| matches!(
            call,
            GatewayCall::RecordEvent { chain, event_type, .. }
                if *chain == polygon() && event_type == "pickup"
        )));

        // Later writes go straight to the new chain.
        let later = c
            .batcher
            .record_event(&id, NewEvent::new("delivered"), true)
            .await
            .unwrap();
        assert!(later.ledger.is_recorded());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_transfer_leaves_shipment_waiting() {
        let remote = id_in_shard("R", 4, |shard| shard >= 2);
        let ledger = Arc::new(MockLedgerGateway::new());
        ledger.fail_chain(&polygon());
        let runtime = NodeRuntime::with_container(
            SubsystemContainer::with_adapters(
                sharded_bridge_config(),
                ledger.clone(),
                Arc::new(InMemoryRecordStore::new()),
            )
            .unwrap(),
        );
        runtime.start().await.unwrap();
        let c = runtime.container();

        c.batcher
            .create_shipment(NewShipment::with_id(remote.clone(), json!({})), true)
            .await
            .unwrap();
        ledger.preregister(&eth(), &remote, "d");

        let id = c
            .bridge
            .try_initiate_transfer(&remote, &eth(), &polygon())
            .await
            .unwrap();
        let failed = c.bridge.wait_for_transfer(&id).await.unwrap();
        assert_eq!(failed.status, TransferStatus::Failed);

        tokio::task::yield_now().await;
        let shipment = c.batcher.get_shipment(&remote).unwrap().unwrap();
        assert_eq!(shipment.target_chain, None);
        assert!(!shipment.blockchain_recorded);

        runtime.shutdown().await;
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[test]
    fn test_environment_drives_subsystems() {
        let config = config_from(&[
            ("SC_WRITE_INTERVAL_MS", "2500"),
            ("SC_PRIMARY_CHAIN", "Polygon"),
            ("SC_SHARDING_ENABLED", "1"),
            ("SC_SHARD_COUNT", "16"),
            ("SC_NODE_ID", "node-a"),
            ("SC_SHARD_OWNERS", "0-7=node-a,8-15=node-b"),
            ("SC_BRIDGE_ENABLED", "true"),
            ("SC_BRIDGE_VERIFICATION_THRESHOLD", "3"),
        ]);

        let container = SubsystemContainer::with_adapters(
            config,
            Arc::new(MockLedgerGateway::new()),
            Arc::new(InMemoryRecordStore::new()),
        )
        .unwrap();

        assert_eq!(container.config.batcher.primary_chain, polygon());
        assert_eq!(container.sharding.local_shards(), (0..8).collect::<Vec<_>>());
        assert!(container.bridge.is_chain_supported(&eth()));
        assert_eq!(container.bridge.config().verification_threshold, 3);
        assert!(container.config.batcher.bridge_enabled);
    }

    // =============================================================================
    // PRODUCTION ADAPTERS
    // =============================================================================

    #[tokio::test]
    async fn test_node_restart_over_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let vars = [
            ("SC_WRITE_INTERVAL_MS", "0"),
            ("SC_BRIDGE_ENABLED", "true"),
            ("SC_BRIDGE_PERSIST_INTERVAL_MS", "0"),
            ("SC_DATA_DIR", data_dir.as_str()),
        ];

        let transfer_id = {
            let runtime = NodeRuntime::new(config_from(&vars)).unwrap();
            runtime.start().await.unwrap();
            let c = runtime.container();

            let created = c
                .batcher
                .create_shipment(NewShipment::with_id("S1", json!({"weight": 12})), true)
                .await
                .unwrap();
            assert!(created.ledger.is_recorded());

            let id = c
                .bridge
                .try_initiate_transfer("S1", &eth(), &polygon())
                .await
                .unwrap();
            assert_eq!(
                c.bridge.wait_for_transfer(&id).await.unwrap().status,
                TransferStatus::Completed
            );

            let batcher = c.batcher.clone();
            assert!(
                eventually(|| {
                    batcher
                        .get_shipment("S1")
                        .ok()
                        .flatten()
                        .is_some_and(|s| s.target_chain == Some(polygon()))
                })
                .await
            );

            drop(batcher);
            drop(c);
            runtime.shutdown().await;
            id
        };

        let runtime = NodeRuntime::new(config_from(&vars)).unwrap();
        runtime.start().await.unwrap();
        let c = runtime.container();

        let transfer = c.bridge.get_transfer_status(&transfer_id).unwrap();
        assert_eq!(transfer.status, TransferStatus::Completed);
        let shipment = c.batcher.get_shipment("S1").unwrap().unwrap();
        assert_eq!(shipment.target_chain, Some(polygon()));
        assert!(shipment.blockchain_recorded);
        assert_eq!(c.batcher.shipment_events("S1").unwrap().len(), 0);

        runtime.shutdown().await;
    }
}
