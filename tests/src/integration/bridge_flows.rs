//! # Bridge Coordinator Flows
//!
//! Transfer lifecycle through the inbound port, and restart recovery of
//! both transfer maps over the file-backed record store.
//!
//! ## Flows Tested
//!
//! 1. **Missing on source**: rejected, nothing recorded
//! 2. **Status walk**: pending → processing → completed
//! 3. **Failure**: failed transfers stay resolvable with their error
//! 4. **Restart**: a new coordinator over the same data directory resolves
//!    earlier transfers

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use node_runtime::{ChainEndpoint, FileBackedRecordStore, SimulatedLedger};
    use sc_03_bridge::{
        BridgeApi, BridgeConfig, BridgeCoordinator, TransferInitiation, TransferStatus,
    };
    use shared_bus::InMemoryEventBus;
    use shared_types::{ChainId, LedgerGateway, MockLedgerGateway, RecordStore};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn eth() -> ChainId {
        ChainId::new("ethereum")
    }

    fn polygon() -> ChainId {
        ChainId::new("polygon")
    }

    fn coordinator(ledger: Arc<dyn LedgerGateway>, store: Arc<dyn RecordStore>) -> BridgeCoordinator {
        BridgeCoordinator::new(
            BridgeConfig::for_testing(),
            ledger,
            store,
            Arc::new(InMemoryEventBus::new()),
        )
    }

    fn open_store(dir: &Path) -> Arc<dyn RecordStore> {
        Arc::new(FileBackedRecordStore::open(dir).unwrap())
    }

    // =============================================================================
    // LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_missing_on_source_is_rejected() {
        let ledger = Arc::new(MockLedgerGateway::new());
        let bridge = coordinator(ledger, Arc::new(shared_types::InMemoryRecordStore::new()));

        let result = bridge.initiate_transfer("S1", &eth(), &polygon()).await;

        assert_eq!(
            result,
            TransferInitiation {
                success: false,
                transfer_id: None,
                error: Some("Shipment S1 not found on ethereum".to_string()),
            }
        );
        assert!(bridge.get_transfer_status("0123456789abcdef").is_none());
        assert!(bridge.transfers_for_shipment("S1").is_empty());
    }

    #[tokio::test]
    async fn test_transfer_walks_pending_processing_completed() {
        let ledger = Arc::new(MockLedgerGateway::new());
        ledger.preregister(&eth(), "S1", "d1");
        ledger.close_gate();
        let bridge = coordinator(ledger.clone(), Arc::new(shared_types::InMemoryRecordStore::new()));

        let result = bridge.initiate_transfer("S1", &eth(), &polygon()).await;
        assert!(result.success);
        let id = result.transfer_id.unwrap();

        let mut seen = vec![bridge.get_transfer_status(&id).unwrap().status];
        while bridge.get_transfer_status(&id).unwrap().status != TransferStatus::Processing {
            tokio::task::yield_now().await;
        }
        seen.push(TransferStatus::Processing);
        ledger.open_gate();

        let done = bridge.wait_for_transfer(&id).await.unwrap();
        seen.push(done.status);

        assert_eq!(
            seen,
            vec![
                TransferStatus::Pending,
                TransferStatus::Processing,
                TransferStatus::Completed
            ]
        );
        assert!(done.target_tx_hash.is_some());
        assert_eq!(
            bridge.get_transfer_status(&id).unwrap().status,
            TransferStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_failed_transfer_keeps_error() {
        let ledger = Arc::new(MockLedgerGateway::new());
        ledger.preregister(&eth(), "S1", "d1");
        ledger.fail_chain(&polygon());
        let bridge = coordinator(ledger, Arc::new(shared_types::InMemoryRecordStore::new()));

        let id = bridge
            .try_initiate_transfer("S1", &eth(), &polygon())
            .await
            .unwrap();
        let failed = bridge.wait_for_transfer(&id).await.unwrap();

        assert_eq!(failed.status, TransferStatus::Failed);
        assert!(!failed.error.as_deref().unwrap_or_default().is_empty());
        assert!(failed.completed_at.is_some());
        assert_eq!(bridge.metrics().failed, 1);
    }

    #[test]
    fn test_only_forward_edges_are_legal() {
        use TransferStatus::*;
        let all = [Pending, Processing, Completed, Failed];
        let legal = [(Pending, Processing), (Processing, Completed), (Processing, Failed)];

        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    legal.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    // =============================================================================
    // RESTART RECOVERY
    // =============================================================================

    #[tokio::test]
    async fn test_transfers_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut hyperledger = ChainEndpoint::new("hyperledger", "");
        hyperledger.enabled = false;
        let chains = [
            ChainEndpoint::new("ethereum", ""),
            ChainEndpoint::new("polygon", ""),
            hyperledger,
        ];
        let ledger: Arc<dyn LedgerGateway> = Arc::new(SimulatedLedger::new(&chains));
        let mut config = BridgeConfig::for_testing();
        config.chains.insert(ChainId::new("hyperledger"));

        for id in ["S1", "S2"] {
            assert!(ledger.register_shipment(id, "d", &eth()).await.success);
        }

        let (completed, failed) = {
            let store = open_store(dir.path());
            let bridge = BridgeCoordinator::new(
                config.clone(),
                ledger.clone(),
                store,
                Arc::new(InMemoryEventBus::new()),
            );
            let completed = bridge
                .try_initiate_transfer("S1", &eth(), &polygon())
                .await
                .unwrap();
            let failed = bridge
                .try_initiate_transfer("S2", &eth(), &ChainId::new("hyperledger"))
                .await
                .unwrap();
            bridge.wait_for_transfer(&completed).await;
            bridge.wait_for_transfer(&failed).await;
            bridge.shutdown();
            (completed, failed)
        };

        let bridge = BridgeCoordinator::new(
            config,
            ledger,
            open_store(dir.path()),
            Arc::new(InMemoryEventBus::new()),
        );
        assert!(bridge.get_transfer_status(&completed).is_none());

        let recovered = bridge.recover().unwrap();
        assert_eq!((recovered.pending, recovered.confirmed), (1, 1));

        let done = bridge.get_transfer_status(&completed).unwrap();
        assert_eq!(done.status, TransferStatus::Completed);
        assert!(done.source_tx_hash.is_some());
        let lost = bridge.get_transfer_status(&failed).unwrap();
        assert_eq!(lost.status, TransferStatus::Failed);
        assert_eq!(lost.error.as_deref(), Some("Chain hyperledger is not available"));
    }
}
