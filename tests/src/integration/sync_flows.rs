//! # Sync Engine Flows
//!
//! ## Flows Tested:
//!
//! 1. **Seed then transfers**: a re-transferred token keeps one record
//! 2. **Distinct tokens**: records appear in first-seen order
//! 3. **Unreachable ledger**: bootstrap backs off while transfers are buffered,
//!    even when the backlog exceeds the engine's mailbox
//! 4. **Supply failures**: skip keeps going, halt stops the engine
//! 5. **Contract address**: first writer wins
//! 6. **Log poller**: ledger logs reach the snapshot through the bus

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use nft_sync::{
        FetchFailurePolicy, LogPoller, MockLedger, PollerConfig, SyncConfig, SyncError,
        TokenSyncApi, TokenSyncService,
    };
    use proptest::prelude::*;
    use shared_bus::{EventPublisher, InMemoryEventBus};
    use shared_types::{
        Address, LedgerError, LedgerEvent, RawLedgerEvent, RawReturnValues, TokenId, TxHash, U256,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const A: Address = Address([0xa; 20]);
    const B: Address = Address([0xb; 20]);
    const C: Address = Address([0xc; 20]);

    fn transfer(id: u64, from: Address, to: Address, hash: u8) -> LedgerEvent {
        LedgerEvent::Transfer {
            address: None,
            transaction_hash: TxHash([hash; 32]),
            from,
            to,
            token_id: TokenId::from(id),
        }
    }

    fn approval() -> LedgerEvent {
        LedgerEvent::Other {
            name: "Approval".to_string(),
            address: None,
        }
    }

    fn raw_transfer(id: u64, to: u8) -> RawLedgerEvent {
        RawLedgerEvent {
            event: "Transfer".to_string(),
            address: None,
            transaction_hash: Some(format!("0x{:064x}", id)),
            return_values: Some(RawReturnValues {
                from: Some(format!("0x{:040x}", 0)),
                to: Some(format!("0x{:040x}", to)),
                token_id: Some(id.to_string()),
            }),
        }
    }

    fn unreachable() -> LedgerError {
        LedgerError::Unreachable("connection refused".to_string())
    }

    // =============================================================================
    // FLOW 1-2: SEED AND TRANSFERS
    // =============================================================================

    #[tokio::test]
    async fn test_retransferred_token_keeps_latest_movement() {
        let ledger = Arc::new(MockLedger::default().with_supply_script(vec![Ok(1), Ok(1)]));
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        bus.publish(transfer(1, A, B, 1)).await;
        bus.publish(transfer(1, B, C, 2)).await;
        drop(bus);
        engine.run().await.unwrap();

        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.token_name.as_deref(), Some("AragonNFT"));
        assert_eq!(snapshot.token_symbol.as_deref(), Some("ANFT"));
        assert_eq!(snapshot.total_supply, U256::from(1));
        assert_eq!(snapshot.transactions.len(), 1);

        let record = &snapshot.transactions[0];
        assert_eq!(record.id, TokenId::from(1));
        assert_eq!(record.from, B);
        assert_eq!(record.to, C);
        assert_eq!(record.transaction_hash, TxHash([2; 32]));
    }

    #[tokio::test]
    async fn test_distinct_tokens_in_first_seen_order() {
        let ledger = Arc::new(MockLedger::default().with_supply_script(vec![Ok(1), Ok(2)]));
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        bus.publish(transfer(1, A, B, 1)).await;
        bus.publish(approval()).await;
        bus.publish(transfer(2, A, C, 2)).await;
        drop(bus);
        let stats = engine.run().await.unwrap();

        // Seed + three events, one of them an identity reduction
        assert_eq!(stats.events_received, 3);
        assert_eq!(stats.reductions, 4);

        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.total_supply, U256::from(2));
        let ids: Vec<_> = snapshot.transactions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![TokenId::from(1), TokenId::from(2)]);
    }

    #[tokio::test]
    async fn test_every_publication_is_whole() {
        let ledger = Arc::new(MockLedger::default().with_supply_script(vec![Ok(1), Ok(2)]));
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);
        let mut watcher = service.watch();

        bus.publish(transfer(1, A, B, 1)).await;
        bus.publish(transfer(2, A, C, 2)).await;
        drop(bus);
        let handle = tokio::spawn(engine.run());

        // Every snapshot a watcher can observe is seeded and self-consistent
        let last = watcher
            .wait_for(|s| {
                assert!(s.is_seeded());
                s.transactions.len() == 2
            })
            .await
            .unwrap();
        assert_eq!(last.total_supply, U256::from(2));

        handle.await.unwrap().unwrap();
        assert_eq!(service.publications(), 3);
    }

    // =============================================================================
    // FLOW 3: BOOTSTRAP AGAINST AN UNREACHABLE LEDGER
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_backs_off_and_buffers_transfers() {
        let ledger = Arc::new(MockLedger::default().failing_name(2));
        ledger.set_supply(1);
        let bus = InMemoryEventBus::new();
        let (service, engine) =
            TokenSyncService::new(SyncConfig::default(), Arc::clone(&ledger), &bus);

        bus.publish(transfer(1, A, B, 1)).await;
        drop(bus);

        let started = tokio::time::Instant::now();
        engine.run().await.unwrap();

        // 1000ms then 5000ms under the default policy
        assert_eq!(started.elapsed(), Duration::from_millis(6000));

        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.token_name.as_deref(), Some("AragonNFT"));
        assert_eq!(snapshot.transactions.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backlog_beyond_mailbox_during_bootstrap_is_fully_reduced() {
        let ledger = Arc::new(MockLedger::default().failing_name(2));
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::default(), ledger, &bus);
        let handle = engine.spawn();

        // More mints than one mailbox holds, published while the engine backs off
        for id in 1..=1200u64 {
            bus.publish(transfer(id, Address::ZERO, B, id as u8)).await;
        }
        drop(bus);

        let stats = handle.await.unwrap().unwrap();
        assert_eq!(stats.events_received, 1200);

        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.transactions.len(), 1200);
        assert_eq!(snapshot.transactions[0].id, TokenId::from(1));
        assert_eq!(snapshot.transactions[1199].id, TokenId::from(1200));
    }

    #[tokio::test]
    async fn test_bootstrap_gives_up_at_attempt_cap() {
        let ledger = Arc::new(MockLedger::default().failing_name(u32::MAX));
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, SyncError::RetryExhausted { .. }));
        assert!(service.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_missing_symbol_still_seeds() {
        let ledger = Arc::new(MockLedger::default().without_symbol());
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);
        drop(bus);

        engine.run().await.unwrap();
        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.token_name.as_deref(), Some("AragonNFT"));
        assert_eq!(snapshot.token_symbol, None);
    }

    // =============================================================================
    // FLOW 4: SUPPLY FAILURES
    // =============================================================================

    #[tokio::test]
    async fn test_skip_policy_drops_failed_transfer_only() {
        let ledger = Arc::new(
            MockLedger::default().with_supply_script(vec![Err(unreachable()), Ok(1)]),
        );
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        bus.publish(transfer(1, A, B, 1)).await;
        bus.publish(transfer(2, A, C, 2)).await;
        drop(bus);
        let stats = engine.run().await.unwrap();

        assert_eq!(stats.reductions_failed, 1);
        let snapshot = service.snapshot().unwrap();
        let ids: Vec<_> = snapshot.transactions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![TokenId::from(2)]);
    }

    #[tokio::test]
    async fn test_halt_policy_stops_engine() {
        let ledger = Arc::new(MockLedger::default().with_supply_script(vec![Err(unreachable())]));
        let bus = InMemoryEventBus::new();
        let config = SyncConfig {
            on_fetch_failure: FetchFailurePolicy::Halt,
            ..SyncConfig::for_testing()
        };
        let (service, engine) = TokenSyncService::new(config, ledger, &bus);

        bus.publish(transfer(1, A, B, 1)).await;
        bus.publish(transfer(2, A, C, 2)).await;
        drop(bus);

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, SyncError::Fetch { .. }));

        // Only the seed made it out
        let snapshot = service.snapshot().unwrap();
        assert!(snapshot.transactions.is_empty());
        assert_eq!(service.publications(), 1);
    }

    // =============================================================================
    // FLOW 5: CONTRACT ADDRESS
    // =============================================================================

    #[tokio::test]
    async fn test_event_address_never_overrides_contract() {
        let contract = Address([0x42; 20]);
        let ledger = Arc::new(MockLedger::default().with_address(contract));
        ledger.set_supply(1);
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        bus.publish(LedgerEvent::Transfer {
            address: Some(Address([0x99; 20])),
            transaction_hash: TxHash([1; 32]),
            from: A,
            to: B,
            token_id: TokenId::from(1),
        })
        .await;
        drop(bus);
        engine.run().await.unwrap();

        assert_eq!(service.snapshot().unwrap().proxy_address, Some(contract));
    }

    #[tokio::test]
    async fn test_first_event_address_captured_without_contract() {
        let ledger = Arc::new(MockLedger::default());
        ledger.set_supply(1);
        let bus = InMemoryEventBus::new();
        let (service, engine) = TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);

        bus.publish(LedgerEvent::Other {
            name: "Approval".to_string(),
            address: Some(Address([0x11; 20])),
        })
        .await;
        bus.publish(LedgerEvent::Other {
            name: "Approval".to_string(),
            address: Some(Address([0x22; 20])),
        })
        .await;
        drop(bus);
        engine.run().await.unwrap();

        assert_eq!(
            service.snapshot().unwrap().proxy_address,
            Some(Address([0x11; 20]))
        );
    }

    // =============================================================================
    // FLOW 6: LEDGER LOGS THROUGH THE POLLER
    // =============================================================================

    #[tokio::test]
    async fn test_poller_feeds_engine() {
        let ledger = Arc::new(MockLedger::default());
        ledger.set_supply(2);
        ledger.push_log(3, raw_transfer(1, 0xaa));
        ledger.push_log(9, raw_transfer(2, 0xbb));

        let bus = Arc::new(InMemoryEventBus::new());
        let (service, engine) =
            TokenSyncService::new(SyncConfig::for_testing(), Arc::clone(&ledger), bus.as_ref());

        let mut poller =
            LogPoller::new(Arc::clone(&ledger), Arc::clone(&bus), PollerConfig::default());
        assert_eq!(poller.poll_once().await.unwrap(), 2);
        drop(poller);
        drop(bus);

        engine.run().await.unwrap();
        let snapshot = service.snapshot().unwrap();
        assert_eq!(snapshot.transactions.len(), 2);
        assert_eq!(snapshot.transactions[1].id, TokenId::from(2));
        assert_eq!(snapshot.transactions[1].to.0[19], 0xbb);
        assert!(snapshot.transactions[0].is_mint());
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_one_record_per_token(ids in proptest::collection::vec(0u64..8, 0..24)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let snapshot = runtime.block_on(async {
                let ledger = Arc::new(MockLedger::default());
                let bus = InMemoryEventBus::new();
                let (service, engine) =
                    TokenSyncService::new(SyncConfig::for_testing(), ledger, &bus);
                for (i, id) in ids.iter().enumerate() {
                    bus.publish(transfer(*id, A, B, i as u8)).await;
                }
                drop(bus);
                engine.run().await.unwrap();
                service.snapshot().unwrap()
            });

            let mut expected: Vec<u64> = Vec::new();
            for id in &ids {
                if !expected.contains(id) {
                    expected.push(*id);
                }
            }
            let actual: Vec<TokenId> = snapshot.transactions.iter().map(|r| r.id).collect();
            let expected: Vec<TokenId> = expected.into_iter().map(TokenId::from).collect();
            prop_assert_eq!(actual, expected);

            // Latest hash wins for every id
            for record in &snapshot.transactions {
                let last = ids.iter().rposition(|id| TokenId::from(*id) == record.id).unwrap();
                prop_assert_eq!(record.transaction_hash, TxHash([last as u8; 32]));
            }
        }
    }
}
