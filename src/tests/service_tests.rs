//! Read-through orchestration: sorting, paging, population and failure handling

#[cfg(test)]
mod tests {
    use crate::{
        blockchain::LedgerError,
        cache::{CacheKey, ManualClock, TtlCache},
        models::PaymentRecord,
        service::{paginate, sort_by_time_desc, PageOutcome, StakeError, StakeService},
        tests::{ascending_records, empty_wallet, record, wallet, FakeLedger, WALLET},
    };
    use alloy_primitives::{Address, U256};
    use futures::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;

    const TTL: Duration = Duration::from_secs(6 * 60);
    const TIMEOUT: Duration = Duration::from_secs(5);

    fn setup(ledger: FakeLedger) -> (StakeService, Arc<FakeLedger>, ManualClock) {
        let clock = ManualClock::new();
        let ledger = Arc::new(ledger);
        let cache = TtlCache::with_clock(100, Arc::new(clock.clone()));
        let service = StakeService::new(ledger.clone(), cache, TTL, TIMEOUT);
        (service, ledger, clock)
    }

    fn history_key(address: &Address) -> String {
        CacheKey::stake_history(&address.to_string()).to_string()
    }

    fn times(outcome: &PageOutcome) -> Vec<U256> {
        match outcome {
            PageOutcome::Success { records, .. } => records.iter().map(|r| r.time).collect(),
            other => panic!("expected a page, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let a = record(0xaa, 5);
        let b = record(0xbb, 10);
        let c = record(0xcc, 5);
        let mut records = vec![a.clone(), b.clone(), c.clone()];

        sort_by_time_desc(&mut records);

        assert_eq!(records, vec![b, a, c]);
    }

    #[test]
    fn test_sort_empty() {
        let mut records: Vec<PaymentRecord> = Vec::new();
        sort_by_time_desc(&mut records);
        assert!(records.is_empty());
    }

    #[test]
    fn test_pagination_windows() {
        let records = ascending_records(25);

        match paginate(&records, 2, 10) {
            PageOutcome::Success { records: page, total } => {
                assert_eq!(total, 25);
                assert_eq!(page, records[10..20].to_vec());
            }
            other => panic!("unexpected {:?}", other),
        }

        match paginate(&records, 3, 10) {
            PageOutcome::Success { records: page, .. } => {
                assert_eq!(page.len(), 5);
                assert_eq!(page, records[20..25].to_vec());
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(paginate(&records, 4, 10), PageOutcome::PageOutOfRange { total: 25 });
        assert_eq!(paginate(&records, usize::MAX, usize::MAX), PageOutcome::PageOutOfRange { total: 25 });
        assert_eq!(paginate(&[], 1, 10), PageOutcome::NoData);
    }

    #[tokio::test]
    async fn test_pages_are_most_recent_first() {
        let unordered = vec![record(1, 300), record(2, 900), record(3, 100), record(4, 600)];
        let (service, _, _) = setup(FakeLedger::new().with_history(wallet(), unordered));

        let outcome = service.get_page(&wallet(), 1, 3).await.unwrap();

        assert_eq!(times(&outcome), vec![U256::from(900u64), U256::from(600u64), U256::from(300u64)]);
    }

    #[tokio::test]
    async fn test_get_page_over_cached_sequence() {
        let (service, ledger, _) = setup(FakeLedger::new().with_history(wallet(), ascending_records(25)));

        let page2 = service.get_page(&wallet(), 2, 10).await.unwrap();
        let page3 = service.get_page(&wallet(), 3, 10).await.unwrap();
        let page4 = service.get_page(&wallet(), 4, 10).await.unwrap();

        // Sorted newest first: times 1024 down to 1000
        let expected2: Vec<U256> = (0..10).map(|i| U256::from(1_014u64 - i)).collect();
        let expected3: Vec<U256> = (0..5).map(|i| U256::from(1_004u64 - i)).collect();
        assert_eq!(times(&page2), expected2);
        assert_eq!(times(&page3), expected3);
        assert_eq!(page4, PageOutcome::PageOutOfRange { total: 25 });
        assert_eq!(ledger.history_calls(), 1, "pages after the first come from the cache");
    }

    #[tokio::test]
    async fn test_no_data_is_not_a_failure() {
        let (service, _, _) = setup(FakeLedger::new());

        let outcome = service.get_page(&empty_wallet(), 1, 10).await.unwrap();

        assert_eq!(outcome, PageOutcome::NoData);
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let (service, ledger, _) = setup(FakeLedger::new().with_history(wallet(), ascending_records(3)));

        assert!(matches!(
            service.get_page(&wallet(), 0, 10).await,
            Err(StakeError::InvalidParameter(_))
        ));
        assert!(matches!(
            service.get_page(&wallet(), 1, 0).await,
            Err(StakeError::InvalidParameter(_))
        ));
        assert_eq!(ledger.history_calls(), 0, "rejected before touching upstream");
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_populate_cache() {
        let ledger = FakeLedger::new().with_history(wallet(), ascending_records(3));
        ledger.set_failing(true);
        let (service, ledger, _) = setup(ledger);

        let result = service.get_page(&wallet(), 1, 10).await;
        assert!(matches!(result, Err(StakeError::Upstream(_))));
        assert_eq!(service.cache().get(&history_key(&wallet())).await, None);

        // Next request retries upstream instead of serving an empty entry
        ledger.set_failing(false);
        let outcome = service.get_page(&wallet(), 1, 10).await.unwrap();
        assert_eq!(times(&outcome).len(), 3);
        assert_eq!(ledger.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_repeat_requests_hit_upstream_once() {
        let (service, ledger, _) = setup(FakeLedger::new().with_history(wallet(), ascending_records(7)));

        let first = service.get_page(&wallet(), 1, 5).await.unwrap();
        let second = service.get_page(&wallet(), 1, 5).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(ledger.history_calls(), 1);
    }

    #[tokio::test]
    async fn test_address_case_shares_cache_entry() {
        let (service, ledger, _) = setup(FakeLedger::new().with_history(wallet(), ascending_records(2)));
        let upper: Address = WALLET.to_uppercase().replacen("0X", "0x", 1).parse().unwrap();

        service.get_page(&wallet(), 1, 5).await.unwrap();
        service.get_page(&upper, 1, 5).await.unwrap();

        assert_eq!(ledger.history_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let ledger = FakeLedger::new()
            .with_history(wallet(), ascending_records(12))
            .with_delay(Duration::from_millis(50));
        let (service, ledger, _) = setup(ledger);

        let address = wallet();
        let requests = (0..8).map(|_| service.get_page(&address, 1, 10));
        let outcomes = join_all(requests).await;

        assert_eq!(ledger.history_calls(), 1);
        let first = outcomes[0].as_ref().unwrap();
        assert!(outcomes.iter().all(|o| o.as_ref().unwrap() == first));
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let (service, ledger, clock) = setup(FakeLedger::new().with_history(wallet(), ascending_records(4)));

        service.get_page(&wallet(), 1, 10).await.unwrap();
        clock.advance(TTL - Duration::from_secs(1));
        service.get_page(&wallet(), 1, 10).await.unwrap();
        assert_eq!(ledger.history_calls(), 1);

        clock.advance(Duration::from_secs(1));
        service.get_page(&wallet(), 1, 10).await.unwrap();
        assert_eq!(ledger.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_upstream_timeout_is_not_cached() {
        let ledger = Arc::new(
            FakeLedger::new()
                .with_history(wallet(), ascending_records(2))
                .with_delay(Duration::from_millis(200)),
        );
        let cache = TtlCache::new(10);
        let service = StakeService::new(ledger.clone(), cache, TTL, Duration::from_millis(20));

        match service.get_page(&wallet(), 1, 10).await {
            Err(StakeError::Upstream(err)) => assert!(matches!(err.as_ref(), LedgerError::Timeout(_))),
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(service.cache().get(&history_key(&wallet())).await, None);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (service, ledger, _) = setup(FakeLedger::new().with_history(wallet(), ascending_records(2)));

        service.get_page(&wallet(), 1, 10).await.unwrap();
        service.invalidate(&wallet()).await;
        service.get_page(&wallet(), 1, 10).await.unwrap();

        assert_eq!(ledger.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_total_is_passed_through() {
        let (service, ledger, _) = setup(FakeLedger::new().with_total(wallet(), 1_000));

        assert_eq!(service.get_total(&wallet()).await.unwrap(), U256::from(1_000u64));
        assert_eq!(service.get_total(&wallet()).await.unwrap(), U256::from(1_000u64));
        assert_eq!(ledger.total_calls(), 2);

        ledger.set_failing(true);
        assert!(matches!(service.get_total(&wallet()).await, Err(StakeError::Upstream(_))));
    }
}
