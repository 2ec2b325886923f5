//! Snapshot pagination end to end over the in-memory order store

mod common;

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

use common::{clock, order, store_with, t0};
use shared::error::ErrorCode;
use shared::models::OrderStatus;
use shop_server::pagination::{
    LimitOffsetPaginator, MemoryCache, PageNumber, PageRequest, QuerySignature, SnapshotCache,
    SnapshotPaginator, SnapshotStore,
};
use shop_server::store::{MemoryOrderStore, ORDERS_RESOURCE};
use shop_server::utils::ManualClock;

const TTL: Duration = Duration::from_secs(3600);

struct Fixture {
    store: Arc<MemoryOrderStore>,
    clock: Arc<ManualClock>,
    cache: Arc<MemoryCache>,
    pages: SnapshotPaginator<MemoryOrderStore>,
    windows: LimitOffsetPaginator<MemoryOrderStore>,
}

fn fixture(n: i64) -> Fixture {
    let store = store_with(n);
    let clock = clock();
    let cache = Arc::new(MemoryCache::new(clock.clone()));
    let shared_cache: Arc<dyn SnapshotCache> = cache.clone();
    let pages = SnapshotPaginator::new(
        store.clone(),
        SnapshotStore::new(shared_cache.clone(), "api_fast_page_pagination", TTL),
    );
    let windows = LimitOffsetPaginator::new(
        store.clone(),
        SnapshotStore::new(shared_cache, "api_fast_limit_offset_pagination", TTL),
    );
    Fixture {
        store,
        clock,
        cache,
        pages,
        windows,
    }
}

fn ascending() -> QuerySignature {
    QuerySignature::new(ORDERS_RESOURCE).order_by("id")
}

fn newest_first() -> QuerySignature {
    QuerySignature::new(ORDERS_RESOURCE).order_by("-id")
}

fn ids(orders: &[shared::models::Order]) -> Vec<i64> {
    orders.iter().map(|o| o.id).collect()
}

#[tokio::test]
async fn test_twenty_five_ids_in_pages_of_ten() {
    let f = fixture(25);
    let sig = ascending();

    let first = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(ids(&first.items), (1..=10).collect::<Vec<_>>());
    assert!(first.has_next);
    assert!(!first.has_previous);
    assert_eq!(first.count, None);

    let third = f.pages.paginate(&sig, PageRequest::new(3, 10)).await.unwrap();
    assert_eq!(ids(&third.items), (21..=25).collect::<Vec<_>>());
    assert!(!third.has_next);
    assert_eq!(third.previous_page_number(), Some(2));

    let err = f
        .pages
        .paginate(&sig, PageRequest::new(4, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPage);
    assert_eq!(err.message, "Invalid page \"4\": That page contains no results.");
}

#[tokio::test]
async fn test_counted_pages_match_uncounted() {
    let f = fixture(25);
    let sig = ascending();

    let third = f
        .pages
        .paginate(&sig, PageRequest::new(3, 10).with_count())
        .await
        .unwrap();
    assert_eq!(third.count, Some(25));
    assert_eq!(third.num_pages, 3);
    assert!(!third.has_next);

    let err = f
        .pages
        .paginate(&sig, PageRequest::new(4, 10).with_count())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPage);

    // Count computed once per TTL window
    f.pages
        .paginate(&sig, PageRequest::new(1, 10).with_count())
        .await
        .unwrap();
    assert_eq!(f.store.stats().count_queries, 1);
}

#[tokio::test]
async fn test_uncounted_pages_never_count() {
    let f = fixture(25);
    let sig = ascending();
    for n in 1..=3 {
        f.pages.paginate(&sig, PageRequest::new(n, 10)).await.unwrap();
    }
    let stats = f.store.stats();
    assert_eq!(stats.count_queries, 0);
    assert_eq!(stats.identifier_scans, 1);
    assert_eq!(stats.page_fetches, 3);
    // Pages of 10, 10 and 5 only touch their own rows
    assert_eq!(stats.rows_read, 25);
}

#[tokio::test]
async fn test_slices_match_snapshot_for_every_page_size() {
    let f = fixture(23);
    let sig = ascending();
    let all: Vec<i64> = (1..=23).collect();

    for size in 1..=24usize {
        let pages = all.len().div_ceil(size);
        for n in 1..=pages {
            let page = f
                .pages
                .paginate(&sig, PageRequest::new(n as i64, size))
                .await
                .unwrap();
            let bottom = (n - 1) * size;
            let top = (bottom + size).min(all.len());
            assert_eq!(ids(&page.items), all[bottom..top].to_vec());
            assert_eq!(page.has_next, n < pages);
        }
    }
}

#[tokio::test]
async fn test_snapshot_is_stable_within_ttl() {
    let f = fixture(25);
    let sig = newest_first();

    let first = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(first.items[0].id, 25);

    // A new order lands between page requests
    f.store
        .insert(order(26, OrderStatus::Completed, t0() + ChronoDuration::days(30)));
    f.clock.advance(ChronoDuration::minutes(59));

    let again = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(ids(&again.items), ids(&first.items));
    let third = f.pages.paginate(&sig, PageRequest::new(3, 10)).await.unwrap();
    assert_eq!(ids(&third.items), vec![5, 4, 3, 2, 1]);
    assert_eq!(f.store.stats().identifier_scans, 1);
}

#[tokio::test]
async fn test_snapshot_recaptured_after_ttl() {
    let f = fixture(25);
    let sig = newest_first();

    f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    f.store
        .insert(order(26, OrderStatus::Completed, t0() + ChronoDuration::days(30)));
    f.clock.advance(ChronoDuration::hours(1));

    let page = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(page.items[0].id, 26);
    assert_eq!(f.store.stats().identifier_scans, 2);

    // The stale entry is gone, the fresh one stays
    f.clock.advance(ChronoDuration::minutes(30));
    assert_eq!(f.cache.purge_expired(), 0);
}

#[tokio::test]
async fn test_explicit_invalidation_recaptures() {
    let f = fixture(5);
    let sig = newest_first();
    f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    f.pages.snapshots().invalidate(&sig).await.unwrap();
    f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(f.store.stats().identifier_scans, 2);
}

#[tokio::test]
async fn test_vanished_records_are_skipped() {
    let f = fixture(25);
    let sig = ascending();
    f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();

    f.store.remove(5);
    let page = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert_eq!(ids(&page.items), vec![1, 2, 3, 4, 6, 7, 8, 9, 10]);
    assert!(page.has_next);
}

#[tokio::test]
async fn test_sentinel_last_page_and_beyond() {
    let f = fixture(20);
    let sig = ascending();

    let last = f.pages.paginate(&sig, PageRequest::new(2, 10)).await.unwrap();
    assert_eq!(last.len(), 10);
    assert!(!last.has_next);
    assert_eq!(last.next_page_number(), None);

    let by_name = f
        .pages
        .paginate(
            &sig,
            PageRequest {
                number: PageNumber::Last,
                page_size: 10,
                show_count: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(by_name.number, 2);

    let err = f
        .pages
        .paginate(&sig, PageRequest::new(0, 10))
        .await
        .unwrap_err();
    assert_eq!(err.message, "Invalid page \"0\": That page number is less than 1.");
}

#[tokio::test]
async fn test_page_one_of_empty_result_is_valid() {
    let f = fixture(3);
    let sig = QuerySignature::new(ORDERS_RESOURCE)
        .filter("status", "pending")
        .order_by("id");

    let page = f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    assert!(page.is_empty());
    assert!(!page.has_next);

    assert!(f.pages.paginate(&sig, PageRequest::new(2, 10)).await.is_err());
}

#[tokio::test]
async fn test_orphans_fold_into_previous_page() {
    let store = store_with(25);
    let cache: Arc<dyn SnapshotCache> = Arc::new(MemoryCache::new(clock()));
    let pages = SnapshotPaginator::new(store, SnapshotStore::new(cache, "p", TTL)).with_orphans(5);
    let sig = ascending();

    let second = pages.paginate(&sig, PageRequest::new(2, 10)).await.unwrap();
    assert_eq!(ids(&second.items), (11..=25).collect::<Vec<_>>());
    assert!(!second.has_next);
    assert!(pages.paginate(&sig, PageRequest::new(3, 10)).await.is_err());
}

#[tokio::test]
async fn test_zero_page_size_rejected() {
    let f = fixture(3);
    let err = f
        .pages
        .paginate(&ascending(), PageRequest::new(1, 0))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_unreachable_store_fails_the_request() {
    let f = fixture(5);
    f.store.set_available(false);
    let err = f
        .pages
        .paginate(&ascending(), PageRequest::new(1, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreUnavailable);
}

#[tokio::test]
async fn test_unreachable_cache_fails_the_request() {
    let f = fixture(5);
    f.cache.set_available(false);
    let err = f
        .windows
        .paginate(&ascending(), 10, 0)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CacheUnavailable);
}

#[tokio::test]
async fn test_limit_offset_windows() {
    let f = fixture(25);
    let sig = ascending();

    let tail = f.windows.paginate(&sig, 10, 20).await.unwrap();
    assert_eq!(tail.count, 25);
    assert_eq!(ids(&tail.items), (21..=25).collect::<Vec<_>>());
    assert_eq!(tail.next_offset(), None);
    assert_eq!(tail.previous_offset(), Some(10));

    let middle = f.windows.paginate(&sig, 10, 5).await.unwrap();
    assert_eq!(ids(&middle.items), (6..=15).collect::<Vec<_>>());
    assert_eq!(middle.next_offset(), Some(15));
    assert_eq!(middle.previous_offset(), Some(0));
}

#[tokio::test]
async fn test_offset_past_end_is_empty_not_error() {
    let f = fixture(25);
    let sig = ascending();

    let past = f.windows.paginate(&sig, 10, 30).await.unwrap();
    assert!(past.items.is_empty());
    assert_eq!(past.count, 25);

    let at_end = f.windows.paginate(&sig, 10, 25).await.unwrap();
    assert!(at_end.items.is_empty());
}

#[tokio::test]
async fn test_namespaces_are_independent() {
    let f = fixture(25);
    let sig = ascending();

    f.pages.paginate(&sig, PageRequest::new(1, 10)).await.unwrap();
    f.windows.paginate(&sig, 10, 0).await.unwrap();
    f.windows.paginate(&sig, 10, 10).await.unwrap();

    let stats = f.store.stats();
    assert_eq!(stats.identifier_scans, 2);
    assert_eq!(stats.count_queries, 1);
    assert_ne!(
        f.pages.snapshots().keys(&sig).identifiers,
        f.windows.snapshots().keys(&sig).identifiers
    );
}
