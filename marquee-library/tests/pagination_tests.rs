//! Integration tests for the paginated fetcher and page cache

mod helpers;

use helpers::FakeContentSource;
use marquee_common::{Error, LibraryQueryKey};
use marquee_library::{LibraryItem, PaginatedFetcher};
use std::sync::Arc;

fn artists_key(sort: &str) -> LibraryQueryKey {
    LibraryQueryKey::new("library:artists", sort, "")
}

#[tokio::test]
async fn test_resolved_page_is_served_from_cache() {
    let source = Arc::new(FakeContentSource::new(450));
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source.clone(), vec!["1".to_string()], 200);
    let key = artists_key("0");

    let first = fetcher.fetch_page(&key, 0).await.unwrap();
    let second = fetcher.fetch_page(&key, 0).await.unwrap();

    assert_eq!(source.calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.items.len(), 200);
    assert_eq!(first.total_length, 450);
}

#[tokio::test]
async fn test_distinct_keys_are_cached_separately() {
    let source = Arc::new(FakeContentSource::new(10));
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source.clone(), vec!["1".to_string()], 200);

    let by_name = fetcher.fetch_page(&artists_key("0"), 0).await.unwrap();
    let by_date = fetcher.fetch_page(&artists_key("1"), 0).await.unwrap();

    assert_eq!(source.calls(), 2);
    assert_ne!(by_name.items[0].uri, by_date.items[0].uri);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_fetch() {
    let source = Arc::new(FakeContentSource::new(450).holding("0"));
    let fetcher: Arc<PaginatedFetcher<LibraryItem>> = Arc::new(PaginatedFetcher::new(
        source.clone(),
        vec!["1".to_string()],
        200,
    ));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let fetcher = Arc::clone(&fetcher);
            tokio::spawn(async move { fetcher.fetch_page(&artists_key("0"), 0).await })
        })
        .collect();

    source.wait_entered().await;
    source.release();

    let pages: Vec<_> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(source.calls(), 1);
    assert!(pages.iter().all(|p| Arc::ptr_eq(p, &pages[0])));
}

#[tokio::test]
async fn test_request_carries_key_fields_and_limit() {
    let source = Arc::new(FakeContentSource::new(5));
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source.clone(), vec!["1".to_string()], 200);
    let key = LibraryQueryKey::new("library:artists", "1", "boards");

    fetcher.fetch_page(&key, 0).await.unwrap();

    let request = &source.requests()[0];
    assert_eq!(request.filters, vec!["1".to_string()]);
    assert_eq!(request.sort_order, "1");
    assert_eq!(request.text_filter, "boards");
    assert_eq!(request.offset, 0);
    assert_eq!(request.limit, 200);
}

#[tokio::test]
async fn test_source_failure_is_not_cached() {
    let source = Arc::new(FakeContentSource::new(450));
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source.clone(), vec!["1".to_string()], 200);
    let key = artists_key("0");

    source.fail_at(0);
    let err = fetcher.fetch_page(&key, 0).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));

    source.recover_at(0);
    let page = fetcher.fetch_page(&key, 0).await.unwrap();
    assert_eq!(page.items.len(), 200);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_malformed_items_are_source_unavailable() {
    let source = Arc::new(FakeContentSource::new(3).malformed());
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source, vec!["1".to_string()], 200);

    let err = fetcher.fetch_page(&artists_key("0"), 0).await.unwrap_err();
    match err {
        Error::SourceUnavailable(message) => assert!(message.contains("Malformed item 0")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_pages_of_evicted_keys_are_fetched_again() {
    let source = Arc::new(FakeContentSource::new(10));
    let fetcher: PaginatedFetcher<LibraryItem> =
        PaginatedFetcher::new(source.clone(), vec!["1".to_string()], 200).with_cache_capacity(1);

    fetcher.fetch_page(&artists_key("0"), 0).await.unwrap();
    fetcher.fetch_page(&artists_key("1"), 0).await.unwrap();
    assert_eq!(fetcher.cache().cached_queries().await, 1);

    fetcher.fetch_page(&artists_key("0"), 0).await.unwrap();
    assert_eq!(source.calls(), 3);
}
