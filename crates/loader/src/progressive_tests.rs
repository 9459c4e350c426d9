use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use timberdesk_client::{ApiClient, ClientConfig, ResponseCache};
use timberdesk_core::Product;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::LoadError;
use crate::progressive::ProgressiveLoader;
use crate::source::Collection;
use crate::test_support::{GatedSource, VecSource};

fn loader(source: VecSource, page_size: u64) -> ProgressiveLoader<u32, VecSource> {
    ProgressiveLoader::new(source, page_size).unwrap().with_pace(Duration::ZERO)
}

#[tokio::test]
async fn test_refetch_loads_everything() {
    let loader = loader(VecSource::new(45), 20);
    let data = loader.refetch().await.unwrap();
    assert_eq!(data, (0..45).collect::<Vec<_>>());

    let state = loader.state();
    assert_eq!(state.data, data);
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert!(state.progress.is_complete());
    assert_eq!((state.progress.current, state.progress.total), (3, 3));
}

#[tokio::test]
async fn test_state_is_published_incrementally() {
    let loader = Arc::new(loader(VecSource::new(6), 2));
    let mut rx = loader.subscribe();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let done = !state.loading && state.progress.is_complete();
            seen.push((state.data.len(), state.progress.percentage));
            if done {
                break;
            }
        }
        seen
    });

    loader.refetch().await.unwrap();
    let seen = observer.await.unwrap();
    assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 <= w[1].1));
    assert_eq!(seen.last(), Some(&(6, 100.0)));
}

#[tokio::test]
async fn test_failure_discards_partial_data() {
    let loader = loader(VecSource::new(100).failing_at(3), 10);
    let err = loader.refetch().await.unwrap_err();
    assert!(matches!(err, LoadError::Request(_)));

    let state = loader.state();
    assert!(state.data.is_empty());
    assert_eq!(state.progress.percentage, 0.0);
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some(err.user_message().as_str()));
}

#[tokio::test]
async fn test_refetch_restarts_from_page_zero_and_overwrites() {
    let loader = loader(VecSource::new(5), 2);
    loader.refetch().await.unwrap();
    let second = loader.refetch().await.unwrap();

    assert_eq!(second, vec![0, 1, 2, 3, 4]);
    assert_eq!(loader.state().data.len(), 5);
    assert_eq!(loader.state().generation, 2);
}

#[tokio::test]
async fn test_refetch_after_failure_clears_error() {
    let loader = loader(VecSource::new(4).failing_once_at(1), 2);
    assert!(loader.refetch().await.is_err());
    assert!(loader.state().error.is_some());

    let data = loader.refetch().await.unwrap();
    assert_eq!(data, vec![0, 1, 2, 3]);
    assert!(loader.state().error.is_none());
}

#[tokio::test]
async fn test_empty_collection() {
    let loader = loader(VecSource::new(0), 20);
    assert!(loader.refetch().await.unwrap().is_empty());
    let state = loader.state();
    assert!(state.progress.is_complete());
    assert!(state.data.is_empty());
}

#[tokio::test]
async fn test_newer_refetch_supersedes_in_flight_walk() {
    let source = Arc::new(GatedSource::new(VecSource::new(6), 1));
    let loader = Arc::new(
        ProgressiveLoader::new(Arc::clone(&source), 2).unwrap().with_pace(Duration::ZERO),
    );

    let stale = {
        let loader = Arc::clone(&loader);
        tokio::spawn(async move { loader.refetch().await })
    };
    source.entered.notified().await;

    let fresh = loader.refetch().await.unwrap();
    assert_eq!(fresh, (0..6).collect::<Vec<_>>());

    source.release.notify_one();
    let stale = stale.await.unwrap();
    assert!(stale.unwrap_err().is_superseded());

    let state = loader.state();
    assert_eq!(state.data, fresh);
    assert_eq!(state.generation, 2);
    assert!(state.progress.is_complete());
}

#[tokio::test]
async fn test_oversized_page_size_is_clamped() {
    let loader = loader(VecSource::new(1), 100);
    assert_eq!(loader.page_size(), 20);
    assert!(ProgressiveLoader::new(VecSource::new(1), 0).is_err());
}

#[tokio::test]
async fn test_typed_collection_over_http() {
    let server = MockServer::start().await;
    let config = ClientConfig::default().with_base_url(server.uri());
    let client = Arc::new(ApiClient::new(&config, Arc::new(ResponseCache::default())).unwrap());

    Mock::given(method("GET"))
        .and(path("/api/v1/products/"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "p1", "volume": 2, "price": 100, "descrioption": "pine"}],
            "pagination": {"total": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products/"))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "p2", "volume": 3, "price": 50}],
            "pagination": {"total": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let loader = ProgressiveLoader::new(Collection::<Product>::new(client), 1)
        .unwrap()
        .with_pace(Duration::ZERO);
    let products = loader.refetch().await.unwrap();
    let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!(products[0].description.as_deref(), Some("pine"));
}
