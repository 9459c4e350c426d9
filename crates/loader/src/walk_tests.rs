use std::time::Duration;

use timberdesk_core::Progress;

use crate::error::LoadError;
use crate::test_support::VecSource;
use crate::walk::{PageSink, clamp_page_size, walk_pages};

async fn collect(source: &VecSource, page_size: u64) -> (Result<Vec<u32>, LoadError>, Vec<Progress>) {
    let mut data = Vec::new();
    let mut progress = Vec::new();
    let mut sink = |items: Vec<u32>, p: Progress| {
        data.extend(items);
        progress.push(p);
        true
    };
    let result = walk_pages(source, page_size, Duration::ZERO, &mut sink).await;
    (result.map(|_| data), progress)
}

#[tokio::test]
async fn test_walk_assembles_every_record_in_order() {
    for (n, page_size) in [(1, 1), (7, 3), (20, 20), (21, 20), (45, 7)] {
        let source = VecSource::new(n);
        let (data, _) = collect(&source, page_size).await;
        assert_eq!(data.unwrap(), (0..n).collect::<Vec<_>>(), "n={n} page_size={page_size}");

        let expected_pages = u64::from(n).div_ceil(page_size);
        let expected: Vec<u64> = (0..expected_pages).collect();
        assert_eq!(source.requested_pages(), expected);
        assert!(source.requests().iter().all(|&(_, size)| size == page_size));
    }
}

#[tokio::test]
async fn test_each_page_is_the_fence_post_slice() {
    let source = VecSource::new(10);
    let mut pages = Vec::new();
    let mut sink = |items: Vec<u32>, _: Progress| {
        pages.push(items);
        true
    };
    walk_pages(&source, 4, Duration::ZERO, &mut sink).await.unwrap();
    assert_eq!(pages, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_ends_at_100() {
    let source = VecSource::new(50);
    let (_, progress) = collect(&source, 20).await;
    assert_eq!(progress.len(), 3);
    assert!(progress.windows(2).all(|w| w[0].percentage <= w[1].percentage));
    let last = progress.last().unwrap();
    assert!((last.percentage - 100.0).abs() < f64::EPSILON);
    assert_eq!((last.current, last.total), (3, 3));
}

#[tokio::test]
async fn test_zero_total_issues_one_request() {
    let source = VecSource::new(0);
    let (data, progress) = collect(&source, 20).await;
    assert!(data.unwrap().is_empty());
    assert_eq!(source.requested_pages(), vec![0]);
    assert_eq!(progress, vec![Progress::complete(0)]);
}

#[tokio::test]
async fn test_failure_stops_the_walk() {
    let source = VecSource::new(100).failing_at(2);
    let (result, _) = collect(&source, 10).await;
    let err = result.unwrap_err();
    assert!(matches!(err, LoadError::Request(_)));
    assert_eq!(source.requested_pages(), vec![0, 1, 2]);
}

#[tokio::test]
async fn test_growing_collection_keeps_initial_page_count() {
    // Ten rows are appended before every page after the first.
    let source = VecSource::new(10).mutating(|page, rows| {
        if page > 0 {
            let next = rows.len() as u32;
            rows.extend(next..next + 10);
        }
    });
    let (data, progress) = collect(&source, 5).await;
    assert_eq!(source.requested_pages(), vec![0, 1]);
    assert_eq!(data.unwrap(), (0..10).collect::<Vec<_>>());
    assert!(progress.last().unwrap().is_complete());
}

#[tokio::test]
async fn test_shrinking_collection_ends_early() {
    let source = VecSource::new(30).mutating(|page, rows| {
        if page == 1 {
            rows.truncate(10);
        }
    });
    let (data, progress) = collect(&source, 10).await;
    assert_eq!(source.requested_pages(), vec![0, 1]);
    assert_eq!(data.unwrap(), (0..10).collect::<Vec<_>>());
    assert_eq!(progress.last(), Some(&Progress::complete(3)));
}

struct StaleSink;

impl PageSink<u32> for StaleSink {
    fn is_current(&self) -> bool {
        false
    }

    fn accept(&mut self, _: Vec<u32>, _: Progress) -> bool {
        false
    }
}

#[tokio::test]
async fn test_stale_sink_issues_no_requests() {
    let source = VecSource::new(10);
    let result = walk_pages(&source, 5, Duration::ZERO, &mut StaleSink).await;
    assert!(result.unwrap_err().is_superseded());
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_zero_page_size_rejected() {
    let source = VecSource::new(10);
    let (result, _) = collect(&source, 0).await;
    assert!(matches!(result, Err(LoadError::InvalidPageSize)));
    assert!(source.requests().is_empty());
}

#[test]
fn test_clamp_page_size() {
    assert_eq!(clamp_page_size(5).unwrap(), 5);
    assert_eq!(clamp_page_size(500).unwrap(), 20);
    assert!(clamp_page_size(0).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_pace_is_applied_between_pages_only() {
    let source = VecSource::new(3);
    let started = tokio::time::Instant::now();
    let mut sink = |_: Vec<u32>, _: Progress| true;
    walk_pages(&source, 1, Duration::from_millis(50), &mut sink).await.unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_millis(150));
}
