use std::time::Duration;

use serde_json::json;
use timberdesk_core::Entity;

use crate::error::LoadError;
use crate::stats::{EntitySummary, StatsAggregator};
use crate::test_support::FakeCatalog;

fn aggregator(catalog: FakeCatalog, entities: Vec<Entity>, page_size: u64) -> StatsAggregator<FakeCatalog> {
    StatsAggregator::new(catalog)
        .with_entities(entities)
        .with_page_size(page_size)
        .unwrap()
        .with_pace(Duration::ZERO)
}

#[tokio::test]
async fn test_product_aggregates_across_pages() {
    let catalog = FakeCatalog::default().with(
        Entity::Products,
        vec![json!({"id": "p1", "volume": 2, "price": 100}), json!({"id": "p2", "volume": 3, "price": 50})],
    );
    let report = aggregator(catalog, vec![Entity::Products], 1).run().await.unwrap();

    let products = report.get(Entity::Products).unwrap();
    assert_eq!(products.total, 2);
    assert_eq!(
        products.summary,
        EntitySummary::Products { total_volume: 5.0, total_value: 150.0, avg_price: 75.0 }
    );
}

#[tokio::test]
async fn test_online_counts_and_price_average() {
    let catalog = FakeCatalog::default()
        .with(
            Entity::Buyers,
            vec![
                json!({"id": "b1", "is_online": true}),
                json!({"id": "b2", "is_online": false}),
                json!({"id": "b3", "is_online": true}),
            ],
        )
        .with(Entity::Sellers, vec![json!({"id": "s1"})])
        .with(
            Entity::WoodTypePrices,
            vec![json!({"id": "w1", "price_per_m3": "300"}), json!({"id": "w2", "price_per_m3": 500})],
        );
    let report = aggregator(
        catalog,
        vec![Entity::Buyers, Entity::Sellers, Entity::WoodTypePrices],
        2,
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.get(Entity::Buyers).unwrap().summary, EntitySummary::Online { online: 2 });
    assert_eq!(report.get(Entity::Sellers).unwrap().summary, EntitySummary::Online { online: 0 });
    assert_eq!(
        report.get(Entity::WoodTypePrices).unwrap().summary,
        EntitySummary::Prices { avg_price_per_m3: 400.0 }
    );
}

#[tokio::test]
async fn test_failed_entity_is_isolated() {
    let catalog = FakeCatalog::default()
        .with(Entity::Buyers, vec![json!({"id": "b1"}), json!({"id": "b2"})])
        .with(Entity::Sellers, vec![json!({"id": "s1"})])
        .with(Entity::Images, vec![json!({"id": "i1"}), json!({"id": "i2"}), json!({"id": "i3"})])
        .failing(Entity::Sellers);
    let report = aggregator(catalog, vec![Entity::Buyers, Entity::Sellers, Entity::Images], 2)
        .run()
        .await
        .unwrap();

    let order: Vec<Entity> = report.entities.iter().map(|s| s.entity).collect();
    assert_eq!(order, vec![Entity::Buyers, Entity::Sellers, Entity::Images]);

    let buyers = report.get(Entity::Buyers).unwrap();
    assert_eq!((buyers.total, buyers.data.len()), (2, 2));
    assert!(buyers.error.is_none());

    let sellers = report.get(Entity::Sellers).unwrap();
    assert_eq!(sellers.total, 0);
    assert!(sellers.data.is_empty());
    assert_eq!(sellers.summary, EntitySummary::Plain);
    assert!(sellers.error.as_deref().unwrap().contains("server"));

    let images = report.get(Entity::Images).unwrap();
    assert_eq!(images.total, 3);
    assert_eq!(images.summary, EntitySummary::Plain);
    assert_eq!(report.failed().len(), 1);
}

#[tokio::test]
async fn test_entities_are_walked_in_series() {
    let catalog = FakeCatalog::default()
        .with(Entity::Buyers, vec![json!({"id": "b1"}), json!({"id": "b2"}), json!({"id": "b3"})])
        .with(Entity::ChatThreads, vec![json!({"id": "t1"}), json!({"id": "t2"})]);
    let agg = aggregator(catalog, vec![Entity::Buyers, Entity::ChatThreads], 1);
    agg.run().await.unwrap();

    // Every buyers page precedes every chat-threads page.
    let requests = agg.source().requests();
    assert_eq!(
        requests,
        vec![
            (Entity::Buyers, 0),
            (Entity::Buyers, 1),
            (Entity::Buyers, 2),
            (Entity::ChatThreads, 0),
            (Entity::ChatThreads, 1),
        ]
    );
}

#[tokio::test]
async fn test_overall_progress_is_monotonic_and_completes() {
    let catalog = FakeCatalog::default()
        .with(Entity::Buyers, (0..5).map(|i| json!({"id": i})).collect())
        .with(Entity::Products, (0..3).map(|i| json!({"id": i})).collect())
        .failing(Entity::Sellers);
    let agg = aggregator(catalog, vec![Entity::Buyers, Entity::Sellers, Entity::Products], 2);

    let mut rx = agg.subscribe();
    let (report, seen) = tokio::join!(agg.run(), async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let p = *rx.borrow_and_update();
            seen.push(p.overall);
            if p.overall >= 100.0 && p.entity.is_none() {
                break;
            }
        }
        seen
    });
    report.unwrap();

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert_eq!(seen.last(), Some(&100.0));
}

#[tokio::test]
async fn test_empty_entity_list() {
    let report = aggregator(FakeCatalog::default(), Vec::new(), 20).run().await.unwrap();
    assert!(report.entities.is_empty());
}

#[tokio::test]
async fn test_strip_data_keeps_summaries() {
    let catalog = FakeCatalog::default().with(Entity::Buyers, vec![json!({"id": "b1", "is_online": true})]);
    let mut report = aggregator(catalog, vec![Entity::Buyers], 20).run().await.unwrap();
    report.strip_data();

    let buyers = report.get(Entity::Buyers).unwrap();
    assert!(buyers.data.is_empty());
    assert_eq!(buyers.total, 1);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["entities"][0]["summary"], json!({"kind": "online", "online": 1}));
    assert!(value["entities"][0].get("data").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_second_run_supersedes_first() {
    let catalog = FakeCatalog::default().with(
        Entity::Products,
        vec![json!({"id": "p1", "volume": 1, "price": 10}), json!({"id": "p2", "volume": 1, "price": 30})],
    );
    let agg = aggregator(catalog, vec![Entity::Products], 1).with_pace(Duration::from_millis(100));

    let (first, second) = tokio::join!(agg.run(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        agg.run().await
    });

    assert!(matches!(first, Err(LoadError::Superseded)), "{first:?}");
    let report = second.unwrap();
    assert_eq!(report.get(Entity::Products).unwrap().total, 2);
    assert_eq!(agg.subscribe().borrow().overall, 100.0);
    assert_eq!(agg.subscribe().borrow().generation, 2);
}
