//! Startup loading protocol.
//!
//! - Collection skeletons are fetched first (one request)
//! - Collections are then filled strictly in order: the next collection's
//!   items are not requested until the previous batch has fully settled
//! - Within a collection every item is normalized concurrently
//! - A collection that ends up with no items stays in the list

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::client::CatalogSource;
use super::images::ImageProbe;
use super::normalize::normalize;
use super::raw::RawItem;
use crate::models::{Collection, Item};

/// Outcome of a full catalog load.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub collections: Vec<Collection>,
    /// Raw item records that were undecodable or discarded by normalization.
    pub dropped_items: usize,
    pub elapsed: Duration,
}

impl LoadReport {
    pub fn item_count(&self) -> usize {
        self.collections.iter().map(Collection::len).sum()
    }
}

pub async fn load_catalog<S, P>(source: &S, probe: Arc<P>, image_base: &str) -> LoadReport
where
    S: CatalogSource,
    P: ImageProbe + Send + Sync + 'static,
{
    let started = Instant::now();
    let skeletons = source.fetch_collections().await;
    info!("Discovered {} collections", skeletons.len());

    let mut collections = Vec::with_capacity(skeletons.len());
    let mut dropped_items = 0;

    for skeleton in skeletons {
        let raw_items = source.fetch_items(&skeleton.href).await;
        let fetched = raw_items.len();
        let items = normalize_batch(raw_items, image_base, &probe).await;
        dropped_items += fetched - items.len();
        debug!(
            collection = %skeleton.id,
            fetched,
            kept = items.len(),
            "Collection loaded"
        );
        collections.push(skeleton.with_items(items));
    }

    let report = LoadReport {
        collections,
        dropped_items,
        elapsed: started.elapsed(),
    };
    info!(
        "Catalog loaded: {} collections, {} items, {} dropped in {:?}",
        report.collections.len(),
        report.item_count(),
        report.dropped_items,
        report.elapsed
    );
    report
}

/// Decodes and normalizes a whole batch concurrently and waits for every
/// item to settle. Surviving items keep their source order.
async fn normalize_batch<P>(raw_items: Vec<Value>, image_base: &str, probe: &Arc<P>) -> Vec<Item>
where
    P: ImageProbe + Send + Sync + 'static,
{
    let mut tasks = JoinSet::new();
    for (index, raw) in raw_items.into_iter().enumerate() {
        let probe = Arc::clone(probe);
        let base = image_base.to_string();
        tasks.spawn(async move {
            let item = match RawItem::from_value(raw) {
                Some(raw) => normalize(&raw, &base, probe.as_ref()).await,
                None => None,
            };
            (index, item)
        });
    }

    let mut settled = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => settled.push(result),
            Err(err) => warn!(error = %err, "Normalization task failed"),
        }
    }

    settled.sort_by_key(|(index, _)| *index);
    settled.into_iter().filter_map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::raw::sample_raw_value;
    use std::collections::HashMap;
    use std::sync::Mutex;

    type EventLog = Arc<Mutex<Vec<String>>>;

    struct FakeSource {
        collections: Vec<Collection>,
        items: HashMap<String, Vec<Value>>,
        log: EventLog,
    }

    impl FakeSource {
        fn new(shape: Vec<(&str, Vec<&str>)>, log: EventLog) -> Self {
            let mut collections = Vec::new();
            let mut items = HashMap::new();
            for (id, item_ids) in shape {
                let href = format!("/{id}");
                collections.push(Collection::skeleton(
                    id.to_string(),
                    format!("Collection {id}"),
                    href.clone(),
                    "dark".to_string(),
                ));
                items.insert(href, item_ids.into_iter().map(sample_raw_value).collect());
            }
            Self {
                collections,
                items,
                log,
            }
        }
    }

    impl CatalogSource for FakeSource {
        async fn fetch_collections(&self) -> Vec<Collection> {
            self.log.lock().unwrap().push("collections".to_string());
            self.collections.clone()
        }

        async fn fetch_items(&self, href: &str) -> Vec<Value> {
            self.log.lock().unwrap().push(format!("start {href}"));
            tokio::task::yield_now().await;
            self.log.lock().unwrap().push(format!("end {href}"));
            self.items.get(href).cloned().unwrap_or_default()
        }
    }

    /// Logs probes; items whose id is listed resolve slowly, and URLs
    /// containing a failing fragment are unavailable.
    struct LoggingProbe {
        log: EventLog,
        slow: Vec<String>,
        failing: Vec<String>,
    }

    impl ImageProbe for LoggingProbe {
        async fn probe(&self, url: &str) -> Option<String> {
            self.log.lock().unwrap().push(format!("probe {url}"));
            if self.slow.iter().any(|s| url.contains(s.as_str())) {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            if self.failing.iter().any(|f| url.contains(f.as_str())) {
                None
            } else {
                Some(url.to_string())
            }
        }
    }

    fn probe(log: &EventLog, slow: &[&str], failing: &[&str]) -> Arc<LoggingProbe> {
        Arc::new(LoggingProbe {
            log: Arc::clone(log),
            slow: slow.iter().map(|s| s.to_string()).collect(),
            failing: failing.iter().map(|f| f.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn item_fetches_are_sequential_in_collection_order() {
        let log: EventLog = Arc::default();
        let source = FakeSource::new(
            vec![("c1", vec!["a", "b"]), ("c2", vec!["c"]), ("c3", vec![])],
            log.clone(),
        );

        let report = load_catalog(&source, probe(&log, &[], &[]), "https://img.test").await;
        assert_eq!(report.collections.len(), 3);

        let events = log.lock().unwrap().clone();
        let fetch_events: Vec<&String> = events
            .iter()
            .filter(|e| e.starts_with("start") || e.starts_with("end"))
            .collect();
        assert_eq!(
            fetch_events,
            ["start /c1", "end /c1", "start /c2", "end /c2", "start /c3", "end /c3"]
        );
        assert_eq!(events[0], "collections");

        // Every probe for c1 happens before c2 is requested.
        let start_c2 = events.iter().position(|e| e == "start /c2").unwrap();
        let last_c1_probe = events
            .iter()
            .rposition(|e| e.contains("/art/a/") || e.contains("/art/b/"))
            .unwrap();
        assert!(last_c1_probe < start_c2);
    }

    #[tokio::test]
    async fn batch_keeps_source_order_when_probes_finish_out_of_order() {
        let log: EventLog = Arc::default();
        let source = FakeSource::new(vec![("c1", vec!["a", "b", "c"])], log.clone());

        let report = load_catalog(&source, probe(&log, &["/art/a/"], &[]), "https://img.test").await;

        let ids: Vec<&str> = report.collections[0]
            .items
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failed_images_are_filtered_but_collection_remains() {
        let log: EventLog = Arc::default();
        let source = FakeSource::new(vec![("c1", vec!["a", "b"]), ("c2", vec!["c"])], log.clone());

        let report = load_catalog(
            &source,
            probe(&log, &[], &["/art/b/h.jpg", "/art/c/v.jpg"]),
            "https://img.test",
        )
        .await;

        assert_eq!(report.collections.len(), 2);
        assert_eq!(report.collections[0].items.len(), 1);
        assert_eq!(report.collections[0].items[0].id, "a");
        assert!(report.collections[1].items.is_empty());
        assert_eq!(report.dropped_items, 2);
        assert_eq!(report.item_count(), 1);
    }

    #[tokio::test]
    async fn undecodable_item_is_dropped_alone() {
        let log: EventLog = Arc::default();
        let mut source = FakeSource::new(vec![("c1", vec!["a", "b"])], log.clone());
        if let Some(records) = source.items.get_mut("/c1") {
            let mut bad = sample_raw_value("x");
            bad["rating"] = Value::String("TV-MA".to_string());
            records.insert(1, bad);
        }

        let report = load_catalog(&source, probe(&log, &[], &[]), "https://img.test").await;

        let ids: Vec<&str> = report.collections[0]
            .items
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(report.dropped_items, 1);
    }

    #[tokio::test]
    async fn empty_catalog_loads_without_item_requests() {
        let log: EventLog = Arc::default();
        let source = FakeSource::new(vec![], log.clone());

        let report = load_catalog(&source, probe(&log, &[], &[]), "https://img.test").await;

        assert!(report.collections.is_empty());
        assert_eq!(log.lock().unwrap().clone(), vec!["collections".to_string()]);
    }
}
