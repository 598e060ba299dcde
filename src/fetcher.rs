use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::circle::{Circle, CircleDetail};
use crate::crawl::Crawler;
use crate::delay;
use crate::dom::DomDriver;
use crate::error::Result;
use crate::store::CircleStore;

/// Caller-driven cancellation signal, checked before each detail navigation.
/// An in-flight page load is not interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Order-preserving subset of `circles` whose space is not yet cached.
pub fn filter_new(circles: Vec<Circle>, cached: &HashMap<String, CircleDetail>) -> Vec<Circle> {
    circles
        .into_iter()
        .filter(|circle| !cached.contains_key(&circle.space))
        .collect()
}

/// Fetches the detail page of every circle missing from the cache and appends
/// each record to the store, pausing `interval` between circles. Fail-fast:
/// the first fetch or append failure aborts the loop and propagates, leaving
/// the records appended so far intact. Returns the number of circles
/// appended.
pub fn crawl_new<D: DomDriver>(
    crawler: &mut Crawler<D>,
    store: &mut CircleStore,
    circles: Vec<Circle>,
    cached: &HashMap<String, CircleDetail>,
    interval: Duration,
    cancel: &CancelToken,
) -> Result<usize> {
    let all = circles.len();
    let saved = cached.len();
    let fresh = filter_new(circles, cached);
    let mut appended = 0;

    for (i, circle) in fresh.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("Cancelled after {appended} circles");
            break;
        }
        info!(
            "all: {}, saved: {}, new: {}",
            all,
            saved + i,
            fresh.len() - i
        );

        let detail = crawler.fetch_circle_detail(circle)?;
        store.append_detail(&detail)?;
        appended += 1;

        if i + 1 < fresh.len() {
            delay::pause(interval);
        }
    }

    Ok(appended)
}
