//! Count-up animation for the statistics in the about section.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use page_adapter::{Page, Target};
use shared::domain::ElementId;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const COUNT_ATTRIBUTE: &str = "data-count";

pub struct CounterAnimation {
    page: Arc<dyn Page>,
    counters: Vec<(ElementId, i64)>,
    steps: u32,
    tick: Duration,
    started: AtomicBool,
}

impl CounterAnimation {
    /// `None` without an about section to trigger it or without any counter.
    pub fn attach(page: Arc<dyn Page>, steps: u32, tick: Duration) -> Option<Self> {
        page.query(&Target::AboutSection)?;

        let counters: Vec<(ElementId, i64)> = page
            .query_all(&Target::Counters)
            .into_iter()
            .filter_map(|counter| {
                let raw = page.attribute(counter, COUNT_ATTRIBUTE).unwrap_or_default();
                match raw.trim().parse::<i64>() {
                    Ok(target) => Some((counter, target)),
                    Err(_) => {
                        warn!(counter = counter.0, value = %raw, "counter without numeric target");
                        None
                    }
                }
            })
            .collect();
        if counters.is_empty() {
            return None;
        }

        Some(Self {
            page,
            counters,
            steps: steps.max(1),
            tick,
            started: AtomicBool::new(false),
        })
    }

    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Starts the animation the first time the about section intersects the viewport.
    pub fn on_about_intersection(&self, intersecting: bool) -> Option<JoinHandle<()>> {
        if !intersecting || self.started.swap(true, Ordering::SeqCst) {
            return None;
        }

        let page = Arc::clone(&self.page);
        let counters = self.counters.clone();
        let steps = self.steps;
        let tick = self.tick;
        Some(tokio::spawn(async move {
            let mut ticks = 0u64;
            while advance(page.as_ref(), &counters, steps) {
                ticks += 1;
                tokio::time::sleep(tick).await;
            }
            debug!(ticks, "counters finished");
        }))
    }
}

/// One animation step. Returns whether any counter is still below its target.
pub fn advance(page: &dyn Page, counters: &[(ElementId, i64)], steps: u32) -> bool {
    let mut pending = false;
    for (counter, target) in counters {
        let target = *target as f64;
        let current = page.text(*counter).trim().parse::<f64>().unwrap_or(0.0);
        if current < target {
            let next = (current + target / f64::from(steps)).ceil().min(target);
            page.set_text(*counter, &format!("{next}"));
            pending |= next < target;
        } else {
            page.set_text(*counter, &format!("{target}"));
        }
    }
    pending
}
