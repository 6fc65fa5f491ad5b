//! Project filtering: exclusive category buttons driving a two-phase fade over project items.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use page_adapter::{Page, Target};
use shared::domain::{ElementId, FilterCategory};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::SiteSettings;

pub const ACTIVE_CLASS: &str = "active";
const FILTER_ATTRIBUTE: &str = "data-filter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTiming {
    /// Delay between `display: block` and the fade-in styles.
    pub reveal_delay: Duration,
    /// Delay between the fade-out styles and `display: none`.
    pub hide_delay: Duration,
    /// Delay before the layout-recalculation signal; longer than `hide_delay`.
    pub relayout_delay: Duration,
}

impl FilterTiming {
    pub fn from_settings(settings: &SiteSettings) -> Self {
        Self {
            reveal_delay: settings.reveal_delay(),
            hide_delay: settings.hide_delay(),
            relayout_delay: settings.relayout_delay(),
        }
    }
}

impl Default for FilterTiming {
    fn default() -> Self {
        Self::from_settings(&SiteSettings::default())
    }
}

/// Delayed steps scheduled by one selection.
#[derive(Debug, Default)]
pub struct Transition {
    tasks: Vec<JoinHandle<()>>,
}

impl Transition {
    pub async fn settled(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

pub struct FilterController {
    page: Arc<dyn Page>,
    buttons: Vec<ElementId>,
    items: Vec<ElementId>,
    timing: FilterTiming,
    selection: Arc<AtomicU64>,
}

impl FilterController {
    /// Captures the filter buttons and project items present now. `None` when either set is
    /// empty, in which case filtering is inert.
    pub fn attach(page: Arc<dyn Page>, timing: FilterTiming) -> Option<Self> {
        let buttons = page.query_all(&Target::FilterButtons);
        let items = page.query_all(&Target::ProjectItems);
        if buttons.is_empty() || items.is_empty() {
            debug!(
                buttons = buttons.len(),
                items = items.len(),
                "project filter inert"
            );
            return None;
        }

        Some(Self {
            page,
            buttons,
            items,
            timing,
            selection: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn buttons(&self) -> &[ElementId] {
        &self.buttons
    }

    pub fn items(&self) -> &[ElementId] {
        &self.items
    }

    pub fn owns_button(&self, button: ElementId) -> bool {
        self.buttons.contains(&button)
    }

    /// Category token of a button. A button without one selects nothing.
    pub fn category_of(&self, button: ElementId) -> FilterCategory {
        FilterCategory::new(
            self.page
                .attribute(button, FILTER_ATTRIBUTE)
                .unwrap_or_default(),
        )
    }

    pub fn click(&self, button: ElementId) -> Transition {
        let category = self.category_of(button);
        self.select_category(button, &category)
    }

    pub fn select_category(&self, button: ElementId, category: &FilterCategory) -> Transition {
        let selection = self.selection.fetch_add(1, Ordering::SeqCst) + 1;

        for other in &self.buttons {
            self.page.remove_class(*other, ACTIVE_CLASS);
        }
        self.page.add_class(button, ACTIVE_CLASS);

        let mut shown = Vec::new();
        let mut hidden = Vec::new();
        for item in &self.items {
            let labels = self.page.classes(*item);
            if category.selects(labels.iter().map(String::as_str)) {
                self.page.set_style(*item, "display", "block");
                shown.push(*item);
            } else {
                self.page.set_style(*item, "opacity", "0");
                self.page.set_style(*item, "transform", "scale(0.8)");
                hidden.push(*item);
            }
        }
        debug!(
            category = %category,
            selection,
            shown = shown.len(),
            hidden = hidden.len(),
            "filter selected"
        );

        let mut tasks = Vec::with_capacity(3);
        if !shown.is_empty() {
            tasks.push(self.after(self.timing.reveal_delay, selection, move |page| {
                for item in &shown {
                    page.set_style(*item, "opacity", "1");
                    page.set_style(*item, "transform", "scale(1)");
                }
            }));
        }
        if !hidden.is_empty() {
            tasks.push(self.after(self.timing.hide_delay, selection, move |page| {
                for item in &hidden {
                    page.set_style(*item, "display", "none");
                }
            }));
        }

        let page = Arc::clone(&self.page);
        let items = self.items.clone();
        let relayout_delay = self.timing.relayout_delay;
        tasks.push(tokio::spawn(async move {
            tokio::time::sleep(relayout_delay).await;
            if items.iter().any(|item| is_displayed(page.as_ref(), *item)) {
                page.dispatch_resize();
            }
        }));

        Transition { tasks }
    }

    /// Runs `step` after `delay` unless a newer selection has started in the meantime.
    fn after(
        &self,
        delay: Duration,
        selection: u64,
        step: impl FnOnce(&dyn Page) + Send + 'static,
    ) -> JoinHandle<()> {
        let page = Arc::clone(&self.page);
        let current = Arc::clone(&self.selection);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == selection {
                step(page.as_ref());
            } else {
                debug!(selection, "superseded filter step skipped");
            }
        })
    }
}

pub fn is_displayed(page: &dyn Page, item: ElementId) -> bool {
    page.style(item, "display").as_deref() != Some("none")
}

#[cfg(test)]
#[path = "tests/filter_tests.rs"]
mod tests;
