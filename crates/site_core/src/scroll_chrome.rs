use std::sync::Arc;

use page_adapter::{Page, ScrollBehavior, Target};
use shared::domain::ElementId;

pub const HEADER_SCROLLED_CLASS: &str = "header-scrolled";
pub const BACK_TO_TOP_VISIBLE_CLASS: &str = "visible";

/// Adds `class` to `element` while the page is scrolled past `threshold`.
fn mark_past(page: &dyn Page, element: ElementId, class: &str, threshold: f64) -> bool {
    let past = page.scroll_y() > threshold;
    if past {
        page.add_class(element, class);
    } else {
        page.remove_class(element, class);
    }
    past
}

pub struct StickyHeader {
    page: Arc<dyn Page>,
    header: ElementId,
    threshold: f64,
}

impl StickyHeader {
    pub fn attach(page: Arc<dyn Page>, threshold: f64) -> Option<Self> {
        let header = page.query(&Target::Header)?;
        Some(Self {
            page,
            header,
            threshold,
        })
    }

    /// Returns whether the header is in its scrolled state.
    pub fn on_scroll(&self) -> bool {
        mark_past(
            self.page.as_ref(),
            self.header,
            HEADER_SCROLLED_CLASS,
            self.threshold,
        )
    }
}

pub struct BackToTop {
    page: Arc<dyn Page>,
    control: ElementId,
    threshold: f64,
}

impl BackToTop {
    pub fn attach(page: Arc<dyn Page>, threshold: f64) -> Option<Self> {
        let control = page.query(&Target::BackToTop)?;
        Some(Self {
            page,
            control,
            threshold,
        })
    }

    pub fn control(&self) -> ElementId {
        self.control
    }

    /// Returns whether the control is shown.
    pub fn on_scroll(&self) -> bool {
        mark_past(
            self.page.as_ref(),
            self.control,
            BACK_TO_TOP_VISIBLE_CLASS,
            self.threshold,
        )
    }

    pub fn on_click(&self) {
        self.page.scroll_to(0.0, ScrollBehavior::Smooth);
    }
}
