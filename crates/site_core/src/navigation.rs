//! In-page anchor scrolling and the collapsible mobile menu.

use std::sync::Arc;

use page_adapter::{Page, ScrollBehavior, Target};
use shared::domain::ElementId;
use tracing::debug;

pub const MENU_TOGGLE_ACTIVE_CLASS: &str = "active";
pub const MENU_PANEL_OPEN_CLASS: &str = "show";

pub struct AnchorScroller {
    page: Arc<dyn Page>,
    offset: f64,
}

impl AnchorScroller {
    /// `offset` keeps the target clear of the fixed header.
    pub fn new(page: Arc<dyn Page>, offset: f64) -> Self {
        Self { page, offset }
    }

    /// Smooth-scrolls to the anchor's target section. Returns the scroll position requested.
    pub fn on_click(&self, anchor: ElementId) -> Option<f64> {
        let href = self.page.attribute(anchor, "href")?;
        let id = href.strip_prefix('#')?;
        if id.is_empty() {
            return None;
        }
        let Some(section) = self.page.query(&Target::Id(id.to_string())) else {
            debug!(%href, "anchor target missing");
            return None;
        };

        let top = self.page.offset_top(section) - self.offset;
        self.page.scroll_to(top, ScrollBehavior::Smooth);
        Some(top)
    }
}

pub struct MobileMenu {
    page: Arc<dyn Page>,
    toggle: ElementId,
    panel: ElementId,
}

impl MobileMenu {
    /// Needs both the toggle and the panel.
    pub fn attach(page: Arc<dyn Page>) -> Option<Self> {
        let toggle = page.query(&Target::MenuToggle)?;
        let panel = page.query(&Target::MenuPanel)?;
        Some(Self {
            page,
            toggle,
            panel,
        })
    }

    pub fn toggle_element(&self) -> ElementId {
        self.toggle
    }

    pub fn panel_element(&self) -> ElementId {
        self.panel
    }

    pub fn is_open(&self) -> bool {
        self.page.has_class(self.panel, MENU_PANEL_OPEN_CLASS)
    }

    /// Returns whether the menu is open afterwards.
    pub fn toggle(&self) -> bool {
        self.page.toggle_class(self.toggle, MENU_TOGGLE_ACTIVE_CLASS);
        let open = self.page.toggle_class(self.panel, MENU_PANEL_OPEN_CLASS);
        debug!(open, "mobile menu toggled");
        open
    }

    pub fn on_nav_link(&self) {
        if self.is_open() {
            self.toggle();
        }
    }

    /// Closes the open menu when the click landed outside both the panel and the toggle.
    pub fn on_document_click(&self, target: ElementId) {
        let inside =
            self.page.contains(self.panel, target) || self.page.contains(self.toggle, target);
        if !inside && self.is_open() {
            self.toggle();
        }
    }
}
