//! Page adapter: the only way controllers observe or mutate the page.
//!
//! A browser binding implements [`Page`] over the real DOM; [`MemoryPage`] implements it over an
//! in-memory node tree for tests and the headless driver. Every operation on a missing or removed
//! element is a no-op (or returns an empty value), so controllers never fail on page structure.

use serde::{Deserialize, Serialize};
use shared::domain::{ElementId, FieldName};

mod fixture;
mod memory;

pub use fixture::{NodeSpec, PageFixture};
pub use memory::{MemoryPage, ScrollRequest};

/// Node sets the site relies on. `css()` is the selector a DOM binding resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    FilterButtons,
    ProjectItems,
    Counters,
    AboutSection,
    ContactForm,
    Field(FieldName),
    SubmitButton,
    Header,
    MenuToggle,
    MenuPanel,
    NavLinks,
    BackToTop,
    InPageAnchors,
    Id(String),
}

impl Target {
    pub fn css(&self) -> String {
        match self {
            Target::FilterButtons => ".filter-btn".into(),
            Target::ProjectItems => ".project-item".into(),
            Target::Counters => ".counter".into(),
            Target::AboutSection => "#about".into(),
            Target::ContactForm => "#contactForm".into(),
            Target::Field(field) => format!("#{}", field.as_str()),
            Target::SubmitButton => "#contactForm button[type=\"submit\"]".into(),
            Target::Header => "header".into(),
            Target::MenuToggle => ".navbar-toggler".into(),
            Target::MenuPanel => ".navbar-collapse".into(),
            Target::NavLinks => ".navbar-nav .nav-link".into(),
            Target::BackToTop => "#backToTop".into(),
            Target::InPageAnchors => "a[href^=\"#\"]".into(),
            Target::Id(id) => format!("#{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollBehavior {
    Smooth,
    Instant,
}

/// Options handed to the external scroll-animation library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationOptions {
    pub duration_ms: u64,
    pub easing: String,
    pub once: bool,
    pub mirror: bool,
}

impl Default for AnimationOptions {
    fn default() -> Self {
        Self {
            duration_ms: 800,
            easing: "ease-in-out".into(),
            once: true,
            mirror: false,
        }
    }
}

/// A node created by a controller, e.g. a feedback message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNode {
    pub tag: String,
    pub classes: Vec<String>,
    pub text: String,
}

impl NewNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_classes<'a>(mut self, classes: impl IntoIterator<Item = &'a str>) -> Self {
        self.classes = classes.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

pub trait Page: Send + Sync {
    /// Absolute URL of the current document, used to resolve relative form actions.
    fn document_url(&self) -> String;

    /// Matching nodes in document order.
    fn query_all(&self, target: &Target) -> Vec<ElementId>;

    fn query(&self, target: &Target) -> Option<ElementId> {
        self.query_all(target).into_iter().next()
    }

    /// Whether `element` is one of the nodes `target` selects.
    fn matches(&self, element: ElementId, target: &Target) -> bool {
        self.query_all(target).contains(&element)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    fn classes(&self, element: ElementId) -> Vec<String>;

    fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.classes(element).iter().any(|c| c == class)
    }

    fn add_class(&self, element: ElementId, class: &str);

    fn remove_class(&self, element: ElementId, class: &str);

    /// Returns whether the class is present afterwards.
    fn toggle_class(&self, element: ElementId, class: &str) -> bool {
        if self.has_class(element, class) {
            self.remove_class(element, class);
            false
        } else {
            self.add_class(element, class);
            true
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String>;

    fn set_style(&self, element: ElementId, property: &str, value: &str);

    fn text(&self, element: ElementId) -> String;

    fn set_text(&self, element: ElementId, text: &str);

    /// Current value of a form control.
    fn value(&self, element: ElementId) -> String;

    fn set_value(&self, element: ElementId, value: &str);

    fn is_disabled(&self, element: ElementId) -> bool;

    fn set_disabled(&self, element: ElementId, disabled: bool);

    /// Inserts `node` as the next sibling of `anchor`.
    fn insert_after(&self, anchor: ElementId, node: NewNode) -> Option<ElementId>;

    fn remove(&self, element: ElementId);

    /// Whether `element` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool;

    fn is_attached(&self, element: ElementId) -> bool;

    fn offset_top(&self, element: ElementId) -> f64;

    fn scroll_y(&self) -> f64;

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    /// Layout-recalculation signal for external grid engines (a window `resize` event).
    fn dispatch_resize(&self);

    fn init_scroll_animations(&self, options: &AnimationOptions);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_follow_the_page_markup() {
        assert_eq!(Target::Field(FieldName::Email).css(), "#email");
        assert_eq!(Target::Id("projects".into()).css(), "#projects");
        assert_eq!(Target::NavLinks.css(), ".navbar-nav .nav-link");
    }
}
