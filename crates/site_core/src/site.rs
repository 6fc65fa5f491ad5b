//! Single page initializer and event router.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use page_adapter::{AnimationOptions, Page, Target};
use shared::domain::ElementId;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    config::SiteSettings,
    contact::{ContactFormController, SubmitOutcome},
    counters::CounterAnimation,
    filter::{FilterController, FilterTiming, Transition},
    navigation::{AnchorScroller, MobileMenu},
    scroll_chrome::{BackToTop, StickyHeader},
    transport::ContactTransport,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    FilterClicked(ElementId),
    FormSubmitted,
    Scrolled,
    AnchorClicked(ElementId),
    MenuToggleClicked,
    NavLinkClicked(ElementId),
    DocumentClicked(ElementId),
    BackToTopClicked,
    AboutIntersection { intersecting: bool },
}

enum Pending {
    Transition(Transition),
    Submission(JoinHandle<SubmitOutcome>),
    Task(JoinHandle<()>),
}

/// Result of routing one event.
pub struct Dispatched {
    /// Whether the event's default browser action must be suppressed.
    pub default_prevented: bool,
    pending: Option<Pending>,
}

impl Dispatched {
    fn done(default_prevented: bool) -> Self {
        Self {
            default_prevented,
            pending: None,
        }
    }

    fn pending(default_prevented: bool, pending: Pending) -> Self {
        Self {
            default_prevented,
            pending: Some(pending),
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.pending.is_some()
    }

    /// Waits for the work the event started. Yields the outcome when it was a form submission.
    pub async fn settled(self) -> Option<SubmitOutcome> {
        match self.pending? {
            Pending::Transition(transition) => {
                transition.settled().await;
                None
            }
            Pending::Submission(task) => task.await.ok(),
            Pending::Task(task) => {
                let _ = task.await;
                None
            }
        }
    }
}

pub struct Site {
    page: Arc<dyn Page>,
    animations_initialized: AtomicBool,
    filter: Option<FilterController>,
    contact: Option<ContactFormController>,
    counters: Option<CounterAnimation>,
    header: Option<StickyHeader>,
    back_to_top: Option<BackToTop>,
    anchors: AnchorScroller,
    menu: Option<MobileMenu>,
}

impl Site {
    /// Captures the page once and wires every behavior whose nodes exist.
    pub fn initialize(
        page: Arc<dyn Page>,
        transport: Arc<dyn ContactTransport>,
        settings: &SiteSettings,
    ) -> Self {
        let site = Self {
            filter: FilterController::attach(
                Arc::clone(&page),
                FilterTiming::from_settings(settings),
            ),
            contact: ContactFormController::attach(
                Arc::clone(&page),
                transport,
                settings.feedback_lifetime(),
            ),
            counters: CounterAnimation::attach(
                Arc::clone(&page),
                settings.counter_steps,
                settings.counter_tick(),
            ),
            header: StickyHeader::attach(Arc::clone(&page), settings.header_scroll_threshold),
            back_to_top: BackToTop::attach(Arc::clone(&page), settings.back_to_top_threshold),
            anchors: AnchorScroller::new(Arc::clone(&page), settings.anchor_offset),
            menu: MobileMenu::attach(Arc::clone(&page)),
            animations_initialized: AtomicBool::new(false),
            page,
        };
        site.init_scroll_animations();

        info!(
            filter = site.filter.is_some(),
            contact = site.contact.is_some(),
            counters = site.counters.is_some(),
            header = site.header.is_some(),
            back_to_top = site.back_to_top.is_some(),
            menu = site.menu.is_some(),
            "site initialized"
        );
        site
    }

    /// Initializes the scroll-animation library; later calls do nothing.
    pub fn init_scroll_animations(&self) -> bool {
        if self.animations_initialized.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.page
            .init_scroll_animations(&AnimationOptions::default());
        true
    }

    pub fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }

    pub fn contact(&self) -> Option<&ContactFormController> {
        self.contact.as_ref()
    }

    pub fn menu(&self) -> Option<&MobileMenu> {
        self.menu.as_ref()
    }

    pub fn back_to_top(&self) -> Option<&BackToTop> {
        self.back_to_top.as_ref()
    }

    pub fn dispatch(&self, event: PageEvent) -> Dispatched {
        debug!(?event, "dispatching page event");
        match event {
            PageEvent::FilterClicked(button) => match &self.filter {
                Some(filter) if filter.owns_button(button) => {
                    Dispatched::pending(false, Pending::Transition(filter.click(button)))
                }
                _ => Dispatched::done(false),
            },
            PageEvent::FormSubmitted => match &self.contact {
                Some(contact) => {
                    let contact = contact.clone();
                    let task = tokio::spawn(async move { contact.submit().await });
                    Dispatched::pending(true, Pending::Submission(task))
                }
                None => Dispatched::done(false),
            },
            PageEvent::Scrolled => {
                if let Some(header) = &self.header {
                    header.on_scroll();
                }
                if let Some(back_to_top) = &self.back_to_top {
                    back_to_top.on_scroll();
                }
                Dispatched::done(false)
            }
            PageEvent::AnchorClicked(anchor) => {
                if !self.page.matches(anchor, &Target::InPageAnchors) {
                    return Dispatched::done(false);
                }
                self.anchors.on_click(anchor);
                Dispatched::done(true)
            }
            PageEvent::MenuToggleClicked => {
                if let Some(menu) = &self.menu {
                    menu.toggle();
                }
                Dispatched::done(false)
            }
            PageEvent::NavLinkClicked(_) => {
                if let Some(menu) = &self.menu {
                    menu.on_nav_link();
                }
                Dispatched::done(false)
            }
            PageEvent::DocumentClicked(target) => {
                if let Some(menu) = &self.menu {
                    menu.on_document_click(target);
                }
                Dispatched::done(false)
            }
            PageEvent::BackToTopClicked => match &self.back_to_top {
                Some(back_to_top) => {
                    back_to_top.on_click();
                    Dispatched::done(true)
                }
                None => Dispatched::done(false),
            },
            PageEvent::AboutIntersection { intersecting } => {
                match self
                    .counters
                    .as_ref()
                    .and_then(|counters| counters.on_about_intersection(intersecting))
                {
                    Some(task) => Dispatched::pending(false, Pending::Task(task)),
                    None => Dispatched::done(false),
                }
            }
        }
    }
}
