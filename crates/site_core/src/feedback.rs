use std::{sync::Arc, time::Duration};

use page_adapter::{NewNode, Page};
use shared::domain::{ElementId, FeedbackKind};
use tokio::time::Instant;
use tracing::debug;

pub const SENT_MESSAGE: &str = "Your message has been sent successfully!";
pub const REJECTED_MESSAGE: &str = "An error occurred. Please try again.";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to send message. Please check your connection.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub text: String,
    pub element: Option<ElementId>,
    pub expires_at: Instant,
}

impl Feedback {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Inserts feedback nodes right after an anchor node and removes each one after `lifetime`.
pub struct FeedbackPresenter {
    page: Arc<dyn Page>,
    anchor: ElementId,
    lifetime: Duration,
}

impl FeedbackPresenter {
    pub fn new(page: Arc<dyn Page>, anchor: ElementId, lifetime: Duration) -> Self {
        Self {
            page,
            anchor,
            lifetime,
        }
    }

    pub fn show(&self, kind: FeedbackKind, text: impl Into<String>) -> Feedback {
        let text = text.into();
        let node = NewNode::new("div")
            .with_classes(kind.css_classes())
            .with_text(text.clone());
        let element = self.page.insert_after(self.anchor, node);
        let expires_at = Instant::now() + self.lifetime;

        if let Some(element) = element {
            let page = Arc::clone(&self.page);
            tokio::spawn(async move {
                tokio::time::sleep_until(expires_at).await;
                if page.is_attached(element) {
                    page.remove(element);
                    debug!(element = element.0, "feedback dismissed");
                }
            });
        }

        Feedback {
            kind,
            text,
            element,
            expires_at,
        }
    }
}
