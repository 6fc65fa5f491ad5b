use super::*;

use async_trait::async_trait;
use page_adapter::{MemoryPage, NodeSpec};
use shared::protocol::ContactReply;
use tokio::time::sleep;
use url::Url;

use crate::transport::TransportError;

const LIFETIME: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy)]
enum Script {
    Reply(bool),
    NotJson,
}

struct ScriptedTransport {
    script: Script,
    latency: Duration,
    calls: Mutex<Vec<(Url, ContactFields)>>,
}

impl ScriptedTransport {
    fn new(script: Script) -> Self {
        Self {
            script,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn calls(&self) -> Vec<(Url, ContactFields)> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl ContactTransport for ScriptedTransport {
    async fn send(
        &self,
        action: &Url,
        fields: &ContactFields,
    ) -> Result<ContactReply, TransportError> {
        self.calls
            .lock()
            .expect("calls")
            .push((action.clone(), fields.clone()));
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        match self.script {
            Script::Reply(success) => Ok(ContactReply { success }),
            Script::NotJson => Err(ContactReply::from_slice(b"<html>").unwrap_err().into()),
        }
    }
}

struct ContactPage {
    page: Arc<MemoryPage>,
    form: ElementId,
    button: ElementId,
}

fn contact_page(action: &str) -> ContactPage {
    let page = Arc::new(MemoryPage::new("http://localhost/portfolio/"));
    let section = page.append(None, NodeSpec::new("section").id("contact"));
    let form = page.append(
        Some(section),
        NodeSpec::new("form")
            .id("contactForm")
            .attr("action", action)
            .child(NodeSpec::new("input").id("name"))
            .child(NodeSpec::new("input").id("email"))
            .child(NodeSpec::new("input").id("subject"))
            .child(NodeSpec::new("textarea").id("message"))
            .child(
                NodeSpec::new("button")
                    .attr("type", "submit")
                    .text("Send Message"),
            ),
    );
    let button = page.query(&Target::SubmitButton).expect("submit button");
    ContactPage { page, form, button }
}

impl ContactPage {
    fn fill(&self, name: &str, email: &str, subject: &str, message: &str) {
        for (id, value) in [
            ("name", name),
            ("email", email),
            ("subject", subject),
            ("message", message),
        ] {
            let field = self.page.element_by_id(id).expect("field");
            self.page.set_value(field, value);
        }
    }

    fn value(&self, id: &str) -> String {
        self.page.value(self.page.element_by_id(id).expect("field"))
    }

    fn feedback_nodes(&self) -> Vec<ElementId> {
        let mut nodes = Vec::new();
        let mut cursor = self.page.next_sibling(self.form);
        while let Some(node) = cursor {
            if self.page.has_class(node, "alert") {
                nodes.push(node);
            }
            cursor = self.page.next_sibling(node);
        }
        nodes
    }

    fn controller(&self, transport: Arc<ScriptedTransport>) -> ContactFormController {
        ContactFormController::attach(self.page.clone(), transport, LIFETIME).expect("form")
    }
}

#[test]
fn inert_without_contact_form() {
    let page = Arc::new(MemoryPage::new("http://localhost/"));
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    assert!(ContactFormController::attach(page, transport, LIFETIME).is_none());
}

#[tokio::test(start_paused = true)]
async fn missing_field_never_hits_the_network() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport.clone());
    fixture.fill("Ada", "ada@example.com", "  ", "Hello");

    let outcome = controller.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Invalid(ValidationError::MissingField {
            field: FieldName::Subject
        })
    );
    assert!(transport.calls().is_empty());
    let feedback = controller.last_feedback().expect("feedback");
    assert_eq!(feedback.kind, FeedbackKind::Error);
    assert_eq!(feedback.text, "Please fill in all fields");
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(controller.phase(), FormPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn bad_email_never_hits_the_network() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport.clone());

    for email in ["ada.example.com", "ada@example"] {
        fixture.fill("Ada", email, "Hi", "Hello");
        let outcome = controller.submit().await;
        assert_eq!(outcome, SubmitOutcome::Invalid(ValidationError::BadEmail));
    }

    assert!(transport.calls().is_empty());
    assert_eq!(
        controller.last_feedback().expect("feedback").text,
        "Please enter a valid email address"
    );
    assert_eq!(fixture.feedback_nodes().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn success_clears_fields_and_restores_control() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport.clone());
    fixture.fill(" Ada ", "ada@example.com", "Hi", "Hello there");

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::Sent);
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.as_str(), "http://localhost/contact/");
    assert_eq!(calls[0].1.name, "Ada");
    for id in ["name", "email", "subject", "message"] {
        assert_eq!(fixture.value(id), "", "{id} cleared");
    }
    let feedback = controller.last_feedback().expect("feedback");
    assert_eq!(feedback.kind, FeedbackKind::Success);
    assert_eq!(feedback.text, "Your message has been sent successfully!");
    let node = feedback.element.expect("feedback node");
    assert!(fixture.page.has_class(node, "alert-success"));
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), "Send Message");
}

#[tokio::test(start_paused = true)]
async fn server_rejection_keeps_fields() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(false)));
    let controller = fixture.controller(transport);
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    let outcome = controller.submit().await;

    assert_eq!(outcome, SubmitOutcome::ServerRejected);
    assert_eq!(fixture.value("name"), "Ada");
    assert_eq!(fixture.value("message"), "Hello");
    let feedback = controller.last_feedback().expect("feedback");
    assert_eq!(feedback.text, "An error occurred. Please try again.");
    assert!(fixture
        .page
        .has_class(feedback.element.expect("node"), "alert-danger"));
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), "Send Message");
}

#[tokio::test(start_paused = true)]
async fn transport_failure_reports_connection_problem() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::NotJson));
    let controller = fixture.controller(transport);
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    let outcome = controller.submit().await;

    assert!(matches!(outcome, SubmitOutcome::TransportFailed(_)));
    assert_eq!(
        controller.last_feedback().expect("feedback").text,
        "Failed to send message. Please check your connection."
    );
    assert_eq!(fixture.value("email"), "ada@example.com");
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), "Send Message");
}

#[tokio::test(start_paused = true)]
async fn unresolvable_action_is_a_transport_failure() {
    let fixture = contact_page("http://[::1");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport.clone());
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    let outcome = controller.submit().await;

    assert!(matches!(outcome, SubmitOutcome::TransportFailed(_)));
    assert!(transport.calls().is_empty());
    assert!(!fixture.page.is_disabled(fixture.button));
}

#[tokio::test(start_paused = true)]
async fn control_shows_loading_label_while_in_flight() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(
        ScriptedTransport::new(Script::Reply(true)).with_latency(Duration::from_millis(500)),
    );
    let controller = fixture.controller(transport.clone());
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    let pending = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    while !controller.is_in_flight() {
        tokio::task::yield_now().await;
    }
    while controller.phase() != FormPhase::Submitting {
        tokio::task::yield_now().await;
    }

    assert!(fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), SENDING_LABEL);
    assert_eq!(
        controller.pending_fields().map(|f| f.email),
        Some("ada@example.com".to_string())
    );

    let busy = controller.submit().await;
    assert_eq!(busy, SubmitOutcome::Busy);

    assert_eq!(pending.await.expect("join"), SubmitOutcome::Sent);
    assert_eq!(transport.calls().len(), 1);
    assert!(!controller.is_in_flight());
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), "Send Message");
}

#[tokio::test(start_paused = true)]
async fn dropped_submission_still_restores_control() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(
        ScriptedTransport::new(Script::Reply(true)).with_latency(Duration::from_secs(60)),
    );
    let controller = fixture.controller(transport);
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    let cut_short =
        tokio::time::timeout(Duration::from_millis(10), controller.submit()).await;

    assert!(cut_short.is_err());
    assert!(!controller.is_in_flight());
    assert_eq!(controller.phase(), FormPhase::Idle);
    assert!(!fixture.page.is_disabled(fixture.button));
    assert_eq!(fixture.page.text(fixture.button), "Send Message");
}

#[tokio::test(start_paused = true)]
async fn feedback_is_removed_after_its_lifetime_and_not_before() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport);
    fixture.fill("", "", "", "");

    controller.submit().await;
    let node = controller
        .last_feedback()
        .and_then(|f| f.element)
        .expect("feedback node");
    assert_eq!(fixture.page.next_sibling(fixture.form), Some(node));

    sleep(Duration::from_millis(4999)).await;
    assert!(fixture.page.is_attached(node));
    assert!(controller.last_feedback().is_some());

    sleep(Duration::from_millis(2)).await;
    assert!(!fixture.page.is_attached(node));
    assert!(controller.last_feedback().is_none());
}

#[tokio::test(start_paused = true)]
async fn feedback_dismissed_early_is_left_alone_by_its_timer() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport);
    fixture.fill("", "", "", "");

    controller.submit().await;
    let node = controller
        .last_feedback()
        .and_then(|f| f.element)
        .expect("feedback node");
    fixture.page.remove(node);
    assert!(fixture.feedback_nodes().is_empty());

    sleep(Duration::from_millis(5001)).await;
    assert!(!fixture.page.is_attached(node));
    assert_eq!(fixture.page.next_sibling(fixture.form), None);
    assert!(controller.last_feedback().is_none());
}

#[tokio::test(start_paused = true)]
async fn each_attempt_adds_its_own_feedback_node() {
    let fixture = contact_page("/contact/");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport);

    controller.submit().await;
    sleep(Duration::from_millis(1000)).await;
    controller.submit().await;
    assert_eq!(fixture.feedback_nodes().len(), 2);

    sleep(Duration::from_millis(4500)).await;
    assert_eq!(fixture.feedback_nodes().len(), 1);

    sleep(Duration::from_millis(1000)).await;
    assert!(fixture.feedback_nodes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_action_posts_to_the_document() {
    let fixture = contact_page("");
    let transport = Arc::new(ScriptedTransport::new(Script::Reply(true)));
    let controller = fixture.controller(transport.clone());
    fixture.fill("Ada", "ada@example.com", "Hi", "Hello");

    controller.submit().await;

    assert_eq!(
        transport.calls()[0].0.as_str(),
        "http://localhost/portfolio/"
    );
}
