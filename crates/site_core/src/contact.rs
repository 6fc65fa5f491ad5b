//! Contact form controller: local validation, one in-flight submission at a time, feedback.
//!
//! Phases run `Idle -> Validating -> Idle` when validation fails and
//! `Idle -> Validating -> Submitting -> Idle` otherwise. Leaving `Submitting` always re-enables
//! the submit control and restores its label, including when the submission future is dropped.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use page_adapter::{Page, Target};
use shared::{
    domain::{ContactFields, ElementId, FeedbackKind, FieldName},
    error::ValidationError,
};
use tracing::{debug, info, warn};

use crate::{
    feedback::{
        Feedback, FeedbackPresenter, REJECTED_MESSAGE, SENT_MESSAGE, TRANSPORT_FAILURE_MESSAGE,
    },
    transport::{resolve_action, ContactTransport},
    validation::validate,
};

pub const SENDING_LABEL: &str = "Sending...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Invalid(ValidationError),
    ServerRejected,
    TransportFailed(String),
    /// Another submission was still in flight; nothing happened.
    Busy,
}

#[derive(Debug)]
struct FormState {
    phase: FormPhase,
    fields: Option<ContactFields>,
    last_feedback: Option<Feedback>,
}

struct Inner {
    page: Arc<dyn Page>,
    form: ElementId,
    transport: Arc<dyn ContactTransport>,
    feedback: FeedbackPresenter,
    in_flight: AtomicBool,
    state: Mutex<FormState>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, kind: FeedbackKind, text: &str) {
        let feedback = self.feedback.show(kind, text);
        self.state().last_feedback = Some(feedback);
    }
}

#[derive(Clone)]
pub struct ContactFormController {
    inner: Arc<Inner>,
}

impl ContactFormController {
    /// `None` when the page has no contact form.
    pub fn attach(
        page: Arc<dyn Page>,
        transport: Arc<dyn ContactTransport>,
        feedback_lifetime: Duration,
    ) -> Option<Self> {
        let Some(form) = page.query(&Target::ContactForm) else {
            debug!("contact form absent; submission handler inert");
            return None;
        };

        Some(Self {
            inner: Arc::new(Inner {
                feedback: FeedbackPresenter::new(Arc::clone(&page), form, feedback_lifetime),
                page,
                form,
                transport,
                in_flight: AtomicBool::new(false),
                state: Mutex::new(FormState {
                    phase: FormPhase::Idle,
                    fields: None,
                    last_feedback: None,
                }),
            }),
        })
    }

    pub fn form(&self) -> ElementId {
        self.inner.form
    }

    pub fn phase(&self) -> FormPhase {
        self.inner.state().phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Fields of the submission in progress, if any.
    pub fn pending_fields(&self) -> Option<ContactFields> {
        self.inner.state().fields.clone()
    }

    /// Most recent feedback, until it expires.
    pub fn last_feedback(&self) -> Option<Feedback> {
        let mut state = self.inner.state();
        if state.last_feedback.as_ref().is_some_and(Feedback::is_expired) {
            state.last_feedback = None;
        }
        state.last_feedback.clone()
    }

    /// Current values of the four fields. Absent fields read as empty.
    pub fn read_fields(&self) -> ContactFields {
        let page = &self.inner.page;
        let value = |field: FieldName| {
            page.query(&Target::Field(field))
                .map(|element| page.value(element))
                .unwrap_or_default()
        };
        ContactFields {
            name: value(FieldName::Name),
            email: value(FieldName::Email),
            subject: value(FieldName::Subject),
            message: value(FieldName::Message),
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let fields = self.read_fields();
        self.submit_fields(fields).await
    }

    pub async fn submit_fields(&self, fields: ContactFields) -> SubmitOutcome {
        let inner = self.inner.as_ref();
        if inner
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("contact submission already in flight; ignoring submit");
            return SubmitOutcome::Busy;
        }
        let mut submission = Submission::begin(inner);

        let fields = fields.trimmed();
        {
            let mut state = inner.state();
            state.phase = FormPhase::Validating;
            state.last_feedback = None;
        }

        if let Err(err) = validate(&fields) {
            debug!(reason = err.code(), "contact form rejected locally");
            inner.notify(FeedbackKind::Error, &err.to_string());
            return SubmitOutcome::Invalid(err);
        }

        {
            let mut state = inner.state();
            state.phase = FormPhase::Submitting;
            state.fields = Some(fields.clone());
        }
        submission.lock_submit_control();

        let action_attr = inner.page.attribute(inner.form, "action");
        let sent = match resolve_action(&inner.page.document_url(), action_attr.as_deref()) {
            Ok(action) => {
                info!(%action, "submitting contact form");
                inner.transport.send(&action, &fields).await
            }
            Err(err) => Err(err),
        };

        match sent {
            Ok(reply) if reply.success => {
                self.clear_fields();
                inner.notify(FeedbackKind::Success, SENT_MESSAGE);
                info!("contact message delivered");
                SubmitOutcome::Sent
            }
            Ok(_) => {
                warn!("contact endpoint rejected the message");
                inner.notify(FeedbackKind::Error, REJECTED_MESSAGE);
                SubmitOutcome::ServerRejected
            }
            Err(err) => {
                warn!(error = %err, "contact message could not be delivered");
                inner.notify(FeedbackKind::Error, TRANSPORT_FAILURE_MESSAGE);
                SubmitOutcome::TransportFailed(err.to_string())
            }
        }
    }

    fn clear_fields(&self) {
        let page = &self.inner.page;
        for field in FieldName::ALL {
            if let Some(element) = page.query(&Target::Field(field)) {
                page.set_value(element, "");
            }
        }
    }
}

/// Holds the in-flight flag for one submit attempt and undoes its UI effects on drop.
struct Submission<'a> {
    inner: &'a Inner,
    locked_control: Option<(ElementId, String)>,
}

impl<'a> Submission<'a> {
    fn begin(inner: &'a Inner) -> Self {
        Self {
            inner,
            locked_control: None,
        }
    }

    fn lock_submit_control(&mut self) {
        let page = &self.inner.page;
        let Some(button) = page.query(&Target::SubmitButton) else {
            return;
        };
        let label = page.text(button);
        page.set_disabled(button, true);
        page.set_text(button, SENDING_LABEL);
        self.locked_control = Some((button, label));
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if let Some((button, label)) = self.locked_control.take() {
            self.inner.page.set_disabled(button, false);
            self.inner.page.set_text(button, &label);
        }
        {
            let mut state = self.inner.state();
            state.phase = FormPhase::Idle;
            state.fields = None;
        }
        self.inner.in_flight.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/contact_tests.rs"]
mod tests;
