//! Interactivity for the portfolio page: project filtering, the contact form, and the
//! scroll/navigation behaviors around them. Every behavior talks to the page through
//! [`page_adapter::Page`].

pub mod config;
pub mod contact;
pub mod counters;
pub mod feedback;
pub mod filter;
pub mod navigation;
pub mod scroll_chrome;
pub mod site;
pub mod transport;
pub mod validation;

pub use config::{load_settings, SiteSettings};
pub use contact::{ContactFormController, FormPhase, SubmitOutcome};
pub use filter::{FilterController, FilterTiming, Transition};
pub use site::{Dispatched, PageEvent, Site};
pub use transport::{ContactTransport, HttpContactTransport, TransportError};
