use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use page_adapter::{MemoryPage, Page, PageFixture, Target};
use shared::domain::{ElementId, FieldName};
use site_core::{load_settings, HttpContactTransport, PageEvent, Site};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Page fixture (JSON node tree).
    #[arg(long, default_value = "apps/headless/fixtures/portfolio.json")]
    fixture: PathBuf,
    /// Settings file; `site.toml` in the working directory is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Click the filter button carrying `category` and list the visible projects.
    Filter { category: String },
    /// Scroll to `y` and report the header and back-to-top state.
    Scroll { y: f64 },
    /// Fill the contact form and submit it to the form's action.
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
    },
    /// Bring the about section into view and print the counters once they finish.
    Counters,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let fixture = PageFixture::load(&args.fixture)?;
    let page = Arc::new(MemoryPage::from_fixture(fixture));
    let transport = Arc::new(
        HttpContactTransport::new(settings.request_timeout())
            .context("failed to build HTTP client")?,
    );
    let site = Site::initialize(page.clone(), transport, &settings);

    match args.command {
        Command::Filter { category } => {
            let Some(button) = page
                .query_all(&Target::FilterButtons)
                .into_iter()
                .find(|b| page.attribute(*b, "data-filter").as_deref() == Some(category.as_str()))
            else {
                bail!("no filter button for category '{category}'");
            };
            site.dispatch(PageEvent::FilterClicked(button)).settled().await;

            for item in page.query_all(&Target::ProjectItems) {
                let state = if page.is_displayed(item) { "shown" } else { "hidden" };
                println!("{:<8} {}", state, describe(&page, item));
            }
        }
        Command::Scroll { y } => {
            page.set_scroll_y(y);
            site.dispatch(PageEvent::Scrolled);
            if let Some(header) = page.query(&Target::Header) {
                println!(
                    "header scrolled: {}",
                    page.has_class(header, "header-scrolled")
                );
            }
            if let Some(control) = page.query(&Target::BackToTop) {
                println!("back-to-top visible: {}", page.has_class(control, "visible"));
            }
        }
        Command::Submit {
            name,
            email,
            subject,
            message,
        } => {
            for (field, value) in [
                (FieldName::Name, name),
                (FieldName::Email, email),
                (FieldName::Subject, subject),
                (FieldName::Message, message),
            ] {
                if let Some(element) = page.query(&Target::Field(field)) {
                    page.set_value(element, &value);
                }
            }

            let outcome = site.dispatch(PageEvent::FormSubmitted).settled().await;
            let Some(outcome) = outcome else {
                bail!("page has no contact form");
            };
            println!("outcome: {outcome:?}");
            if let Some(feedback) = site.contact().and_then(|c| c.last_feedback()) {
                println!("feedback ({:?}): {}", feedback.kind, feedback.text);
            }
        }
        Command::Counters => {
            site.dispatch(PageEvent::AboutIntersection { intersecting: true })
                .settled()
                .await;
            for counter in page.query_all(&Target::Counters) {
                println!("{}", page.text(counter));
            }
        }
    }

    Ok(())
}

fn describe(page: &MemoryPage, element: ElementId) -> String {
    match page.attribute(element, "id") {
        Some(id) => format!("#{id} [{}]", page.classes(element).join(" ")),
        None => format!("[{}]", page.classes(element).join(" ")),
    }
}
