use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use page_adapter::{MemoryPage, NodeSpec, Page, PageFixture, Target};
use shared::{
    domain::{ContactFields, FieldName},
    protocol::ContactReply,
};
use site_core::{
    ContactTransport, PageEvent, Site, SiteSettings, SubmitOutcome, TransportError,
};
use url::Url;

#[derive(Default)]
struct CountingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl ContactTransport for CountingTransport {
    async fn send(
        &self,
        _action: &Url,
        _fields: &ContactFields,
    ) -> Result<ContactReply, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ContactReply { success: true })
    }
}

fn portfolio() -> Arc<MemoryPage> {
    let fixture = PageFixture::from_json(include_str!("fixtures/portfolio.json")).expect("fixture");
    Arc::new(MemoryPage::from_fixture(fixture))
}

fn site(page: &Arc<MemoryPage>, transport: &Arc<CountingTransport>) -> Site {
    Site::initialize(page.clone(), transport.clone(), &SiteSettings::default())
}

#[tokio::test(start_paused = true)]
async fn initialization_runs_scroll_animations_once() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);

    assert!(!site.init_scroll_animations());
    let inits = page.animation_inits();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].duration_ms, 800);
    assert_eq!(inits[0].easing, "ease-in-out");
    assert!(inits[0].once);
    assert!(!inits[0].mirror);
}

#[tokio::test(start_paused = true)]
async fn filter_click_routes_to_filter_controller() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);
    let web = page
        .query_all(&Target::FilterButtons)
        .into_iter()
        .find(|b| page.attribute(*b, "data-filter").as_deref() == Some("web"))
        .expect("web button");

    let dispatched = site.dispatch(PageEvent::FilterClicked(web));
    assert!(!dispatched.default_prevented);
    dispatched.settled().await;

    let visible: Vec<_> = page
        .query_all(&Target::ProjectItems)
        .into_iter()
        .filter(|item| page.is_displayed(*item))
        .map(|item| page.attribute(item, "id").unwrap_or_default())
        .collect();
    assert_eq!(visible, vec!["shop", "blog"]);
    assert_eq!(page.resize_events(), 1);
}

#[tokio::test(start_paused = true)]
async fn submit_is_prevented_and_delivered() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);
    for (field, value) in [
        (FieldName::Name, "Ada"),
        (FieldName::Email, "ada@example.com"),
        (FieldName::Subject, "Hello"),
        (FieldName::Message, "Nice work"),
    ] {
        let element = page.query(&Target::Field(field)).expect("field");
        page.set_value(element, value);
    }

    let dispatched = site.dispatch(PageEvent::FormSubmitted);
    assert!(dispatched.default_prevented);
    assert_eq!(dispatched.settled().await, Some(SubmitOutcome::Sent));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn scroll_updates_header_and_back_to_top() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);
    let header = page.query(&Target::Header).expect("header");
    let back_to_top = page.query(&Target::BackToTop).expect("back to top");

    page.set_scroll_y(150.0);
    site.dispatch(PageEvent::Scrolled);
    assert!(page.has_class(header, "header-scrolled"));
    assert!(!page.has_class(back_to_top, "visible"));

    page.set_scroll_y(900.0);
    site.dispatch(PageEvent::Scrolled);
    assert!(page.has_class(back_to_top, "visible"));

    let dispatched = site.dispatch(PageEvent::BackToTopClicked);
    assert!(dispatched.default_prevented);
    assert_eq!(page.scroll_y(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn anchors_and_menu() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);
    let link = page.query(&Target::NavLinks).expect("nav link");
    let panel = page.query(&Target::MenuPanel).expect("panel");
    let hero = page.element_by_id("home").expect("hero");

    site.dispatch(PageEvent::MenuToggleClicked);
    assert!(page.has_class(panel, "show"));

    let dispatched = site.dispatch(PageEvent::AnchorClicked(link));
    assert!(dispatched.default_prevented);
    site.dispatch(PageEvent::NavLinkClicked(link));
    assert!(!page.has_class(panel, "show"));
    assert_eq!(page.scroll_y(), 600.0 - 70.0);

    site.dispatch(PageEvent::MenuToggleClicked);
    site.dispatch(PageEvent::DocumentClicked(hero));
    assert!(!page.has_class(panel, "show"));
}

#[tokio::test(start_paused = true)]
async fn links_leaving_the_page_keep_their_default_action() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);
    let cv = page.append(None, NodeSpec::new("a").attr("href", "https://example.com/cv.pdf"));
    let admin = page.append(None, NodeSpec::new("a").attr("href", "/admin/"));

    for link in [cv, admin] {
        let dispatched = site.dispatch(PageEvent::AnchorClicked(link));
        assert!(!dispatched.default_prevented);
        assert!(!dispatched.has_pending_work());
    }
    assert!(page.scroll_requests().is_empty());

    let about = page
        .query_all(&Target::InPageAnchors)
        .into_iter()
        .find(|a| page.attribute(*a, "href").as_deref() == Some("#about"))
        .expect("about anchor");
    assert!(site.dispatch(PageEvent::AnchorClicked(about)).default_prevented);
}

#[tokio::test(start_paused = true)]
async fn counters_start_on_first_intersection_only() {
    let page = portfolio();
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);

    let first = site.dispatch(PageEvent::AboutIntersection { intersecting: true });
    assert!(first.has_pending_work());
    let second = site.dispatch(PageEvent::AboutIntersection { intersecting: true });
    assert!(!second.has_pending_work());
    first.settled().await;

    let counts: Vec<_> = page
        .query_all(&Target::Counters)
        .into_iter()
        .map(|c| page.text(c))
        .collect();
    assert_eq!(counts, vec!["25", "120"]);
}

#[tokio::test(start_paused = true)]
async fn empty_page_is_inert() {
    let page = Arc::new(MemoryPage::new("http://localhost/"));
    page.append(None, NodeSpec::new("main"));
    let transport = Arc::new(CountingTransport::default());
    let site = site(&page, &transport);

    for event in [
        PageEvent::FormSubmitted,
        PageEvent::Scrolled,
        PageEvent::MenuToggleClicked,
        PageEvent::BackToTopClicked,
        PageEvent::AboutIntersection { intersecting: true },
    ] {
        let dispatched = site.dispatch(event);
        assert!(!dispatched.has_pending_work());
        assert!(!dispatched.default_prevented);
    }
    assert!(site.filter().is_none());
    assert!(site.contact().is_none());
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}
