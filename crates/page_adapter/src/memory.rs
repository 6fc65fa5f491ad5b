use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use shared::domain::ElementId;
use tracing::trace;

use crate::{AnimationOptions, NewNode, NodeSpec, Page, PageFixture, ScrollBehavior, Target};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    dom_id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    offset_top: f64,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug, Default)]
struct Document {
    url: String,
    nodes: BTreeMap<ElementId, Node>,
    roots: Vec<ElementId>,
    next_id: u64,
    scroll_y: f64,
    resize_events: usize,
    scroll_requests: Vec<ScrollRequest>,
    animation_inits: Vec<AnimationOptions>,
}

impl Document {
    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    fn insert_spec(&mut self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let id = self.allocate();
        let mut classes = Vec::new();
        for class in spec.classes {
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        self.nodes.insert(
            id,
            Node {
                tag: spec.tag.to_ascii_lowercase(),
                dom_id: spec.id,
                classes,
                attributes: spec.attributes,
                styles: BTreeMap::new(),
                text: spec.text,
                value: spec.value,
                disabled: spec.disabled,
                offset_top: spec.offset_top,
                parent,
                children: Vec::new(),
            },
        );
        for child in spec.children {
            let child_id = self.insert_spec(Some(id), child);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    fn walk(&self, out: &mut Vec<ElementId>, ids: &[ElementId]) {
        for id in ids {
            out.push(*id);
            if let Some(node) = self.nodes.get(id) {
                self.walk(out, &node.children);
            }
        }
    }

    fn document_order(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(&mut out, &self.roots);
        out
    }

    fn ancestors(&self, id: ElementId) -> impl Iterator<Item = &Node> + '_ {
        let mut current = self.nodes.get(&id).and_then(|node| node.parent);
        std::iter::from_fn(move || {
            let node = self.nodes.get(&current?)?;
            current = node.parent;
            Some(node)
        })
    }

    fn matches(&self, id: ElementId, target: &Target) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let has_class = |class: &str| node.classes.iter().any(|c| c == class);
        let has_id = |dom_id: &str| node.dom_id.as_deref() == Some(dom_id);

        match target {
            Target::FilterButtons => has_class("filter-btn"),
            Target::ProjectItems => has_class("project-item"),
            Target::Counters => has_class("counter"),
            Target::AboutSection => has_id("about"),
            Target::ContactForm => has_id("contactForm"),
            Target::Field(field) => has_id(field.as_str()),
            Target::SubmitButton => {
                node.tag == "button"
                    && node.attributes.get("type").map(String::as_str) == Some("submit")
                    && self
                        .ancestors(id)
                        .any(|a| a.dom_id.as_deref() == Some("contactForm"))
            }
            Target::Header => node.tag == "header",
            Target::MenuToggle => has_class("navbar-toggler"),
            Target::MenuPanel => has_class("navbar-collapse"),
            Target::NavLinks => {
                has_class("nav-link")
                    && self
                        .ancestors(id)
                        .any(|a| a.classes.iter().any(|c| c == "navbar-nav"))
            }
            Target::BackToTop => has_id("backToTop"),
            Target::InPageAnchors => {
                node.tag == "a"
                    && node
                        .attributes
                        .get("href")
                        .is_some_and(|href| href.starts_with('#'))
            }
            Target::Id(dom_id) => has_id(dom_id),
        }
    }

    fn detach(&mut self, id: ElementId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        for child in node.children {
            self.detach(child);
        }
    }
}

/// In-memory [`Page`] with a small DOM: node tree, classes, attributes, inline styles, form
/// values, scroll position, and a record of the side effects controllers request.
#[derive(Debug, Default)]
pub struct MemoryPage {
    document: Mutex<Document>,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Document {
                url: url.into(),
                ..Document::default()
            }),
        }
    }

    pub fn from_fixture(fixture: PageFixture) -> Self {
        let page = Self::new(fixture.url);
        page.set_scroll_y(fixture.scroll_y);
        for node in fixture.nodes {
            page.append(None, node);
        }
        page
    }

    fn doc(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `spec` (and its children) under `parent`, or as a root node.
    pub fn append(&self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let mut doc = self.doc();
        let id = doc.insert_spec(parent, spec);
        let attached = parent
            .and_then(|parent| doc.nodes.get_mut(&parent))
            .map(|parent| parent.children.push(id))
            .is_some();
        if !attached {
            doc.roots.push(id);
        }
        id
    }

    pub fn element_by_id(&self, dom_id: &str) -> Option<ElementId> {
        self.query(&Target::Id(dom_id.to_string()))
    }

    pub fn tag(&self, element: ElementId) -> Option<String> {
        self.doc().nodes.get(&element).map(|node| node.tag.clone())
    }

    pub fn next_sibling(&self, element: ElementId) -> Option<ElementId> {
        let doc = self.doc();
        let siblings = match doc.nodes.get(&element)?.parent {
            Some(parent) => &doc.nodes.get(&parent)?.children,
            None => &doc.roots,
        };
        let index = siblings.iter().position(|id| *id == element)?;
        siblings.get(index + 1).copied()
    }

    /// Nodes hidden with `display: none` count as not visible.
    pub fn is_displayed(&self, element: ElementId) -> bool {
        self.style(element, "display").as_deref() != Some("none")
    }

    pub fn set_scroll_y(&self, scroll_y: f64) {
        self.doc().scroll_y = scroll_y;
    }

    pub fn resize_events(&self) -> usize {
        self.doc().resize_events
    }

    pub fn scroll_requests(&self) -> Vec<ScrollRequest> {
        self.doc().scroll_requests.clone()
    }

    pub fn animation_inits(&self) -> Vec<AnimationOptions> {
        self.doc().animation_inits.clone()
    }
}

impl Page for MemoryPage {
    fn document_url(&self) -> String {
        self.doc().url.clone()
    }

    fn query_all(&self, target: &Target) -> Vec<ElementId> {
        let doc = self.doc();
        doc.document_order()
            .into_iter()
            .filter(|id| doc.matches(*id, target))
            .collect()
    }

    fn matches(&self, element: ElementId, target: &Target) -> bool {
        self.doc().matches(element, target)
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        let doc = self.doc();
        let node = doc.nodes.get(&element)?;
        match name {
            "id" => node.dom_id.clone(),
            "class" => Some(node.classes.join(" ")),
            _ => node.attributes.get(name).cloned(),
        }
    }

    fn classes(&self, element: ElementId) -> Vec<String> {
        self.doc()
            .nodes
            .get(&element)
            .map(|node| node.classes.clone())
            .unwrap_or_default()
    }

    fn add_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&self, element: ElementId, class: &str) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.doc()
            .nodes
            .get(&element)
            .and_then(|node| node.styles.get(property).cloned())
    }

    fn set_style(&self, element: ElementId, property: &str, value: &str) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            trace!(element = element.0, property, value, "set style");
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn text(&self, element: ElementId) -> String {
        self.doc()
            .nodes
            .get(&element)
            .map(|node| node.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, element: ElementId, text: &str) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            node.text = text.to_string();
        }
    }

    fn value(&self, element: ElementId) -> String {
        self.doc()
            .nodes
            .get(&element)
            .map(|node| node.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, element: ElementId, value: &str) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            node.value = value.to_string();
        }
    }

    fn is_disabled(&self, element: ElementId) -> bool {
        self.doc()
            .nodes
            .get(&element)
            .is_some_and(|node| node.disabled)
    }

    fn set_disabled(&self, element: ElementId, disabled: bool) {
        if let Some(node) = self.doc().nodes.get_mut(&element) {
            node.disabled = disabled;
        }
    }

    fn insert_after(&self, anchor: ElementId, node: NewNode) -> Option<ElementId> {
        let mut doc = self.doc();
        let parent = doc.nodes.get(&anchor)?.parent;

        let mut spec = NodeSpec::new(node.tag).text(node.text);
        spec.classes = node.classes;
        let id = doc.insert_spec(parent, spec);

        let siblings = match parent {
            Some(parent) => &mut doc.nodes.get_mut(&parent)?.children,
            None => &mut doc.roots,
        };
        let index = siblings
            .iter()
            .position(|sibling| *sibling == anchor)
            .map_or(siblings.len(), |index| index + 1);
        siblings.insert(index, id);
        Some(id)
    }

    fn remove(&self, element: ElementId) {
        self.doc().detach(element);
    }

    fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let doc = self.doc();
        if !doc.nodes.contains_key(&element) {
            return false;
        }
        let mut current = Some(element);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = doc.nodes.get(&id).and_then(|node| node.parent);
        }
        false
    }

    fn is_attached(&self, element: ElementId) -> bool {
        self.doc().nodes.contains_key(&element)
    }

    fn offset_top(&self, element: ElementId) -> f64 {
        self.doc()
            .nodes
            .get(&element)
            .map_or(0.0, |node| node.offset_top)
    }

    fn scroll_y(&self) -> f64 {
        self.doc().scroll_y
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let mut doc = self.doc();
        doc.scroll_y = top.max(0.0);
        doc.scroll_requests.push(ScrollRequest { top, behavior });
    }

    fn dispatch_resize(&self) {
        self.doc().resize_events += 1;
    }

    fn init_scroll_animations(&self, options: &AnimationOptions) {
        self.doc().animation_inits.push(options.clone());
    }
}
