//! In-memory page used for headless runs and tests

use super::selector::{Selector, SelectorSubject};
use super::{NodeId, Page};
use std::collections::BTreeMap;

const FORM_CONTROLS: [&str; 3] = ["input", "textarea", "select"];

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    html: Option<String>,
    value: String,
    default_value: String,
    checked: bool,
    default_checked: bool,
    disabled: bool,
    offset_top: f64,
    offset_height: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SelectorSubject for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Arena-backed document with a single `body` root
#[derive(Debug, Clone)]
pub struct HeadlessPage {
    nodes: Vec<Element>,
    body: NodeId,
    scroll_y: f64,
    inner_width: f64,
    path: String,
    hash: String,
    focused: Option<NodeId>,
    history: Vec<String>,
    navigations: Vec<String>,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_string(),
            ..Default::default()
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            scroll_y: 0.0,
            inner_width: 1024.0,
            path: "/".to_string(),
            hash: String::new(),
            focused: None,
            history: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Append a new element under `parent`, applying markup attributes.
    ///
    /// `class` fills the class list, `value` and `checked` also become the
    /// control's default state.
    pub fn add(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    /// Append a new element carrying text content
    #[cfg(test)]
    pub fn add_text(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)], text: &str) -> NodeId {
        let node = self.add(parent, tag, attrs);
        self.set_text_content(node, text);
        node
    }

    pub fn set_layout(&mut self, node: NodeId, offset_top: f64, offset_height: f64) {
        if let Some(el) = self.el_mut(node) {
            el.offset_top = offset_top;
            el.offset_height = offset_height;
        }
    }

    pub fn set_inner_width(&mut self, width: f64) {
        self.inner_width = width;
    }

    pub fn set_location(&mut self, path: &str, hash: &str) {
        self.path = path.to_string();
        self.hash = hash.to_string();
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// URLs pushed onto the history stack
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Full-page navigations requested so far
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.el(node).map(|el| el.children.clone()).unwrap_or_default()
    }

    /// Deterministic serialisation of `node` and its subtree
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn el(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn el_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.el(node).and_then(|el| el.parent) else {
            return;
        };
        if let Some(p) = self.el_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(el) = self.el_mut(node) {
            el.parent = None;
        }
    }

    fn detach_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.detach(child);
        }
    }

    fn descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
        if let Some(el) = self.el(root) {
            for &child in &el.children {
                out.push(child);
                self.descendants(child, out);
            }
        }
    }

    /// Value of the selected option, else the first one. An option without a
    /// `value` attribute uses its trimmed text.
    fn selected_option_value(&self, select: NodeId) -> String {
        let mut nodes = Vec::new();
        self.descendants(select, &mut nodes);
        let options: Vec<&Element> = nodes
            .into_iter()
            .filter_map(|n| self.el(n))
            .filter(|el| el.tag == "option")
            .collect();
        let Some(option) = options
            .iter()
            .find(|el| el.attributes.contains_key("selected"))
            .or_else(|| options.first())
        else {
            return String::new();
        };
        match option.attributes.get("value") {
            Some(value) => value.clone(),
            None => option.text.trim().to_string(),
        }
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(el) = self.el(node) else {
            return;
        };
        let mut attrs: BTreeMap<&str, String> = el
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        if !el.classes.is_empty() {
            attrs.insert("class", el.classes.join(" "));
        }
        if !el.style.is_empty() {
            let style = el
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            attrs.insert("style", style);
        }
        if el.disabled {
            attrs.insert("disabled", String::new());
        }

        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in attrs {
            out.push_str(&format!(" {name}=\"{}\"", escape(&value)));
        }
        out.push('>');
        out.push_str(&escape(&el.text));
        if let Some(html) = &el.html {
            out.push_str(html);
        }
        for &child in &el.children {
            self.write_html(child, out);
        }
        out.push_str(&format!("</{}>", el.tag));
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(el) = self.el(node) {
            out.push_str(&el.text);
            if let Some(html) = &el.html {
                out.push_str(&strip_tags(html));
            }
            for &child in &el.children {
                self.collect_text(child, out);
            }
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

impl Page for HeadlessPage {
    fn body(&self) -> NodeId {
        self.body
    }

    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let mut nodes = vec![self.body];
        self.descendants(self.body, &mut nodes);
        nodes
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    fn query_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        self.descendants(root, &mut nodes);
        nodes
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut nodes = vec![self.body];
        self.descendants(self.body, &mut nodes);
        nodes
            .into_iter()
            .find(|&n| self.el(n).and_then(|el| el.attr("id")) == Some(id))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.el(node).and_then(|el| el.parent)
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.el(node).is_some_and(|el| selector.matches(el))
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.el(node).map(|el| el.tag.clone()).unwrap_or_default()
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.el(parent).is_none() || self.el(child).is_none() || self.contains(child, parent) {
            tracing::warn!("Ignoring append of {child:?} under {parent:?}");
            return;
        }
        self.detach(child);
        if let Some(p) = self.el_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.el_mut(child) {
            c.parent = Some(parent);
        }
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let el = self.el(node)?;
        if name == "class" {
            return (!el.classes.is_empty()).then(|| el.classes.join(" "));
        }
        el.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.el_mut(node) else {
            return;
        };
        match name {
            "class" => {
                el.classes = value.split_whitespace().map(str::to_string).collect();
            }
            "value" => {
                el.value = value.to_string();
                el.default_value = value.to_string();
                el.attributes.insert(name.to_string(), value.to_string());
            }
            "checked" => {
                el.checked = true;
                el.default_checked = true;
                el.attributes.insert(name.to_string(), value.to_string());
            }
            "disabled" => el.disabled = true,
            _ => {
                el.attributes.insert(name.to_string(), value.to_string());
            }
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(el) = self.el_mut(node) else {
            return;
        };
        match name {
            "class" => el.classes.clear(),
            "disabled" => el.disabled = false,
            _ => {
                el.attributes.remove(name);
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.el(node).is_some_and(|el| SelectorSubject::has_class(el, class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.el_mut(node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.el_mut(node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.detach_children(node);
        if let Some(el) = self.el_mut(node) {
            el.text = text.to_string();
            el.html = None;
            // A textarea's markup text is its default value
            if el.tag == "textarea" {
                el.value = text.to_string();
                el.default_value = text.to_string();
            }
        }
    }

    fn inner_html(&self, node: NodeId) -> String {
        let Some(el) = self.el(node) else {
            return String::new();
        };
        let mut out = escape(&el.text);
        if let Some(html) = &el.html {
            out.push_str(html);
        }
        for &child in &el.children {
            self.write_html(child, &mut out);
        }
        out
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        self.detach_children(node);
        if let Some(el) = self.el_mut(node) {
            el.text.clear();
            el.html = (!html.is_empty()).then(|| html.to_string());
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.el(node).and_then(|el| el.style.get(property).cloned())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.el_mut(node) {
            if value.is_empty() {
                el.style.remove(property);
            } else {
                el.style.insert(property.to_string(), value.to_string());
            }
        }
    }

    fn value(&self, node: NodeId) -> String {
        let Some(el) = self.el(node) else {
            return String::new();
        };
        if !el.value.is_empty() {
            return el.value.clone();
        }
        if el.tag == "select" {
            return self.selected_option_value(node);
        }
        // Checkable inputs report "on" unless given a value
        let checkable = el
            .attributes
            .get("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio"));
        if checkable && !el.attributes.contains_key("value") {
            return "on".to_string();
        }
        String::new()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.el_mut(node) {
            el.value = value.to_string();
        }
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.el(node).is_some_and(|el| el.checked)
    }

    fn set_checked(&mut self, node: NodeId, checked: bool) {
        if let Some(el) = self.el_mut(node) {
            el.checked = checked;
        }
    }

    fn is_disabled(&self, node: NodeId) -> bool {
        self.el(node).is_some_and(|el| el.disabled)
    }

    fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(el) = self.el_mut(node) {
            el.disabled = disabled;
        }
    }

    fn focus(&mut self, node: NodeId) {
        if self.el(node).is_some() {
            self.focused = Some(node);
        }
    }

    fn reset_form(&mut self, form: NodeId) {
        let mut nodes = Vec::new();
        self.descendants(form, &mut nodes);
        for node in nodes {
            if let Some(el) = self.el_mut(node) {
                if FORM_CONTROLS.contains(&el.tag.as_str()) {
                    el.value = el.default_value.clone();
                    el.checked = el.default_checked;
                }
            }
        }
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.el(node).map(|el| el.offset_top).unwrap_or(0.0)
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.el(node).map(|el| el.offset_height).unwrap_or(0.0)
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        self.offset_top(node) - self.scroll_y
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_y = top.max(0.0);
    }

    fn inner_width(&self) -> f64 {
        self.inner_width
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn location_hash(&self) -> String {
        self.hash.clone()
    }

    fn navigate(&mut self, url: &str) {
        tracing::info!("Navigating to {url}");
        self.navigations.push(url.to_string());
    }

    fn push_history(&mut self, url: &str) {
        if let Some(hash) = url.strip_prefix('#') {
            self.hash = format!("#{hash}");
        }
        self.history.push(url.to_string());
    }
}
