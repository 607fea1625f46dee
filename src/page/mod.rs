//! Page adapter
//!
//! Components never touch a browser directly. Everything they need from the
//! document and window goes through the [`Page`] trait, which keeps them
//! testable against the in-memory [`HeadlessPage`].

mod fixture;
mod headless;
mod selector;

pub use fixture::{Scenario, ScenarioStep};
pub use headless::HeadlessPage;
pub use selector::{Selector, SelectorError};

use serde::{Deserialize, Serialize};

/// Opaque handle to an element in a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Browser events the behaviours react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Click(NodeId),
    Blur(NodeId),
    Input(NodeId),
    Submit(NodeId),
    Scroll,
    Resize,
    KeyDown(String),
    MouseEnter(NodeId),
    MouseLeave(NodeId),
    ImageError(NodeId),
}

/// The document and window operations the behaviours rely on
pub trait Page {
    // Tree
    fn body(&self) -> NodeId;
    /// All matching elements in document order
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;
    /// Matching descendants of `root` (excluding `root`) in document order
    fn query_within(&self, root: NodeId, selector: &Selector) -> Vec<NodeId>;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn matches(&self, node: NodeId, selector: &Selector) -> bool;
    fn tag_name(&self, node: NodeId) -> String;
    fn create_element(&mut self, tag: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    /// Detach `node` from the document
    fn remove(&mut self, node: NodeId);
    fn is_connected(&self, node: NodeId) -> bool;

    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_one_within(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_within(root, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor matching `selector`
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.matches(n, selector) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Inclusive containment
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    // Attributes and classes
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.attribute(node, name).is_some()
    }

    // Content
    fn text_content(&self, node: NodeId) -> String;
    fn set_text_content(&mut self, node: NodeId, text: &str);
    fn inner_html(&self, node: NodeId) -> String;
    fn set_inner_html(&mut self, node: NodeId, html: &str);
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    /// An empty value removes the property
    fn set_style(&mut self, node: NodeId, property: &str, value: &str);

    // Form controls
    fn value(&self, node: NodeId) -> String;
    fn set_value(&mut self, node: NodeId, value: &str);
    fn is_checked(&self, node: NodeId) -> bool;
    fn set_checked(&mut self, node: NodeId, checked: bool);
    fn is_disabled(&self, node: NodeId) -> bool;
    fn set_disabled(&mut self, node: NodeId, disabled: bool);
    fn focus(&mut self, node: NodeId);
    /// Restore every control under `form` to its default state
    fn reset_form(&mut self, form: NodeId);

    // Layout and window
    fn offset_top(&self, node: NodeId) -> f64;
    fn offset_height(&self, node: NodeId) -> f64;
    /// Top edge relative to the viewport
    fn bounding_top(&self, node: NodeId) -> f64;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&mut self, top: f64);
    fn inner_width(&self) -> f64;
    fn location_path(&self) -> String;
    fn location_hash(&self) -> String;
    fn navigate(&mut self, url: &str);
    fn push_history(&mut self, url: &str);
}
