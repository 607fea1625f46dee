//! Serde fixtures for building pages and replaying event scenarios

use super::headless::HeadlessPage;
use super::selector::{Selector, SelectorError};
use super::{NodeId, Page, PageEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or replaying a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("no element matches {0:?}")]
    NoMatch(String),
}

/// Markup for a single element and its subtree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementFixture {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    /// Live value when it differs from the `value` attribute
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub top: f64,
    pub height: f64,
    pub children: Vec<ElementFixture>,
}

/// A whole page: location, viewport and body markup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFixture {
    pub path: String,
    pub hash: String,
    pub inner_width: f64,
    pub scroll_y: f64,
    pub body: Vec<ElementFixture>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            hash: String::new(),
            inner_width: 1024.0,
            scroll_y: 0.0,
            body: Vec::new(),
        }
    }
}

impl PageFixture {
    pub fn build(&self) -> HeadlessPage {
        let mut page = HeadlessPage::new();
        page.set_location(&self.path, &self.hash);
        page.set_inner_width(self.inner_width);
        let body = page.body();
        for element in &self.body {
            build_element(&mut page, body, element);
        }
        page.scroll_to(self.scroll_y);
        page
    }
}

fn build_element(page: &mut HeadlessPage, parent: NodeId, fixture: &ElementFixture) -> NodeId {
    let attrs: Vec<(&str, &str)> = fixture
        .attrs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let node = page.add(parent, &fixture.tag, &attrs);
    if let Some(text) = &fixture.text {
        page.set_text_content(node, text);
    }
    if let Some(value) = &fixture.value {
        page.set_value(node, value);
    }
    if let Some(checked) = fixture.checked {
        page.set_checked(node, checked);
    }
    page.set_layout(node, fixture.top, fixture.height);
    for child in &fixture.children {
        build_element(page, node, child);
    }
    node
}

/// A user action, addressed by selector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEvent {
    Click { target: String },
    Blur { target: String },
    /// Type into a field: sets the value, then fires `input`
    Input { target: String, value: String },
    /// Tick a checkbox: sets `checked`, then fires `input`
    Check { target: String, checked: bool },
    Submit { target: String },
    Scroll { y: f64 },
    Resize { width: f64 },
    KeyDown { key: String },
    MouseEnter { target: String },
    MouseLeave { target: String },
    ImageError { target: String },
}

impl ScenarioEvent {
    /// Apply the action's side effects to the page and produce the event to dispatch
    pub fn apply(&self, page: &mut HeadlessPage) -> Result<PageEvent, ScenarioError> {
        let event = match self {
            ScenarioEvent::Click { target } => PageEvent::Click(resolve(page, target)?),
            ScenarioEvent::Blur { target } => PageEvent::Blur(resolve(page, target)?),
            ScenarioEvent::Input { target, value } => {
                let node = resolve(page, target)?;
                page.set_value(node, value);
                PageEvent::Input(node)
            }
            ScenarioEvent::Check { target, checked } => {
                let node = resolve(page, target)?;
                page.set_checked(node, *checked);
                PageEvent::Input(node)
            }
            ScenarioEvent::Submit { target } => PageEvent::Submit(resolve(page, target)?),
            ScenarioEvent::Scroll { y } => {
                page.scroll_to(*y);
                PageEvent::Scroll
            }
            ScenarioEvent::Resize { width } => {
                page.set_inner_width(*width);
                PageEvent::Resize
            }
            ScenarioEvent::KeyDown { key } => PageEvent::KeyDown(key.clone()),
            ScenarioEvent::MouseEnter { target } => PageEvent::MouseEnter(resolve(page, target)?),
            ScenarioEvent::MouseLeave { target } => PageEvent::MouseLeave(resolve(page, target)?),
            ScenarioEvent::ImageError { target } => PageEvent::ImageError(resolve(page, target)?),
        };
        Ok(event)
    }
}

fn resolve(page: &HeadlessPage, target: &str) -> Result<NodeId, ScenarioError> {
    let selector = Selector::parse(target)?;
    page.query(&selector)
        .ok_or_else(|| ScenarioError::NoMatch(target.to_string()))
}

/// One step of a scenario: an event, or a pause in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    Wait { wait_ms: u64 },
    Event(ScenarioEvent),
}

/// A page plus the steps to replay against it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub page: PageFixture,
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
