//! Mock automation engine for harness testing.
//!
//! [`MockDriver`] implements [`Driver`] over a small in-memory page model:
//! elements in document order, scripted click/blur handlers, and
//! time-deferred page mutations so that polling waits can be exercised
//! against genuinely asynchronous behavior. Every trait call is recorded
//! in a history log for interaction assertions.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::driver::{Driver, ElementHandle};
use crate::locator::Strategy;
use crate::result::{CotizarError, CotizarResult};

/// Scripted page reaction to a click or blur
pub type PageHandler = Box<dyn FnMut(&mut MockPage)>;

/// One element of the fake page
#[derive(Debug, Clone)]
pub struct MockElement {
    /// id attribute
    pub id: String,
    /// tag name
    pub tag: String,
    /// class list
    pub classes: Vec<String>,
    /// visible text
    pub text: String,
    /// value attribute
    pub value: String,
    /// href attribute (anchors)
    pub href: Option<String>,
    /// rendered visible
    pub displayed: bool,
    /// native constraint-validation state
    pub native_invalid: bool,
    /// visible-text options; non-empty marks the element as a select
    pub options: Vec<String>,
    /// document order, assigned by [`MockPage::add`]
    pub order: usize,
}

impl MockElement {
    /// Create an element with the given id and tag
    #[must_use]
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            href: None,
            displayed: true,
            native_invalid: false,
            options: Vec::new(),
            order: 0,
        }
    }

    /// A visible text input
    #[must_use]
    pub fn input(id: impl Into<String>) -> Self {
        Self::new(id, "input")
    }

    /// An anchor with visible text
    #[must_use]
    pub fn anchor(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(id, "a");
        el.text = text.into();
        el
    }

    /// A button with visible text
    #[must_use]
    pub fn button(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(id, "button");
        el.text = text.into();
        el
    }

    /// A select control offering the given visible-text options
    #[must_use]
    pub fn select(id: impl Into<String>, options: &[&str]) -> Self {
        let mut el = Self::new(id, "select");
        el.options = options.iter().map(|o| (*o).to_string()).collect();
        el
    }

    /// A feedback span, hidden until validation shows it
    #[must_use]
    pub fn feedback(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Self::new(id, "span");
        el.text = text.into();
        el.displayed = false;
        el
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    /// Set visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the value attribute
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the href attribute
    #[must_use]
    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    /// Set the native invalid state
    #[must_use]
    pub fn native_invalid(mut self, invalid: bool) -> Self {
        self.native_invalid = invalid;
        self
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => Some(self.id.clone()),
            "value" => Some(self.value.clone()),
            "href" => self.href.clone(),
            "class" => Some(self.classes.join(" ")),
            _ => None,
        }
    }

    fn has_class_containing(&self, fragment: &str) -> bool {
        self.classes.iter().any(|c| c.contains(fragment))
    }
}

/// The fake page: elements in document order plus free-form body text
#[derive(Debug, Default)]
pub struct MockPage {
    elements: Vec<MockElement>,
    body_text: String,
}

impl MockPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element, assigning its document order
    pub fn add(&mut self, mut element: MockElement) {
        element.order = self.elements.len();
        self.elements.push(element);
    }

    /// Look up an element by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MockElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Look up an element by id, mutably
    pub fn get_mut(&mut self, id: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Remove an element (handles pointing at it go stale)
    pub fn remove(&mut self, id: &str) {
        self.elements.retain(|e| e.id != id);
    }

    /// Make an element visible
    pub fn show(&mut self, id: &str) {
        if let Some(el) = self.get_mut(id) {
            el.displayed = true;
        }
    }

    /// Hide an element
    pub fn hide(&mut self, id: &str) {
        if let Some(el) = self.get_mut(id) {
            el.displayed = false;
        }
    }

    /// Set an element's value attribute
    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.value = value.into();
        }
    }

    /// Set an element's visible text
    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.text = text.into();
        }
    }

    /// Show an error label with the given message
    pub fn show_error(&mut self, id: &str, message: impl Into<String>) {
        if let Some(el) = self.get_mut(id) {
            el.text = message.into();
            el.displayed = true;
        }
    }

    /// Mark an element natively invalid
    pub fn set_native_invalid(&mut self, id: &str, invalid: bool) {
        if let Some(el) = self.get_mut(id) {
            el.native_invalid = invalid;
        }
    }

    /// Append to the page's free-form body text
    pub fn append_body_text(&mut self, text: impl Into<String>) {
        self.body_text.push(' ');
        self.body_text.push_str(&text.into());
    }

    fn find_by_strategy(&self, strategy: &Strategy) -> Option<&MockElement> {
        match strategy {
            Strategy::Id(id) => self.get(id),
            Strategy::Css(selector) => self
                .elements
                .iter()
                .find(|e| matches_selector_list(e, selector)),
            Strategy::LinkText(text) => self
                .elements
                .iter()
                .find(|e| e.tag == "a" && e.text == *text),
            // absolute XPath is not modeled
            Strategy::XPath(_) => None,
        }
    }

    /// Relative lookup: the model only understands the `following::` form
    /// with `contains(@class,'..')` predicates, which is the shape the
    /// error-sibling chain uses.
    fn find_following(&self, origin_order: usize, expr: &str) -> Option<&MockElement> {
        if !expr.contains("following") {
            return None;
        }
        let fragments = class_fragments(expr);
        if fragments.is_empty() {
            return None;
        }
        self.elements
            .iter()
            .filter(|e| e.order > origin_order)
            .find(|e| fragments.iter().any(|f| e.has_class_containing(f)))
    }

    fn visible_text(&self) -> String {
        let mut out = String::new();
        for el in &self.elements {
            if el.displayed && !el.text.is_empty() {
                out.push_str(&el.text);
                out.push(' ');
            }
        }
        out.push_str(&self.body_text);
        out
    }
}

/// Pull the quoted class fragments out of `contains(@class,'..')` predicates
fn class_fragments(expr: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut rest = expr;
    while let Some(pos) = rest.find("contains(@class,'") {
        rest = &rest[pos + "contains(@class,'".len()..];
        if let Some(end) = rest.find('\'') {
            fragments.push(rest[..end].to_string());
            rest = &rest[end..];
        } else {
            break;
        }
    }
    fragments
}

/// Match against a comma-separated selector list
fn matches_selector_list(el: &MockElement, selector: &str) -> bool {
    selector
        .split(',')
        .any(|simple| matches_simple_selector(el, simple.trim()))
}

/// Match one compound selector: `tag`, `#id`, `.class`, `[attr*='v']` and
/// `[attr='v']` parts, in any combination
fn matches_simple_selector(el: &MockElement, selector: &str) -> bool {
    if selector.is_empty() {
        return false;
    }
    let bytes = selector.as_bytes();
    let tag_end = bytes
        .iter()
        .position(|b| matches!(b, b'#' | b'.' | b'['))
        .unwrap_or(bytes.len());
    let tag = &selector[..tag_end];
    if !tag.is_empty() && tag != "*" && el.tag != tag {
        return false;
    }
    let mut i = tag_end;

    while i < bytes.len() {
        match bytes[i] {
            b'#' | b'.' => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && !matches!(bytes[end], b'#' | b'.' | b'[') {
                    end += 1;
                }
                let name = &selector[start..end];
                let matched = if bytes[i] == b'#' {
                    el.id == name
                } else {
                    el.classes.iter().any(|c| c == name)
                };
                if !matched {
                    return false;
                }
                i = end;
            }
            b'[' => {
                let Some(close) = selector[i..].find(']') else {
                    return false;
                };
                if !matches_attribute(el, &selector[i + 1..i + close]) {
                    return false;
                }
                i += close + 1;
            }
            _ => return false,
        }
    }
    true
}

/// Match the inside of an attribute selector: `name*='v'` or `name='v'`
fn matches_attribute(el: &MockElement, body: &str) -> bool {
    let (name, op, raw) = if let Some((name, raw)) = body.split_once("*=") {
        (name, "*=", raw)
    } else if let Some((name, raw)) = body.split_once('=') {
        (name, "=", raw)
    } else {
        // bare [attr] presence check
        return el.attribute(body.trim()).is_some();
    };
    let expected = raw.trim().trim_matches('\'').trim_matches('"');
    match el.attribute(name.trim()) {
        Some(actual) if op == "*=" => actual.contains(expected),
        Some(actual) => actual == expected,
        None => false,
    }
}

type Deferred = (Instant, Box<dyn FnOnce(&mut MockPage)>);

/// Scriptable in-memory [`Driver`].
#[derive(Default)]
pub struct MockDriver {
    page: MockPage,
    url: String,
    history: Vec<String>,
    click_handlers: HashMap<String, PageHandler>,
    blur_handlers: HashMap<String, PageHandler>,
    deferred: Vec<Deferred>,
    /// Force cookie deletion to fail (teardown testing)
    pub fail_on_delete_cookies: bool,
    /// Force quit to fail (teardown testing)
    pub fail_on_quit: bool,
    /// Whether quit has been called
    pub quit_called: bool,
    /// Whether cookies were purged
    pub cookies_cleared: bool,
}

impl std::fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriver")
            .field("url", &self.url)
            .field("history_len", &self.history.len())
            .field("deferred", &self.deferred.len())
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create an empty driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the page model
    pub fn page_mut(&mut self) -> &mut MockPage {
        &mut self.page
    }

    /// The page model
    #[must_use]
    pub fn page(&self) -> &MockPage {
        &self.page
    }

    /// Current URL
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Recorded call history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Whether a call with the given prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history.iter().any(|c| c.starts_with(prefix))
    }

    /// Script a page reaction to clicking the element with `id`
    pub fn on_click<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: FnMut(&mut MockPage) + 'static,
    {
        let _ = self.click_handlers.insert(id.into(), Box::new(handler));
    }

    /// Script a page reaction to blurring the element with `id`
    pub fn on_blur<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: FnMut(&mut MockPage) + 'static,
    {
        let _ = self.blur_handlers.insert(id.into(), Box::new(handler));
    }

    /// Apply a page mutation after a delay; pending mutations run lazily
    /// before the next driver call once they fall due
    pub fn schedule_in<F>(&mut self, delay: Duration, mutation: F)
    where
        F: FnOnce(&mut MockPage) + 'static,
    {
        self.deferred.push((Instant::now() + delay, Box::new(mutation)));
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.deferred.len() {
            if self.deferred[i].0 <= now {
                let (_, mutation) = self.deferred.remove(i);
                mutation(&mut self.page);
            } else {
                i += 1;
            }
        }
    }

    fn require_element(&self, id: &str) -> CotizarResult<&MockElement> {
        self.page.get(id).ok_or_else(|| CotizarError::ElementNotFound {
            target: id.to_string(),
        })
    }

    fn handle_for(el: &MockElement) -> ElementHandle {
        ElementHandle::new(el.id.clone(), el.tag.clone())
    }
}

impl Driver for MockDriver {
    fn goto(&mut self, url: &str) -> CotizarResult<()> {
        self.history.push(format!("goto:{url}"));
        self.url = url.to_string();
        Ok(())
    }

    fn find(&mut self, strategy: &Strategy) -> CotizarResult<Option<ElementHandle>> {
        self.apply_due();
        self.history.push(format!("find:{}", strategy.describe()));
        Ok(self.page.find_by_strategy(strategy).map(Self::handle_for))
    }

    fn find_from(
        &mut self,
        origin: &ElementHandle,
        strategy: &Strategy,
    ) -> CotizarResult<Option<ElementHandle>> {
        self.apply_due();
        self.history
            .push(format!("find_from:{}:{}", origin.id, strategy.describe()));
        let origin_order = self.require_element(&origin.id)?.order;
        match strategy {
            Strategy::XPath(expr) => Ok(self
                .page
                .find_following(origin_order, expr)
                .map(Self::handle_for)),
            other => Ok(self.page.find_by_strategy(other).map(Self::handle_for)),
        }
    }

    fn is_displayed(&mut self, el: &ElementHandle) -> CotizarResult<bool> {
        self.apply_due();
        Ok(self.require_element(&el.id)?.displayed)
    }

    fn text(&mut self, el: &ElementHandle) -> CotizarResult<String> {
        self.apply_due();
        Ok(self.require_element(&el.id)?.text.clone())
    }

    fn attribute(&mut self, el: &ElementHandle, name: &str) -> CotizarResult<Option<String>> {
        self.apply_due();
        Ok(self.require_element(&el.id)?.attribute(name))
    }

    fn clear(&mut self, el: &ElementHandle) -> CotizarResult<()> {
        self.apply_due();
        self.history.push(format!("clear:{}", el.id));
        let id = el.id.clone();
        self.require_element(&id)?;
        self.page.set_value(&id, "");
        Ok(())
    }

    fn type_text(&mut self, el: &ElementHandle, text: &str) -> CotizarResult<()> {
        self.apply_due();
        self.history.push(format!("type:{}:{text}", el.id));
        let id = el.id.clone();
        self.require_element(&id)?;
        if let Some(target) = self.page.get_mut(&id) {
            target.value.push_str(text);
        }
        Ok(())
    }

    fn click(&mut self, el: &ElementHandle) -> CotizarResult<()> {
        self.apply_due();
        self.history.push(format!("click:{}", el.id));
        self.require_element(&el.id)?;
        if let Some(mut handler) = self.click_handlers.remove(&el.id) {
            handler(&mut self.page);
            let _ = self.click_handlers.insert(el.id.clone(), handler);
        }
        Ok(())
    }

    fn select_by_visible_text(&mut self, el: &ElementHandle, text: &str) -> CotizarResult<()> {
        self.apply_due();
        self.history.push(format!("select:{}:{text}", el.id));
        let id = el.id.clone();
        let element = self.require_element(&id)?;
        if element.options.is_empty() {
            return Err(CotizarError::DriverError {
                message: format!("'{id}' has no selection semantics"),
            });
        }
        if !element.options.iter().any(|o| o == text) {
            return Err(CotizarError::DriverError {
                message: format!("'{id}' has no option with visible text '{text}'"),
            });
        }
        self.page.set_value(&id, text);
        Ok(())
    }

    fn execute_js(
        &mut self,
        script: &str,
        target: Option<&ElementHandle>,
    ) -> CotizarResult<serde_json::Value> {
        self.apply_due();
        if script.contains("blur") {
            let el = target.ok_or_else(|| CotizarError::DriverError {
                message: "blur script needs a target element".to_string(),
            })?;
            self.history.push(format!("blur:{}", el.id));
            self.require_element(&el.id)?;
            if let Some(mut handler) = self.blur_handlers.remove(&el.id) {
                handler(&mut self.page);
                let _ = self.blur_handlers.insert(el.id.clone(), handler);
            }
            return Ok(serde_json::Value::Null);
        }
        if script.contains(":invalid") {
            let el = target.ok_or_else(|| CotizarError::DriverError {
                message: "validity script needs a target element".to_string(),
            })?;
            self.history.push(format!("validity:{}", el.id));
            let invalid = self.require_element(&el.id)?.native_invalid;
            return Ok(serde_json::Value::Bool(invalid));
        }
        Err(CotizarError::DriverError {
            message: format!("mock cannot evaluate script: {script}"),
        })
    }

    fn page_text(&mut self) -> CotizarResult<String> {
        self.apply_due();
        self.history.push("page_text".to_string());
        Ok(self.page.visible_text())
    }

    fn delete_all_cookies(&mut self) -> CotizarResult<()> {
        self.history.push("delete_all_cookies".to_string());
        if self.fail_on_delete_cookies {
            return Err(CotizarError::DriverError {
                message: "cookie store unavailable".to_string(),
            });
        }
        self.cookies_cleared = true;
        Ok(())
    }

    fn quit(&mut self) -> CotizarResult<()> {
        self.history.push("quit".to_string());
        if self.fail_on_quit {
            return Err(CotizarError::DriverError {
                message: "browser already gone".to_string(),
            });
        }
        self.quit_called = true;
        Ok(())
    }
}
