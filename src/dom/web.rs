//! Browser bindings: [`Page`] over the live document and the exported entry
//! points the extension's JavaScript shim calls.

use crate::config::DiscoveryConfig;
use crate::content::ContentScript;
use crate::dom::{walk_descendants, Page, Selector};
use crate::error::{AppError, AppResult};
use crate::messages::{Request, Response};
use crate::utils::clock::Clock;
use std::future::Future;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

pub struct WebPage {
    document: Document,
}

impl WebPage {
    pub fn new() -> AppResult<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| AppError::operation_failed("No document in this context"))?;
        Ok(Self { document })
    }
}

impl Page for WebPage {
    type Element = Element;

    fn root(&self) -> Option<Element> {
        self.document.document_element()
    }

    fn children(&self, element: &Element) -> Vec<Element> {
        let collection = element.children();
        (0..collection.length())
            .filter_map(|i| collection.item(i))
            .collect()
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn is_checked(&self, element: &Element) -> bool {
        match element.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.checked(),
            None => element.get_attribute("aria-checked").as_deref() == Some("true"),
        }
    }

    fn activate(&self, element: &Element) {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.click(),
            None => log::warn!("Cannot activate non-HTML element <{}>", self.tag_name(element)),
        }
    }

    /// Laid-out elements have an offset parent; `display: none` subtrees do not.
    fn is_visible(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .map(|html| html.offset_parent().is_some())
            .unwrap_or(false)
    }

    fn scroll_top(&self, element: &Element) -> f64 {
        element.scroll_top() as f64
    }

    fn set_scroll_top(&self, element: &Element, value: f64) {
        element.set_scroll_top(value.round() as i32);
    }

    fn scroll_height(&self, element: &Element) -> f64 {
        element.scroll_height() as f64
    }

    fn client_height(&self, element: &Element) -> f64 {
        element.client_height() as f64
    }

    fn url(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.href().ok())
            .unwrap_or_default()
    }

    fn title(&self) -> String {
        self.document.title()
    }

    /// Uses the browser's selector engine, walking the tree only for shapes
    /// CSS cannot express.
    fn query_all(&self, scope: &Element, selector: &Selector) -> Vec<Element> {
        let Some(css) = selector.to_css() else {
            return walk_descendants(self, scope, selector);
        };
        match scope.query_selector_all(&css) {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.item(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect(),
            Err(e) => {
                log::warn!("Selector '{}' rejected: {:?}", css, e);
                Vec::new()
            }
        }
    }
}

/// Timers from the browser event loop.
#[derive(Debug, Clone)]
pub struct GlooClock {
    started_ms: f64,
}

impl GlooClock {
    pub fn new() -> Self {
        Self {
            started_ms: js_sys::Date::now(),
        }
    }
}

impl Default for GlooClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for GlooClock {
    fn now(&self) -> Duration {
        let elapsed = (js_sys::Date::now() - self.started_ms).max(0.0);
        Duration::from_millis(elapsed as u64)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        gloo_timers::future::sleep(duration)
    }
}

fn content_script() -> Result<ContentScript<WebPage, GlooClock>, JsValue> {
    let page = WebPage::new().map_err(|e| JsValue::from_str(&e.to_safe_string()))?;
    Ok(ContentScript::new(page, GlooClock::new(), DiscoveryConfig::default()))
}

/// Waits for the calendar list once the content script is injected.
#[wasm_bindgen]
pub async fn initialize() -> Result<bool, JsValue> {
    let _ = crate::utils::logging::init_logging();
    Ok(content_script()?.initialize().await)
}

/// Handles one JSON-encoded request and returns the JSON-encoded response.
#[wasm_bindgen(js_name = handleMessage)]
pub async fn handle_message(request: String) -> Result<String, JsValue> {
    let script = content_script()?;
    let response = match serde_json::from_str::<Request>(&request) {
        Ok(request) => script.handle(request).await,
        Err(e) => {
            log::warn!("Malformed request: {}", e);
            Response::failed(format!("Malformed request: {}", e))
        }
    };
    serde_json::to_string(&response).map_err(|e| JsValue::from_str(&e.to_string()))
}
