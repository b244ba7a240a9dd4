//! Capability interface over the host page's live DOM.
//!
//! Discovery code never touches a concrete document. It goes through [`Page`],
//! which exposes exactly what the algorithms need: tree navigation, attribute
//! and text reads, checked state, native activation and scroll metrics.
//! Element identity is not assumed to survive re-renders, so callers re-query
//! instead of holding on to elements across passes.

pub mod memory;
pub mod selector;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::{ElementSpec, MemoryPage, NodeId, VirtualListSpec};
pub use selector::{AttrOp, Selector};

pub trait Page {
    type Element: Clone + PartialEq + std::fmt::Debug;

    /// The document element, `None` while the page has no document.
    fn root(&self) -> Option<Self::Element>;

    fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Lowercase tag name.
    fn tag_name(&self, element: &Self::Element) -> String;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Concatenated text of the element's subtree, untrimmed.
    fn text_content(&self, element: &Self::Element) -> String;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn is_checked(&self, element: &Self::Element) -> bool;

    /// Fires the element's native activation (a click), so the host page's own
    /// handlers observe the change.
    fn activate(&self, element: &Self::Element);

    fn is_visible(&self, _element: &Self::Element) -> bool {
        true
    }

    fn scroll_top(&self, element: &Self::Element) -> f64;

    fn set_scroll_top(&self, element: &Self::Element, value: f64);

    fn scroll_height(&self, element: &Self::Element) -> f64;

    fn client_height(&self, element: &Self::Element) -> f64;

    fn url(&self) -> String;

    fn title(&self) -> String;

    fn matches(&self, element: &Self::Element, selector: &Selector) -> bool {
        let tag = self.tag_name(element);
        selector.matches_with(&tag, &|name: &str| self.attribute(element, name))
    }

    /// Descendants of `scope` (excluding `scope`) matching `selector`, in
    /// document order.
    fn query_all(&self, scope: &Self::Element, selector: &Selector) -> Vec<Self::Element> {
        walk_descendants(self, scope, selector)
    }

    fn query_first(&self, scope: &Self::Element, selector: &Selector) -> Option<Self::Element> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Document-wide [`Page::query_all`].
    fn query_document(&self, selector: &Selector) -> Vec<Self::Element> {
        match self.root() {
            Some(root) => {
                let mut found = Vec::new();
                if self.matches(&root, selector) {
                    found.push(root.clone());
                }
                found.extend(self.query_all(&root, selector));
                found
            }
            None => Vec::new(),
        }
    }

    /// Nearest ancestor of `element` (excluding itself) matching `selector`.
    fn closest_ancestor(&self, element: &Self::Element, selector: &Selector) -> Option<Self::Element> {
        let mut current = self.parent(element);
        while let Some(candidate) = current {
            if self.matches(&candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(&candidate);
        }
        None
    }

    /// Whether `ancestor` is `element` or contains it.
    fn contains(&self, ancestor: &Self::Element, element: &Self::Element) -> bool {
        let mut current = Some(element.clone());
        while let Some(candidate) = current {
            if &candidate == ancestor {
                return true;
            }
            current = self.parent(&candidate);
        }
        false
    }
}

/// Depth-first walk below `scope` collecting matches in document order.
pub fn walk_descendants<P: Page + ?Sized>(page: &P, scope: &P::Element, selector: &Selector) -> Vec<P::Element> {
    let mut found = Vec::new();
    let mut stack: Vec<P::Element> = page.children(scope).into_iter().rev().collect();
    while let Some(element) = stack.pop() {
        if page.matches(&element, selector) {
            found.push(element.clone());
        }
        stack.extend(page.children(&element).into_iter().rev());
    }
    found
}
