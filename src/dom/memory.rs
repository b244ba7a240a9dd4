//! In-memory [`Page`] for tests.
//!
//! Besides a plain element tree it models a virtualized list: only the rows
//! inside the scroll viewport exist as nodes, and scrolling the container
//! re-renders the window with fresh node ids, the way the host page does.
//! Detached nodes stay in the arena so stale ids keep failing `is_attached`;
//! the arena only grows, which suits short-lived test pages.

use super::Page;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Builder for one element appended with [`MemoryPage::append`].
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    checked: bool,
    visible: bool,
    client_height: f64,
    scroll_height: f64,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attrs: Vec::new(),
            text: String::new(),
            checked: false,
            visible: true,
            client_height: 0.0,
            scroll_height: 0.0,
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.retain(|(k, _)| k != name);
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Gives the element a scroll viewport.
    pub fn viewport(mut self, client_height: f64, scroll_height: f64) -> Self {
        self.client_height = client_height;
        self.scroll_height = scroll_height;
        self
    }

    /// `input[type=checkbox]` with an `aria-label`.
    pub fn checkbox(label: &str, checked: bool) -> Self {
        Self::new("input")
            .attr("type", "checkbox")
            .attr("aria-label", label)
            .checked(checked)
    }
}

/// Rows of a virtualized list, rendered `div[role=listitem]` >
/// `input[type=checkbox][aria-labelledby]` + `span#id`.
#[derive(Debug, Clone)]
pub struct VirtualListSpec {
    rows: Vec<(String, bool)>,
    row_height: f64,
    viewport_height: f64,
    list_attrs: Vec<(String, String)>,
}

impl VirtualListSpec {
    pub fn new(row_height: f64, viewport_height: f64) -> Self {
        Self {
            rows: Vec::new(),
            row_height,
            viewport_height,
            list_attrs: Vec::new(),
        }
    }

    pub fn row(mut self, label: &str, checked: bool) -> Self {
        self.rows.push((label.to_string(), checked));
        self
    }

    pub fn list_attr(mut self, name: &str, value: &str) -> Self {
        self.list_attrs.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    attached: bool,
    checked: bool,
    visible: bool,
    scroll_top: f64,
    scroll_height: f64,
    client_height: f64,
    row: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct VirtualList {
    container: NodeId,
    list: NodeId,
    rows: Vec<(String, bool)>,
    row_height: f64,
}

#[derive(Debug)]
struct Dom {
    nodes: Vec<Node>,
    lists: Vec<VirtualList>,
    activations: Vec<NodeId>,
    url: String,
    title: String,
}

impl Dom {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn insert(&mut self, parent: Option<NodeId>, spec: ElementSpec) -> NodeId {
        let id = NodeId(self.nodes.len());
        let attached = parent.map(|p| self.node(p).attached).unwrap_or(true);
        self.nodes.push(Node {
            tag: spec.tag,
            attrs: spec.attrs,
            text: spec.text,
            children: Vec::new(),
            parent,
            attached,
            checked: spec.checked,
            visible: spec.visible,
            scroll_top: 0.0,
            scroll_height: spec.scroll_height,
            client_height: spec.client_height,
            row: None,
        });
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        id
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
        self.node_mut(id).parent = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.node_mut(current).attached = false;
            stack.extend(self.node(current).children.iter().copied());
        }
    }

    fn render_list(&mut self, index: usize) {
        let list = self.lists[index].clone();
        for child in self.node(list.list).children.clone() {
            self.detach(child);
        }

        let container = self.node(list.container);
        let top = container.scroll_top;
        let bottom = top + container.client_height;
        let first = (top / list.row_height).floor().max(0.0) as usize;
        let last = ((bottom / list.row_height).ceil() as usize).min(list.rows.len());

        for (row, (label, checked)) in list.rows.iter().enumerate().take(last).skip(first) {
            let label_id = format!("vrow-{}-{}-label", index, row);
            let item = self.insert(Some(list.list), ElementSpec::new("div").attr("role", "listitem"));
            let toggle = self.insert(
                Some(item),
                ElementSpec::new("input")
                    .attr("type", "checkbox")
                    .attr("aria-labelledby", &label_id)
                    .checked(*checked),
            );
            self.node_mut(toggle).row = Some((index, row));
            self.insert(Some(item), ElementSpec::new("span").attr("id", &label_id).text(label));
        }
    }

    fn text_of(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        out.push_str(&node.text);
        for child in &node.children {
            self.text_of(*child, out);
        }
    }
}

pub struct MemoryPage {
    dom: RefCell<Dom>,
    root: NodeId,
    body: NodeId,
}

impl MemoryPage {
    pub fn new(url: &str, title: &str) -> Self {
        let mut dom = Dom {
            nodes: Vec::new(),
            lists: Vec::new(),
            activations: Vec::new(),
            url: url.to_string(),
            title: title.to_string(),
        };
        let root = dom.insert(None, ElementSpec::new("html"));
        let body = dom.insert(Some(root), ElementSpec::new("body"));
        Self {
            dom: RefCell::new(dom),
            root,
            body,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn append(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        self.dom.borrow_mut().insert(Some(parent), spec)
    }

    /// Appends `div[role=listitem] > input[type=checkbox][aria-label]` and
    /// returns the input.
    pub fn append_toggle(&self, parent: NodeId, label: &str, checked: bool) -> NodeId {
        let item = self.append(parent, ElementSpec::new("div").attr("role", "listitem"));
        self.append(item, ElementSpec::checkbox(label, checked))
    }

    /// Makes `container` a scroll viewport over a virtualized list and returns
    /// the list element, whose children are re-rendered on every scroll.
    pub fn append_virtual_list(&self, container: NodeId, spec: VirtualListSpec) -> NodeId {
        let mut dom = self.dom.borrow_mut();
        let mut list_spec = ElementSpec::new("div");
        for (name, value) in &spec.list_attrs {
            list_spec = list_spec.attr(name, value);
        }
        let list = dom.insert(Some(container), list_spec);

        let content_height = spec.rows.len() as f64 * spec.row_height;
        let node = dom.node_mut(container);
        node.client_height = spec.viewport_height;
        node.scroll_height = content_height.max(spec.viewport_height);
        node.scroll_top = 0.0;

        dom.lists.push(VirtualList {
            container,
            list,
            rows: spec.rows,
            row_height: spec.row_height,
        });
        let index = dom.lists.len() - 1;
        dom.render_list(index);
        list
    }

    pub fn remove(&self, id: NodeId) {
        self.dom.borrow_mut().detach(id);
    }

    /// Changes checked state without an activation, like a host-side re-render.
    pub fn set_checked(&self, id: NodeId, checked: bool) {
        self.dom.borrow_mut().node_mut(id).checked = checked;
    }

    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) {
        let mut dom = self.dom.borrow_mut();
        let attrs = &mut dom.node_mut(id).attrs;
        attrs.retain(|(k, _)| k != name);
        attrs.push((name.to_string(), value.to_string()));
    }

    pub fn activations(&self) -> Vec<NodeId> {
        self.dom.borrow().activations.clone()
    }

    pub fn activation_count(&self) -> usize {
        self.dom.borrow().activations.len()
    }

    pub fn clear_activations(&self) {
        self.dom.borrow_mut().activations.clear();
    }

    /// Model state of every row of the virtual list rooted at `list`,
    /// rendered or not.
    pub fn virtual_rows(&self, list: NodeId) -> Vec<(String, bool)> {
        self.dom
            .borrow()
            .lists
            .iter()
            .find(|l| l.list == list)
            .map(|l| l.rows.clone())
            .unwrap_or_default()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.dom.borrow().node(id).attached
    }
}

impl Page for MemoryPage {
    type Element = NodeId;

    fn root(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn children(&self, element: &NodeId) -> Vec<NodeId> {
        self.dom.borrow().node(*element).children.clone()
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> {
        self.dom.borrow().node(*element).parent
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.dom.borrow().node(*element).tag.clone()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.dom
            .borrow()
            .node(*element)
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn text_content(&self, element: &NodeId) -> String {
        let mut text = String::new();
        self.dom.borrow().text_of(*element, &mut text);
        text
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let dom = self.dom.borrow();
        dom.nodes
            .iter()
            .enumerate()
            .find(|(_, node)| node.attached && node.attrs.iter().any(|(k, v)| k == "id" && v == id))
            .map(|(index, _)| NodeId(index))
    }

    fn is_checked(&self, element: &NodeId) -> bool {
        self.dom.borrow().node(*element).checked
    }

    fn activate(&self, element: &NodeId) {
        let mut dom = self.dom.borrow_mut();
        dom.activations.push(*element);

        let node = dom.node_mut(*element);
        node.checked = !node.checked;
        let checked = node.checked;
        if let Some((_, value)) = node.attrs.iter_mut().find(|(k, _)| k == "aria-checked") {
            *value = checked.to_string();
        }
        if let Some((list, row)) = node.row {
            dom.lists[list].rows[row].1 = checked;
        }
    }

    fn is_visible(&self, element: &NodeId) -> bool {
        let dom = self.dom.borrow();
        let mut current = Some(*element);
        while let Some(id) = current {
            let node = dom.node(id);
            if !node.visible || !node.attached {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn scroll_top(&self, element: &NodeId) -> f64 {
        self.dom.borrow().node(*element).scroll_top
    }

    fn set_scroll_top(&self, element: &NodeId, value: f64) {
        let mut dom = self.dom.borrow_mut();
        let node = dom.node_mut(*element);
        let max = (node.scroll_height - node.client_height).max(0.0);
        node.scroll_top = value.clamp(0.0, max);

        let lists: Vec<usize> = dom
            .lists
            .iter()
            .enumerate()
            .filter(|(_, list)| list.container == *element)
            .map(|(index, _)| index)
            .collect();
        for index in lists {
            dom.render_list(index);
        }
    }

    fn scroll_height(&self, element: &NodeId) -> f64 {
        self.dom.borrow().node(*element).scroll_height
    }

    fn client_height(&self, element: &NodeId) -> f64 {
        self.dom.borrow().node(*element).client_height
    }

    fn url(&self) -> String {
        self.dom.borrow().url.clone()
    }

    fn title(&self) -> String {
        self.dom.borrow().title.clone()
    }
}
