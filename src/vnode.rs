//! The virtual node tree.
//!
//! Application code produces a [`VNode`] tree per render: text leaves,
//! transparent fragments, named intrinsic elements, and functional
//! components (callables producing another node). Nodes are immutable after
//! construction and cheap to clone — properties and children sit behind
//! `Arc`s, so layout boxes can hold nodes without deep copies.
//!
//! Properties are a dynamic mapping from names to [`PropValue`]s, with
//! checked accessors that fall back to a declared default on missing keys or
//! type mismatches.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::intrinsics::button::Button;
use crate::intrinsics::input::Input;
use crate::intrinsics::link::Link;
use crate::intrinsics::select::SelectHandle;
use crate::layout::Spacing;
use crate::style::Style;

/// A functional component: a callable producing a node from a property bag
/// (with the node's children injected under the `"children"` key).
pub type Component = Arc<dyn Fn(&Props) -> VNode + Send + Sync>;

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// A dynamically-typed property value.
#[derive(Clone)]
pub enum PropValue {
    Int(i32),
    Bool(bool),
    Str(String),
    Style(Style),
    Spacing(Spacing),
    /// A nested node (e.g. a select's pointer).
    Node(VNode),
    /// A node list (the injected `children` of a component).
    Nodes(Vec<VNode>),
    /// Backing object of an `input` element.
    Input(Arc<Input>),
    /// Backing object of a `select` element (type-erased).
    Select(Arc<dyn SelectHandle>),
    /// Backing object of a `button` element.
    Button(Arc<Button>),
    /// Backing object of a `link` element.
    Link(Arc<Link>),
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Int(v) => write!(f, "Int({v})"),
            PropValue::Bool(v) => write!(f, "Bool({v})"),
            PropValue::Str(v) => write!(f, "Str({v:?})"),
            PropValue::Style(v) => write!(f, "Style({v:?})"),
            PropValue::Spacing(v) => write!(f, "Spacing({v:?})"),
            PropValue::Node(_) => f.write_str("Node(..)"),
            PropValue::Nodes(v) => write!(f, "Nodes(len={})", v.len()),
            PropValue::Input(_) => f.write_str("Input(..)"),
            PropValue::Select(_) => f.write_str("Select(..)"),
            PropValue::Button(_) => f.write_str("Button(..)"),
            PropValue::Link(_) => f.write_str("Link(..)"),
        }
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Int(v)
    }
}
impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}
impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Str(v.to_string())
    }
}
impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Str(v)
    }
}
impl From<Style> for PropValue {
    fn from(v: Style) -> Self {
        PropValue::Style(v)
    }
}
impl From<Spacing> for PropValue {
    fn from(v: Spacing) -> Self {
        PropValue::Spacing(v)
    }
}
impl From<VNode> for PropValue {
    fn from(v: VNode) -> Self {
        PropValue::Node(v)
    }
}
impl From<Vec<VNode>> for PropValue {
    fn from(v: Vec<VNode>) -> Self {
        PropValue::Nodes(v)
    }
}
impl From<Arc<Input>> for PropValue {
    fn from(v: Arc<Input>) -> Self {
        PropValue::Input(v)
    }
}
impl From<Arc<Button>> for PropValue {
    fn from(v: Arc<Button>) -> Self {
        PropValue::Button(v)
    }
}
impl From<Arc<Link>> for PropValue {
    fn from(v: Arc<Link>) -> Self {
        PropValue::Link(v)
    }
}
impl From<Arc<dyn SelectHandle>> for PropValue {
    fn from(v: Arc<dyn SelectHandle>) -> Self {
        PropValue::Select(v)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// An immutable property bag. Cloning shares the underlying map; `set`
/// copies on write, so props read like a builder:
///
/// ```ignore
/// let props = Props::new().set("width", 10).set("border", "single");
/// ```
#[derive(Clone, Default)]
pub struct Props {
    map: Arc<HashMap<String, PropValue>>,
}

impl Props {
    /// An empty property bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, returning the updated bag (copy-on-write).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Arc::make_mut(&mut self.map).insert(key.into(), value.into());
        self
    }

    /// Raw access to a property value.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.map.get(key)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// An integer property, or `default` when missing or mistyped.
    pub fn int(&self, key: &str, default: i32) -> i32 {
        match self.map.get(key) {
            Some(PropValue::Int(v)) => *v,
            _ => default,
        }
    }

    /// A boolean property, or `default` when missing or mistyped.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        match self.map.get(key) {
            Some(PropValue::Bool(v)) => *v,
            _ => default,
        }
    }

    /// A string property, or `default` when missing or mistyped.
    pub fn str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.map.get(key) {
            Some(PropValue::Str(v)) => v,
            _ => default,
        }
    }

    /// The node's `style` property, or the empty style.
    pub fn style(&self) -> Style {
        self.style_prop("style", Style::default())
    }

    /// A style-valued property with a fallback.
    pub fn style_prop(&self, key: &str, default: Style) -> Style {
        match self.map.get(key) {
            Some(PropValue::Style(v)) => v.clone(),
            _ => default,
        }
    }

    /// A spacing property with directional overrides: `base` may be a scalar
    /// (`Int`) or a [`Spacing`] record, and `{base}Top` / `{base}Right` /
    /// `{base}Bottom` / `{base}Left` integers override individual sides.
    pub fn spacing(&self, base: &str) -> Spacing {
        let mut spacing = match self.map.get(base) {
            Some(PropValue::Int(v)) => Spacing::all(*v),
            Some(PropValue::Spacing(v)) => *v,
            _ => Spacing::default(),
        };
        if let Some(PropValue::Int(v)) = self.map.get(&format!("{base}Top")) {
            spacing.top = *v;
        }
        if let Some(PropValue::Int(v)) = self.map.get(&format!("{base}Right")) {
            spacing.right = *v;
        }
        if let Some(PropValue::Int(v)) = self.map.get(&format!("{base}Bottom")) {
            spacing.bottom = *v;
        }
        if let Some(PropValue::Int(v)) = self.map.get(&format!("{base}Left")) {
            spacing.left = *v;
        }
        spacing
    }

    /// The injected component children, if any.
    pub fn children(&self) -> &[VNode] {
        match self.map.get("children") {
            Some(PropValue::Nodes(nodes)) => nodes,
            _ => &[],
        }
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

// ---------------------------------------------------------------------------
// VNode
// ---------------------------------------------------------------------------

/// The kind of a virtual node.
#[derive(Clone)]
pub enum NodeKind {
    /// A text leaf; the string lives in the `content`/`text` props.
    Text,
    /// A transparent grouping with no box of its own.
    Fragment,
    /// A named intrinsic element (`"box"`, `"text"`, `"input"`, …).
    Element(String),
    /// A functional component, expanded before layout.
    Component(Component),
}

/// One node of the virtual tree.
#[derive(Clone)]
pub struct VNode {
    pub kind: NodeKind,
    pub props: Props,
    pub children: Arc<[VNode]>,
}

impl fmt::Debug for VNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            NodeKind::Text => "text-node",
            NodeKind::Fragment => "fragment",
            NodeKind::Element(name) => name.as_str(),
            NodeKind::Component(_) => "component",
        };
        f.debug_struct("VNode")
            .field("kind", &kind)
            .field("children", &self.children.len())
            .finish()
    }
}

impl VNode {
    /// Create an intrinsic element node.
    pub fn element(kind: impl Into<String>, props: Props, children: Vec<VNode>) -> VNode {
        VNode { kind: NodeKind::Element(kind.into()), props, children: children.into() }
    }

    /// Create a text leaf. Both `content` and `text` are set; readers prefer
    /// `content`.
    pub fn text(content: impl Into<String>) -> VNode {
        let content = content.into();
        VNode {
            kind: NodeKind::Text,
            props: Props::new().set("content", content.clone()).set("text", content),
            children: Vec::new().into(),
        }
    }

    /// Create a fragment grouping the given children.
    pub fn fragment(children: Vec<VNode>) -> VNode {
        VNode { kind: NodeKind::Fragment, props: Props::new(), children: children.into() }
    }

    /// Create a functional-component node.
    pub fn component(
        f: impl Fn(&Props) -> VNode + Send + Sync + 'static,
        props: Props,
        children: Vec<VNode>,
    ) -> VNode {
        VNode { kind: NodeKind::Component(Arc::new(f)), props, children: children.into() }
    }

    /// Whether this is a text leaf.
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text)
    }

    /// Whether this is a fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self.kind, NodeKind::Fragment)
    }

    /// The element name, for intrinsic elements.
    pub fn element_kind(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(name) => Some(name),
            _ => None,
        }
    }

    /// The text carried by a text leaf. Prefers `content` over `text`.
    pub fn text_content(&self) -> Option<&str> {
        if !self.is_text() {
            return None;
        }
        if let Some(PropValue::Str(s)) = self.props.get("content") {
            return Some(s);
        }
        if let Some(PropValue::Str(s)) = self.props.get("text") {
            return Some(s);
        }
        None
    }

    /// Recursively collect all text content under this node.
    pub fn collect_text(&self) -> String {
        if let Some(text) = self.text_content() {
            return text.to_string();
        }
        let mut out = String::new();
        for child in self.children.iter() {
            out.push_str(&child.collect_text());
        }
        out
    }

    /// Clone this node with different children.
    pub fn with_children(&self, children: Vec<VNode>) -> VNode {
        VNode { kind: self.kind.clone(), props: self.props.clone(), children: children.into() }
    }

    /// Clone this node with one property added or replaced.
    pub fn with_prop(&self, key: impl Into<String>, value: impl Into<PropValue>) -> VNode {
        VNode {
            kind: self.kind.clone(),
            props: self.props.clone().set(key, value),
            children: self.children.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Recursively expand functional components into intrinsic/text/fragment
/// trees.
///
/// Each component is called with its props plus its children injected under
/// `"children"`, and the produced tree is expanded in turn. Text, fragment,
/// and element nodes pass through with expanded children.
pub fn expand(node: &VNode) -> VNode {
    match &node.kind {
        NodeKind::Component(component) => {
            let props = node
                .props
                .clone()
                .set("children", node.children.iter().cloned().collect::<Vec<_>>());
            let produced = component(&props);
            expand(&produced)
        }
        _ => {
            if node.children.is_empty() {
                return node.clone();
            }
            let children: Vec<VNode> = node.children.iter().map(expand).collect();
            node.with_children(children)
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Props ────────────────────────────────────────────────────────

    #[test]
    fn typed_accessors_fall_back_on_missing_or_mistyped() {
        let props = Props::new().set("width", 10).set("wrap", true).set("label", "hi");
        assert_eq!(props.int("width", -1), 10);
        assert_eq!(props.int("height", -1), -1);
        assert_eq!(props.int("label", -1), -1); // wrong type
        assert!(props.bool("wrap", false));
        assert!(!props.bool("width", false));
        assert_eq!(props.str("label", ""), "hi");
        assert_eq!(props.str("missing", "d"), "d");
    }

    #[test]
    fn props_clone_shares_until_set() {
        let a = Props::new().set("x", 1);
        let b = a.clone().set("x", 2);
        assert_eq!(a.int("x", 0), 1);
        assert_eq!(b.int("x", 0), 2);
    }

    #[test]
    fn spacing_scalar_and_overrides() {
        let props = Props::new().set("padding", 2).set("paddingLeft", 5);
        let spacing = props.spacing("padding");
        assert_eq!(spacing.top, 2);
        assert_eq!(spacing.right, 2);
        assert_eq!(spacing.bottom, 2);
        assert_eq!(spacing.left, 5);
    }

    #[test]
    fn spacing_record_value() {
        let props = Props::new().set("margin", Spacing { top: 1, right: 2, bottom: 3, left: 4 });
        let spacing = props.spacing("margin");
        assert_eq!((spacing.top, spacing.right, spacing.bottom, spacing.left), (1, 2, 3, 4));
    }

    #[test]
    fn spacing_missing_is_zero() {
        let props = Props::new();
        assert_eq!(props.spacing("padding"), Spacing::default());
    }

    // ── VNode basics ─────────────────────────────────────────────────

    #[test]
    fn text_node_sets_both_keys_prefers_content() {
        let node = VNode::text("hello");
        assert!(node.is_text());
        assert_eq!(node.text_content(), Some("hello"));
        assert_eq!(node.props.str("text", ""), "hello");
    }

    #[test]
    fn collect_text_recurses() {
        let tree = VNode::element(
            "box",
            Props::new(),
            vec![VNode::text("a"), VNode::fragment(vec![VNode::text("b"), VNode::text("c")])],
        );
        assert_eq!(tree.collect_text(), "abc");
    }

    // ── Expansion ────────────────────────────────────────────────────

    #[test]
    fn expand_passes_through_intrinsics() {
        let tree = VNode::element("box", Props::new(), vec![VNode::text("x")]);
        let expanded = expand(&tree);
        assert_eq!(expanded.element_kind(), Some("box"));
        assert_eq!(expanded.children.len(), 1);
    }

    #[test]
    fn expand_calls_components_with_injected_children() {
        let component = |props: &Props| {
            let mut children = vec![VNode::text(format!("title={}", props.str("title", "?")))];
            children.extend(props.children().iter().cloned());
            VNode::element("box", Props::new(), children)
        };
        let tree = VNode::component(
            component,
            Props::new().set("title", "hi"),
            vec![VNode::text("child")],
        );
        let expanded = expand(&tree);
        assert_eq!(expanded.element_kind(), Some("box"));
        assert_eq!(expanded.children.len(), 2);
        assert_eq!(expanded.children[0].text_content(), Some("title=hi"));
        assert_eq!(expanded.children[1].text_content(), Some("child"));
    }

    #[test]
    fn expand_recurses_into_component_output() {
        // A component producing another component.
        let inner = |_: &Props| VNode::text("leaf");
        let outer = move |_: &Props| VNode::component(inner, Props::new(), vec![]);
        let expanded = expand(&VNode::component(outer, Props::new(), vec![]));
        assert!(expanded.is_text());
        assert_eq!(expanded.text_content(), Some("leaf"));
    }
}
