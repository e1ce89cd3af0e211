//! Depth-first search over a generic markup tree.
//!
//! Matching is deliberately literal: a [`Signature`] matches a node only when
//! the tag is identical and the attribute value is byte-for-byte equal to the
//! expected string. There is no CSS selector or class-set logic here, so a
//! `class="a b"` attribute never matches a signature for `"b a"`.

use scraper::{ElementRef, Html, Node};

/// A node of a markup tree as seen by the matcher.
pub trait TreeNode<'a>: Copy + 'a {
    /// Element tag name, `None` for text and other node kinds.
    fn tag(&self) -> Option<&'a str>;

    fn attr(&self, key: &str) -> Option<&'a str>;

    /// Text content, `None` unless this is a text node.
    fn text(&self) -> Option<&'a str>;

    /// Children in document order.
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;
}

/// Node of a document parsed by `scraper`.
#[derive(Debug, Clone, Copy)]
pub enum DomNode<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Other,
}

impl<'a> From<&'a Html> for DomNode<'a> {
    fn from(document: &'a Html) -> Self {
        DomNode::Element(document.root_element())
    }
}

impl<'a> From<ElementRef<'a>> for DomNode<'a> {
    fn from(element: ElementRef<'a>) -> Self {
        DomNode::Element(element)
    }
}

impl<'a> DomNode<'a> {
    pub fn as_element(&self) -> Option<ElementRef<'a>> {
        match *self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl<'a> TreeNode<'a> for DomNode<'a> {
    fn tag(&self) -> Option<&'a str> {
        self.as_element().map(|element| element.value().name())
    }

    fn attr(&self, key: &str) -> Option<&'a str> {
        self.as_element().and_then(|element| element.value().attr(key))
    }

    fn text(&self) -> Option<&'a str> {
        match *self {
            DomNode::Text(text) => Some(text),
            _ => None,
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
        let Some(element) = self.as_element() else {
            return Box::new(std::iter::empty());
        };
        Box::new(element.children().map(|child| match child.value() {
            Node::Element(_) => ElementRef::wrap(child).map_or(DomNode::Other, DomNode::Element),
            Node::Text(text) => DomNode::Text(&**text),
            _ => DomNode::Other,
        }))
    }
}

/// What the traversal should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children, then carry on with its siblings.
    Continue,
    /// Do not visit the node's children.
    SkipSubtree,
    /// End the whole traversal.
    Stop,
}

/// Pre-order depth-first traversal driven by `visitor`.
///
/// Returns [`Visit::Stop`] if the visitor stopped the traversal and
/// [`Visit::Continue`] if the whole tree was walked.
pub fn walk<'a, N, F>(root: N, visitor: &mut F) -> Visit
where
    N: TreeNode<'a>,
    F: FnMut(N) -> Visit,
{
    match visitor(root) {
        Visit::Continue => {}
        Visit::SkipSubtree => return Visit::Continue,
        Visit::Stop => return Visit::Stop,
    }
    for child in root.children() {
        if walk(child, visitor) == Visit::Stop {
            return Visit::Stop;
        }
    }
    Visit::Continue
}

/// First node in pre-order, `root` included, for which `predicate` holds.
pub fn find_first<'a, N, P>(root: N, mut predicate: P) -> Option<N>
where
    N: TreeNode<'a>,
    P: FnMut(N) -> bool,
{
    let mut found = None;
    walk(root, &mut |node: N| {
        if predicate(node) {
            found = Some(node);
            Visit::Stop
        } else {
            Visit::Continue
        }
    });
    found
}

/// Decision returned by a [`find_all`] predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    /// Not collected, children are searched.
    Skip,
    /// Collected, children are searched too.
    Keep,
    /// Collected, children are not searched.
    KeepAndSkipSubtree,
    /// Not collected, children are not searched.
    SkipSubtree,
}

/// Every node the predicate keeps, in document order.
pub fn find_all<'a, N, P>(root: N, mut predicate: P) -> Vec<N>
where
    N: TreeNode<'a>,
    P: FnMut(N) -> Collect,
{
    let mut matches = Vec::new();
    walk(root, &mut |node: N| match predicate(node) {
        Collect::Skip => Visit::Continue,
        Collect::Keep => {
            matches.push(node);
            Visit::Continue
        }
        Collect::KeepAndSkipSubtree => {
            matches.push(node);
            Visit::SkipSubtree
        }
        Collect::SkipSubtree => Visit::SkipSubtree,
    });
    matches
}

/// Trimmed content of the first non-blank text node under `root`.
pub fn first_text<'a, N: TreeNode<'a>>(root: N) -> Option<&'a str> {
    let node = find_first(root, |node| {
        node.text().is_some_and(|text| !text.trim().is_empty())
    })?;
    node.text().map(str::trim)
}

/// Exact (tag, attribute value) pair locating one kind of element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub tag: &'static str,
    pub attr: &'static str,
    pub value: &'static str,
}

impl Signature {
    pub const fn new(tag: &'static str, attr: &'static str, value: &'static str) -> Self {
        Self { tag, attr, value }
    }

    /// Signature keyed on the literal `class` attribute.
    pub const fn class(tag: &'static str, value: &'static str) -> Self {
        Self::new(tag, "class", value)
    }

    pub fn matches<'a, N: TreeNode<'a>>(&self, node: &N) -> bool {
        node.tag() == Some(self.tag) && node.attr(self.attr) == Some(self.value)
    }

    /// First element under `root` (inclusive) carrying this signature.
    pub fn find_in<'a, N: TreeNode<'a>>(&self, root: N) -> Option<N> {
        find_first(root, |node| self.matches(&node))
    }
}
