//! Owned UI tree produced by the renderer.

use std::fmt::Write;

const VOID_TAGS: &[&str] = &["img", "input"];

/// One node of a rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Plain text; escaped on serialization.
    Text(String),
    /// Trusted markup emitted as-is (notice content).
    Markup(String),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn markup(value: impl Into<String>) -> Self {
        Self::Markup(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) | Self::Markup(_) => None,
        }
    }

    /// Every element in document order, this node included.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(self, &mut out);
        out
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.elements()
            .into_iter()
            .filter(|element| element.has_class(class))
            .collect()
    }

    /// First element carrying `data-action = action` and, when given, `data-id = id`.
    pub fn find_action(&self, action: &str, id: Option<&str>) -> Option<&Element> {
        self.elements().into_iter().find(|element| {
            element.get_attr("data-action") == Some(action)
                && id.map_or(true, |id| element.get_attr("data-id") == Some(id))
        })
    }

    /// Concatenated text and markup below this node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        push_text(self, &mut out);
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }

    pub(crate) fn for_each_element_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        if let Self::Element(element) = self {
            visit(element);
            for child in &mut element.children {
                child.for_each_element_mut(visit);
            }
        }
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

/// Element with ordered attributes, class list and a hidden flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: &'static str,
    classes: Vec<&'static str>,
    attrs: Vec<(&'static str, String)>,
    hidden: bool,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            hidden: false,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: &'static str) -> Self {
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Sets an attribute, replacing a previous value of the same name.
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Adds a valueless attribute such as `disabled` when `on` is set.
    pub fn flag(self, name: &'static str, on: bool) -> Self {
        if on {
            self.attr(name, "")
        } else {
            self
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::Text(value.into()))
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| *existing == class)
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            push_text(child, &mut out);
        }
        out
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

fn collect_elements<'a>(node: &'a Node, out: &mut Vec<&'a Element>) {
    if let Node::Element(element) = node {
        out.push(element);
        for child in &element.children {
            collect_elements(child, out);
        }
    }
}

fn push_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(value) | Node::Markup(value) => out.push_str(value),
        Node::Element(element) => {
            for child in &element.children {
                push_text(child, out);
            }
        }
    }
}

fn write_html(node: &Node, out: &mut String) {
    match node {
        Node::Text(value) => escape_into(value, false, out),
        Node::Markup(value) => out.push_str(value),
        Node::Element(element) => {
            let _ = write!(out, "<{}", element.tag);
            if !element.classes.is_empty() {
                let _ = write!(out, " class=\"{}\"", element.classes.join(" "));
            }
            for (name, value) in &element.attrs {
                if value.is_empty() {
                    let _ = write!(out, " {name}");
                } else {
                    let _ = write!(out, " {name}=\"");
                    escape_into(value, true, out);
                    out.push('"');
                }
            }
            if element.hidden {
                out.push_str(" hidden");
            }
            out.push('>');
            if VOID_TAGS.contains(&element.tag) {
                return;
            }
            for child in &element.children {
                write_html(child, out);
            }
            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

fn escape_into(value: &str, in_attribute: bool, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
