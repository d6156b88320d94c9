//! Raw markup tree for a package part.
//!
//! The main document part is parsed exactly once into an owned element tree.
//! Both the object model (`model.rs`) and the markup-only queries (page
//! geometry, bookmarks, field codes, hyperlink relationship ids) read from
//! this one tree, so the projections can never drift apart.

use crate::error::LoadError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name as written in the part, e.g. `w:p`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

fn local_part(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Name without its namespace prefix (`w:p` -> `p`)
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Attribute lookup by qualified name, e.g. `w:val` or `r:id`
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.child_elements()
            .filter(move |child| child.local_name() == local)
    }

    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.child_elements().find(|child| child.local_name() == local)
    }

    /// All descendants (not including `self`) with the given local name, in document order
    pub fn descendants<'a>(&'a self, local: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a XmlElement>) {
        for child in self.child_elements() {
            if child.local_name() == local {
                found.push(child);
            }
            child.collect_descendants(local, found);
        }
    }

    fn descendants_or_self<'a>(&'a self, local: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        if self.local_name() == local {
            found.push(self);
        }
        self.collect_descendants(local, &mut found);
        found
    }

    /// First descendant with the given local name, in document order
    pub fn first_descendant(&self, local: &str) -> Option<&XmlElement> {
        for child in self.child_elements() {
            if child.local_name() == local {
                return Some(child);
            }
            if let Some(found) = child.first_descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Text directly inside this element
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Concatenated text of every descendant element named `local` (`t` for `w:t`)
    pub fn text_of(&self, local: &str) -> String {
        self.descendants(local)
            .into_iter()
            .map(|element| element.own_text())
            .collect()
    }
}

/// Parsed markup of one package part.
#[derive(Debug, Clone)]
pub struct MarkupTree {
    part: String,
    root: XmlElement,
}

impl MarkupTree {
    pub fn parse(part: &str, xml: &str) -> Result<Self, LoadError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = vec![XmlElement::new("#document")];

        loop {
            let event = reader.read_event().map_err(|e| {
                LoadError::xml(
                    part,
                    format!("{} (at byte {})", e, reader.buffer_position()),
                )
            })?;

            match event {
                Event::Start(start) => {
                    let element = XmlElement::from_start(&start).map_err(|e| LoadError::xml(part, e))?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = XmlElement::from_start(&start).map_err(|e| LoadError::xml(part, e))?;
                    push_child(&mut stack, XmlNode::Element(element));
                }
                Event::End(_) => {
                    if stack.len() < 2 {
                        return Err(LoadError::xml(part, "unbalanced closing tag"));
                    }
                    if let Some(element) = stack.pop() {
                        push_child(&mut stack, XmlNode::Element(element));
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| LoadError::xml(part, e))?;
                    push_child(&mut stack, XmlNode::Text(text.into_owned()));
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    push_child(&mut stack, XmlNode::Text(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if stack.len() != 1 {
            return Err(LoadError::xml(part, "unexpected end of document"));
        }

        let document = stack.pop().unwrap_or_else(|| XmlElement::new("#document"));
        let root = document
            .children
            .into_iter()
            .find_map(|node| match node {
                XmlNode::Element(element) => Some(element),
                XmlNode::Text(_) => None,
            })
            .ok_or_else(|| LoadError::xml(part, "no root element"))?;

        Ok(Self {
            part: part.to_string(),
            root,
        })
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Every element in the tree with the given local name, in document order
    pub fn descendants(&self, local: &str) -> Vec<&XmlElement> {
        self.root.descendants_or_self(local)
    }

    pub fn first(&self, local: &str) -> Option<&XmlElement> {
        if self.root.local_name() == local {
            return Some(&self.root);
        }
        self.root.first_descendant(local)
    }

    /// Minimal path query over local names.
    ///
    /// `//w:pgSz` selects every `pgSz` anywhere, `w:document/w:body/w:p` walks
    /// child steps from the root, and `//w:tbl/w:tr` mixes the two.
    pub fn select(&self, path: &str) -> Vec<&XmlElement> {
        let mut steps = path.split('/').filter(|step| !step.is_empty());

        let mut current: Vec<&XmlElement> = if path.starts_with("//") {
            match steps.next() {
                Some(step) => self.root.descendants_or_self(local_part(step)),
                None => return Vec::new(),
            }
        } else {
            match steps.next() {
                Some(step) if self.root.local_name() == local_part(step) => vec![&self.root],
                _ => return Vec::new(),
            }
        };

        for step in steps {
            let local = local_part(step);
            current = current
                .into_iter()
                .flat_map(|element| {
                    element
                        .child_elements()
                        .filter(move |child| child.local_name() == local)
                })
                .collect();
        }

        current
    }
}

fn push_child(stack: &mut [XmlElement], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}
