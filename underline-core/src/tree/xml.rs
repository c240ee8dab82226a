//! XML/XHTML loading into a [`MemTree`].
//!
//! The conventions mirror what the web frontend reads off the DOM:
//! `class="zero-len"` flags decoration that must not count toward text
//! length, `class="no-capture"` flags authoring widgets exempt from
//! selection capture, and `class="underline"` plus `data-start`/`data-end`
//! (and optional `data-comment`) carries a persisted annotation reference.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::{DocTree, MarkerData, MemTree, NodeId};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
}

impl MemTree {
    /// Build a tree from an XML/XHTML fragment. Elements become containers,
    /// text and CDATA become text leaves, comments become ignorable nodes.
    /// Text is kept verbatim; whitespace counts toward offsets just as it
    /// renders.
    pub fn from_xml(input: &str) -> Result<MemTree, ParseError> {
        let mut reader = Reader::from_str(input);
        let mut tree = MemTree::new();
        let root = tree.root();
        let mut stack: Vec<NodeId> = vec![root];

        loop {
            let parent = stack.last().copied().unwrap_or(root);
            match reader.read_event()? {
                Event::Start(e) => {
                    let node = tree.add_container(parent);
                    apply_attrs(&mut tree, node, &e)?;
                    stack.push(node);
                }
                Event::Empty(e) => {
                    let node = tree.add_container(parent);
                    apply_attrs(&mut tree, node, &e)?;
                }
                Event::End(_) => {
                    if stack.len() > 1 {
                        stack.pop();
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    if !text.is_empty() {
                        tree.add_text(parent, &text);
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    if !text.is_empty() {
                        tree.add_text(parent, &text);
                    }
                }
                Event::Comment(_) => {
                    tree.add_ignorable(parent);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(tree)
    }
}

fn apply_attrs(tree: &mut MemTree, node: NodeId, e: &BytesStart) -> Result<(), ParseError> {
    let mut classes = String::new();
    let mut start = None;
    let mut end = None;
    let mut comment = None;

    for attr in e.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"class" => classes = value.into_owned(),
            b"data-start" => start = value.parse::<usize>().ok(),
            b"data-end" => end = value.parse::<usize>().ok(),
            b"data-comment" => comment = Some(value.into_owned()),
            _ => {}
        }
    }

    let has_class = |name: &str| classes.split_whitespace().any(|c| c == name);
    if has_class("zero-len") {
        tree.set_zero_len(node, true);
    }
    if has_class("no-capture") {
        tree.set_ignored(node, true);
    }
    if has_class("underline") {
        if let (Some(start), Some(end)) = (start, end) {
            tree.set_annotation_ref(node, MarkerData::new(start, end, comment));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;

    #[test]
    fn builds_nested_structure() {
        let tree = MemTree::from_xml("<p>Hello <em>world</em>!</p>").unwrap();
        let root = tree.root();
        let p = tree.children(&root)[0];
        let kids = tree.children(&p);
        assert_eq!(kids.len(), 3);
        assert_eq!(tree.payload(&kids[0]), "Hello ");
        assert_eq!(tree.kind(&kids[1]), NodeKind::Container);
        assert_eq!(tree.payload(&kids[2]), "!");
    }

    #[test]
    fn comments_become_ignorable() {
        let tree = MemTree::from_xml("<p>a<!-- note -->b</p>").unwrap();
        let p = tree.children(&tree.root())[0];
        let kids = tree.children(&p);
        assert_eq!(tree.kind(&kids[1]), NodeKind::Ignorable);
    }

    #[test]
    fn class_flags_are_read() {
        let tree =
            MemTree::from_xml(r#"<div><span class="zero-len anchor">1</span><aside class="no-capture">x</aside></div>"#)
                .unwrap();
        let div = tree.children(&tree.root())[0];
        let kids = tree.children(&div);
        assert!(tree.is_zero_len(&kids[0]));
        assert!(tree.is_ignored(&kids[1]));
    }

    #[test]
    fn underline_refs_need_both_offsets() {
        let tree = MemTree::from_xml(
            r#"<div><a class="underline" data-start="2" data-end="7" data-comment="hm"/><a class="underline" data-start="3"/></div>"#,
        )
        .unwrap();
        let div = tree.children(&tree.root())[0];
        let kids = tree.children(&div);
        assert_eq!(
            tree.annotation_ref(&kids[0]),
            Some(MarkerData::new(2, 7, Some("hm".into())))
        );
        assert_eq!(tree.annotation_ref(&kids[1]), None);
    }

    #[test]
    fn entities_are_unescaped() {
        let tree = MemTree::from_xml("<p>a &amp; b</p>").unwrap();
        let p = tree.children(&tree.root())[0];
        assert_eq!(tree.payload(&tree.children(&p)[0]), "a & b");
    }

    #[test]
    fn malformed_markup_is_an_error() {
        assert!(MemTree::from_xml("<p><em>oops</p>").is_err());
    }
}
