//! Render a node tree back to markup.
use kuchikikiki::{NodeData, NodeRef};

use super::sorted_attrs;

/// Markup dialect used when writing a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
  /// Empty elements self-close, quotation marks in text are escaped.
  Xml,
  /// Only void elements self-close; everything else gets an end tag.
  Html,
}

const HTML_VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

/// Serialize a node and its subtree.
#[must_use]
pub fn serialize_node(node: &NodeRef, dialect: Dialect) -> String {
  let mut out = String::new();
  write_node(node, dialect, &mut out);
  out
}

/// Serialize only the children of a node.
#[must_use]
pub fn serialize_children(node: &NodeRef, dialect: Dialect) -> String {
  let mut out = String::new();
  for child in node.children() {
    write_node(&child, dialect, &mut out);
  }
  out
}

fn write_node(node: &NodeRef, dialect: Dialect, out: &mut String) {
  match node.data() {
    NodeData::Element(element) => {
      let name = element.name.local.as_ref();
      out.push('<');
      out.push_str(name);
      for (key, value) in sorted_attrs(node) {
        out.push(' ');
        out.push_str(&key);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(&value));
        out.push('"');
      }

      let empty = node.first_child().is_none();
      let self_close = match dialect {
        Dialect::Xml => empty,
        Dialect::Html => empty && HTML_VOID_ELEMENTS.contains(&name),
      };
      if self_close {
        out.push_str("/>");
        return;
      }

      out.push('>');
      for child in node.children() {
        write_node(&child, dialect, out);
      }
      out.push_str("</");
      out.push_str(name);
      out.push('>');
    },
    NodeData::Text(text) => {
      let text = text.borrow();
      let escaped = html_escape::encode_text(text.as_str());
      match dialect {
        Dialect::Xml => out.push_str(&escaped.replace('"', "&quot;")),
        Dialect::Html => out.push_str(&escaped),
      }
    },
    NodeData::Document(_) | NodeData::DocumentFragment => {
      for child in node.children() {
        write_node(&child, dialect, out);
      }
    },
    _ => {},
  }
}
