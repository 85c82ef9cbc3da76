//! Mutable document tree built on `kuchikikiki` nodes.
//!
//! Source markup is parsed with `quick-xml` into a `kuchikikiki` node tree so
//! that the rewrite rules can rename, wrap, unwrap and move nodes in place.
//! All elements live in the empty namespace; prefixed attribute names such as
//! `xml:lang` are stored literally.
pub mod parse;
pub mod serialize;
mod tag;

use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};

pub use self::{
  parse::{parse_document, parse_fragment},
  serialize::{Dialect, serialize_children, serialize_node},
  tag::Tag,
};

/// Build a qualified name in the empty namespace.
#[must_use]
pub fn qual_name(local: &str) -> QualName {
  QualName::new(None, ns!(), LocalName::from(local))
}

/// Create a detached element with the given attributes.
#[must_use]
pub fn new_element(name: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    qual_name(name),
    attributes.iter().map(|(key, value)| {
      (ExpandedName::new("", *key), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Create a detached element holding a single text child.
#[must_use]
pub fn new_text_element(
  name: &str,
  attributes: &[(&str, &str)],
  text: &str,
) -> NodeRef {
  let element = new_element(name, attributes);
  element.append(NodeRef::new_text(text));
  element
}

/// Local name of an element node, `None` for any other node kind.
#[must_use]
pub fn element_name(node: &NodeRef) -> Option<&str> {
  node.as_element().map(|element| element.name.local.as_ref())
}

/// Whether `node` is an element with the given local name.
#[must_use]
pub fn is_element(node: &NodeRef, name: &str) -> bool {
  element_name(node) == Some(name)
}

/// Source vocabulary classification of an element node.
#[must_use]
pub fn tag_of(node: &NodeRef) -> Option<Tag> {
  element_name(node).and_then(Tag::from_name)
}

/// Value of an attribute, if the node is an element carrying it.
#[must_use]
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
  node
    .as_element()
    .and_then(|element| element.attributes.borrow().get(name).map(str::to_string))
}

/// Whether the element carries the attribute at all (even if empty).
#[must_use]
pub fn has_attr(node: &NodeRef, name: &str) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.attributes.borrow().contains(name))
}

/// Whether the element carries no attributes.
#[must_use]
pub fn has_no_attrs(node: &NodeRef) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.attributes.borrow().map.is_empty())
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
  if let Some(element) = node.as_element() {
    element
      .attributes
      .borrow_mut()
      .insert(name, value.to_string());
  }
}

pub fn remove_attr(node: &NodeRef, name: &str) -> Option<String> {
  node.as_element().and_then(|element| {
    element
      .attributes
      .borrow_mut()
      .remove(name)
      .map(|attribute| attribute.value)
  })
}

pub fn clear_attrs(node: &NodeRef) {
  if let Some(element) = node.as_element() {
    element.attributes.borrow_mut().map.clear();
  }
}

/// Attributes of an element as `(name, value)` pairs sorted by name.
#[must_use]
pub fn sorted_attrs(node: &NodeRef) -> Vec<(String, String)> {
  let mut pairs: Vec<(String, String)> = node
    .as_element()
    .map(|element| {
      element
        .attributes
        .borrow()
        .map
        .iter()
        .map(|(name, attribute)| {
          (name.local.to_string(), attribute.value.clone())
        })
        .collect()
    })
    .unwrap_or_default();
  pairs.sort();
  pairs
}

/// Replace the `class` attribute with the given space separated classes.
pub fn set_classes(node: &NodeRef, classes: &[&str]) {
  set_attr(node, "class", &classes.join(" "));
}

/// Whether the element's `class` attribute equals exactly these classes.
#[must_use]
pub fn has_exact_classes(node: &NodeRef, classes: &[&str]) -> bool {
  attr(node, "class").is_some_and(|value| {
    value.split_whitespace().eq(classes.iter().copied())
  })
}

/// Give an element a new name.
///
/// Element names are immutable in the node model, so a fresh element with
/// the same attributes takes the old one's place and adopts its children.
/// The returned node is the live one; the argument is left detached.
pub fn rename(node: &NodeRef, name: &str) -> NodeRef {
  let Some(element) = node.as_element() else {
    return node.clone();
  };
  if element.name.local.as_ref() == name {
    return node.clone();
  }

  let attributes: Vec<(ExpandedName, Attribute)> = element
    .attributes
    .borrow()
    .map
    .iter()
    .map(|(key, value)| (key.clone(), value.clone()))
    .collect();
  let replacement = NodeRef::new_element(qual_name(name), attributes);

  while let Some(child) = node.first_child() {
    replacement.append(child);
  }
  node.insert_after(replacement.clone());
  node.detach();
  replacement
}

/// Remove the element but keep its children in its place.
pub fn unwrap(node: &NodeRef) {
  while let Some(child) = node.first_child() {
    node.insert_before(child);
  }
  node.detach();
}

/// Remove the node together with its whole subtree.
pub fn decompose(node: &NodeRef) {
  node.detach();
}

/// Wrap `node` in `wrapper`, which takes its place in the tree.
pub fn wrap(node: &NodeRef, wrapper: &NodeRef) {
  node.insert_before(wrapper.clone());
  wrapper.append(node.clone());
}

/// Move all children of `from` to the end of `to`.
pub fn move_children(from: &NodeRef, to: &NodeRef) {
  while let Some(child) = from.first_child() {
    to.append(child);
  }
}

/// Copy a node and its whole subtree into fresh, detached nodes.
#[must_use]
pub fn deep_clone(node: &NodeRef) -> NodeRef {
  let copy = if let Some(element) = node.as_element() {
    let attributes: Vec<(ExpandedName, Attribute)> = element
      .attributes
      .borrow()
      .map
      .iter()
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();
    NodeRef::new_element(element.name.clone(), attributes)
  } else if let Some(text) = node.as_text() {
    return NodeRef::new_text(text.borrow().as_str());
  } else if let Some(comment) = node.as_comment() {
    return NodeRef::new_comment(comment.borrow().as_str());
  } else {
    NodeRef::new_document()
  };
  for child in node.children() {
    copy.append(deep_clone(&child));
  }
  copy
}

/// Remove all children of a node.
pub fn clear_children(node: &NodeRef) {
  while let Some(child) = node.first_child() {
    child.detach();
  }
}

/// Whether `node` is `root` or one of its descendants.
///
/// Parent links are weak, so a fragment root or the body of a dropped
/// document is itself the top of its tree.
#[must_use]
pub fn is_within(node: &NodeRef, root: &NodeRef) -> bool {
  node.inclusive_ancestors().any(|ancestor| ancestor == *root)
}

/// Whether the subtree contains any non-whitespace text.
#[must_use]
pub fn has_visible_text(node: &NodeRef) -> bool {
  node.text_contents().chars().any(|c| !c.is_whitespace())
}

/// Whether a node is a text node made only of whitespace.
#[must_use]
pub fn is_blank_text(node: &NodeRef) -> bool {
  node
    .as_text()
    .is_some_and(|text| text.borrow().chars().all(char::is_whitespace))
}

/// Previous sibling that is not whitespace-only text.
#[must_use]
pub fn previous_significant_sibling(node: &NodeRef) -> Option<NodeRef> {
  node
    .preceding_siblings()
    .find(|sibling| !is_blank_text(sibling) && sibling.as_comment().is_none())
}

/// All descendant elements with the given name, in document order.
#[must_use]
pub fn elements_named(root: &NodeRef, name: &str) -> Vec<NodeRef> {
  root
    .descendants()
    .filter(|node| is_element(node, name))
    .collect()
}

/// First descendant element with the given name.
#[must_use]
pub fn first_element_named(root: &NodeRef, name: &str) -> Option<NodeRef> {
  root.descendants().find(|node| is_element(node, name))
}

/// Nearest ancestor element with the given name.
#[must_use]
pub fn closest_ancestor(node: &NodeRef, name: &str) -> Option<NodeRef> {
  node.ancestors().find(|ancestor| is_element(ancestor, name))
}

/// Whether the parent element has the given name.
#[must_use]
pub fn parent_is(node: &NodeRef, name: &str) -> bool {
  node.parent().is_some_and(|parent| is_element(&parent, name))
}
