//! Build a [`NodeRef`] tree from TEI source text with `quick-xml`.
//!
//! Text is kept verbatim (no trimming) because whitespace between inline
//! elements is significant in reading text. Comments, processing
//! instructions and the doctype are dropped.
use std::borrow::Cow;

use kuchikikiki::NodeRef;
use quick_xml::{
  Reader,
  escape::{resolve_predefined_entity, unescape_with},
  events::{BytesStart, Event},
};

use super::{new_element, qual_name};
use crate::error::{TransformError, TransformResultOf};

/// Parse a complete XML document.
///
/// A leading byte-order mark is ignored. The returned node is a document
/// node whose children are the top-level elements of the source.
///
/// # Errors
///
/// Returns [`TransformError::Xml`] when `quick-xml` rejects the input and
/// [`TransformError::Unbalanced`] when end tags do not match start tags.
pub fn parse_document(source: &str) -> TransformResultOf<NodeRef> {
  let source = source.strip_prefix('\u{feff}').unwrap_or(source);
  let document = NodeRef::new_document();
  let mut stack: Vec<NodeRef> = vec![document.clone()];

  let mut reader = Reader::from_str(source);
  reader.config_mut().check_end_names = false;

  loop {
    let position = u64::try_from(reader.buffer_position()).unwrap_or_default();
    let event = reader
      .read_event()
      .map_err(|source| TransformError::Xml { position, source })?;

    match event {
      Event::Start(e) => {
        let element = element_from(&e);
        append_to_top(&stack, element.clone());
        stack.push(element);
      },
      Event::Empty(e) => {
        append_to_top(&stack, element_from(&e));
      },
      Event::End(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        if stack.len() < 2 {
          return Err(TransformError::Unbalanced(format!(
            "unexpected closing tag </{name}>"
          )));
        }
        let open = stack.pop().unwrap_or_else(NodeRef::new_document);
        let open_name = super::element_name(&open).unwrap_or_default();
        if open_name != name {
          return Err(TransformError::Unbalanced(format!(
            "expected </{open_name}>, found </{name}>"
          )));
        }
      },
      Event::Text(e) => {
        push_text(&stack, &String::from_utf8_lossy(e.as_ref()));
      },
      Event::CData(e) => {
        push_text(&stack, &String::from_utf8_lossy(e.as_ref()));
      },
      Event::GeneralRef(e) => {
        let reference = format!("&{};", String::from_utf8_lossy(e.as_ref()));
        push_text(&stack, &unescape(&reference));
      },
      Event::Eof => break,
      _ => {},
    }
  }

  if stack.len() > 1 {
    let names: Vec<String> = stack
      .iter()
      .skip(1)
      .filter_map(|node| super::element_name(node).map(str::to_string))
      .collect();
    return Err(TransformError::Unbalanced(format!(
      "unclosed elements: {}",
      names.join(", ")
    )));
  }

  Ok(document)
}

/// Parse a markup fragment that may have several top-level nodes.
///
/// The fragment is wrapped in a synthetic root element, which is returned.
///
/// # Errors
///
/// Same as [`parse_document`].
pub fn parse_fragment(fragment: &str) -> TransformResultOf<NodeRef> {
  let document = parse_document(&format!("<fragment>{fragment}</fragment>"))?;
  document
    .first_child()
    .ok_or(TransformError::MissingElement("fragment"))
}

fn append_to_top(stack: &[NodeRef], node: NodeRef) {
  if let Some(parent) = stack.last() {
    parent.append(node);
  }
}

/// Append text to the current element, merging with a trailing text node.
fn push_text(stack: &[NodeRef], text: &str) {
  if text.is_empty() {
    return;
  }
  let Some(parent) = stack.last() else {
    return;
  };
  // Text outside the root element is only whitespace in well formed input.
  if parent.as_document().is_some() {
    return;
  }
  if let Some(last) = parent.last_child()
    && let Some(existing) = last.as_text()
  {
    existing.borrow_mut().push_str(text);
    return;
  }
  parent.append(NodeRef::new_text(text));
}

fn element_from(start: &BytesStart<'_>) -> NodeRef {
  let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
  let attributes: Vec<(String, String)> = start
    .attributes()
    .flatten()
    .map(|attr| {
      let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
      let raw = String::from_utf8_lossy(&attr.value).to_string();
      (key, unescape(&raw).into_owned())
    })
    .collect();

  if attributes.is_empty() {
    return NodeRef::new_element(qual_name(&name), Vec::new());
  }
  let borrowed: Vec<(&str, &str)> = attributes
    .iter()
    .map(|(key, value)| (key.as_str(), value.as_str()))
    .collect();
  new_element(&name, &borrowed)
}

/// Entities resolved besides the five predefined by XML.
fn resolve_entity(entity: &str) -> Option<&'static str> {
  resolve_predefined_entity(entity).or_else(|| {
    match entity {
      "nbsp" => Some("\u{a0}"),
      _ => None,
    }
  })
}

/// Resolve entity and character references. Text with an unknown entity is
/// kept literally.
fn unescape(raw: &str) -> Cow<'_, str> {
  unescape_with(raw, resolve_entity).unwrap_or_else(|e| {
    log::warn!("{e} in {raw:?}; kept literally");
    Cow::Borrowed(raw)
  })
}
