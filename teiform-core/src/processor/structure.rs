//! Transforms for block structure: divisions, paragraphs, headings, line
//! and page breaks, tables and verse.
use kuchikikiki::NodeRef;

use super::context::{RewriteContext, Target};
use crate::{
  tree,
  types::{DivisionType, OutputMode},
};

pub(super) fn division(target: &Target, ctx: &mut RewriteContext<'_>) {
  let node = &target.node;
  let mode = ctx.options.mode;
  let is_top = ctx.top_division.as_ref() == Some(node);

  if mode == OutputMode::DownloadXml {
    if is_top {
      tree::set_attr(node, "xml:lang", ctx.options.language.code());
    }
    return;
  }

  let Some(type_value) = tree::attr(node, "type")
    .filter(|value| DivisionType::from_attr(value).is_some())
  else {
    log::debug!("Unwrapping division without a type");
    tree::unwrap(node);
    return;
  };
  tree::remove_attr(node, "type");

  if mode == OutputMode::Est {
    let kind = DivisionType::from_attr(&type_value);
    if is_top {
      tree::set_attr(node, "lang", ctx.options.language.code());
    }
    if matches!(kind, Some(DivisionType::Chapter | DivisionType::Section)) {
      tree::rename(node, "section");
    } else {
      tree::set_classes(node, &[type_value.trim(), "tei"]);
    }
  } else {
    tree::set_classes(node, &[type_value.trim()]);
  }
}

/// Whether a paragraph opens its text block and is set without indent.
fn starts_unindented(target: &Target, index: usize) -> bool {
  let node = &target.node;
  match &target.document_kind {
    Some(DivisionType::Letter) => {
      let after_opener = tree::previous_significant_sibling(node)
        .is_some_and(|sibling| tree::is_element(&sibling, "opener"));
      let opens_postscript = tree::parent_is(node, "postscript")
        && !node
          .preceding_siblings()
          .any(|sibling| tree::is_element(&sibling, "p"));
      after_opener || opens_postscript
    },
    Some(kind) if kind.starts_unindented() => index == 0,
    _ => false,
  }
}

pub(super) fn paragraph(target: &Target, ctx: &mut RewriteContext<'_>) {
  let node = &target.node;
  let index = ctx.paragraphs_seen;
  ctx.paragraphs_seen += 1;

  match ctx.options.mode {
    OutputMode::Est => {
      let unindented = !tree::has_attr(node, "rend")
        && !tree::has_attr(node, "type")
        && starts_unindented(target, index);
      let rend = tree::remove_attr(node, "rend");
      let paragraph_type = tree::remove_attr(node, "type");

      if let Some(paragraph_type) = paragraph_type {
        let mut classes = vec![paragraph_type.as_str()];
        if !ctx.is_front_matter() {
          classes.push("tei");
        }
        tree::set_classes(node, &classes);
        if paragraph_type == "subtitle" {
          tree::set_attr(node, "role", "doc-subtitle");
        }
      } else if let Some(rend) = rend {
        tree::set_classes(node, &[rend.as_str(), "spaced"]);
      } else if unindented {
        tree::set_classes(node, &["noIndent"]);
      } else {
        tree::set_classes(node, &["spaced"]);
      }
    },
    OutputMode::DownloadXml => {
      if !tree::has_attr(node, "rend") && starts_unindented(target, index) {
        tree::set_attr(node, "rend", "noIndent");
      }
    },
    _ => {
      let rend = tree::remove_attr(node, "rend");
      let paragraph_type = tree::remove_attr(node, "type");
      if let Some(class) = paragraph_type.or(rend) {
        tree::set_classes(node, &[class.as_str()]);
      }
    },
  }
}

pub(super) fn line_break(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let mode = ctx.options.mode;

  if mode.is_html() && mode != OutputMode::Est {
    tree::remove_attr(node, "break");
    tree::rename(node, "br");
    return;
  }

  if tree::has_attr(node, "break") {
    match mode {
      OutputMode::Est => {
        tree::remove_attr(node, "break");
        tree::rename(node, "br");
        return;
      },
      OutputMode::DownloadXml => return,
      _ => {},
    }
  }

  // The normalizer already placed the space a page break needs.
  let before_page_break = node
    .next_sibling()
    .is_some_and(|sibling| tree::is_element(&sibling, "pb"));
  if !before_page_break {
    node.insert_before(NodeRef::new_text(" "));
  }
  node.detach();
}

pub(super) fn page_break(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;

  if ctx.options.mode == OutputMode::DownloadXml {
    if !tree::has_attr(node, "type") {
      tree::set_attr(node, "type", "orig");
    }
    return;
  }

  let number = tree::remove_attr(node, "n");
  let class = match tree::remove_attr(node, "type") {
    Some(page_type) if page_type != "orig" && !page_type.is_empty() => {
      format!("pb_{page_type}")
    },
    _ => "pb_orig".to_string(),
  };
  let span = tree::rename(node, "span");
  tree::set_classes(&span, &[class.as_str()]);
  if let Some(number) = number {
    span.prepend(NodeRef::new_text(format!("|{number}|")));
  }
}

/// Heading levels and class for a typed heading, as
/// `(class, reading-text level, front-matter and manuscript level)`.
fn typed_heading(heading_type: &str) -> Option<(&'static str, u8, u8)> {
  let entry = match heading_type {
    "title" => ("title", 3, 1),
    "section" => ("section", 4, 2),
    "subchapter" => ("sub", 5, 3),
    "subchapter2" => ("sub2", 6, 4),
    "subchapter3" => ("sub3", 6, 5),
    _ => return None,
  };
  Some(entry)
}

pub(super) fn heading(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let mode = ctx.options.mode;
  let reading_text = mode == OutputMode::Est && !ctx.is_front_matter();

  if let Some((class, est_level, base_level)) = tree::attr(node, "type")
    .as_deref()
    .and_then(typed_heading)
  {
    tree::remove_attr(node, "type");
    let level = if reading_text { est_level } else { base_level };
    let heading = tree::rename(node, &format!("h{level}"));
    if reading_text {
      tree::set_classes(&heading, &[class, "tei"]);
    } else {
      tree::set_classes(&heading, &[class]);
    }
    return;
  }

  if tree::parent_is(node, "table") {
    if mode == OutputMode::Est {
      tree::rename(node, "caption");
    } else if let Some(table) = node.parent() {
      let header = tree::new_element("h3", &[]);
      tree::move_children(node, &header);
      table.insert_before(header);
      node.detach();
    }
    return;
  }

  if tree::parent_is(node, "list") {
    let Some(list) = node.parent() else {
      return;
    };
    let header = if mode == OutputMode::Est {
      tree::new_element("p", &[("class", "list_header tei")])
    } else {
      tree::new_element("p", &[("class", "list_header")])
    };
    tree::move_children(node, &header);
    list.insert_before(header);
    node.detach();
    return;
  }

  // Untyped headings are chapter headings, levelled by division depth.
  // Reading text starts at level 3: the hosting page supplies 1 and 2.
  let base = if reading_text { 3 } else { 1 };
  let level = (base + target.depth).clamp(1, 6);
  tree::remove_attr(node, "type");
  let heading = tree::rename(node, &format!("h{level}"));
  if reading_text {
    tree::set_classes(&heading, &["chapter", "tei"]);
  } else {
    tree::set_classes(&heading, &["chapter"]);
  }
}

pub(super) fn table(target: &Target, ctx: &RewriteContext<'_>) {
  if ctx.options.mode == OutputMode::Est {
    let wrapper = tree::new_element("div", &[("class", "table-wrapper tei")]);
    tree::wrap(&target.node, &wrapper);
  }
}

pub(super) fn row(target: &Target) {
  tree::remove_attr(&target.node, "role");
  tree::rename(&target.node, "tr");
}

pub(super) fn cell(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let label_row = node.parent().is_some_and(|parent| {
    tree::is_element(&parent, "row") && tree::has_attr(&parent, "role")
  });
  let reading_text = ctx.options.mode == OutputMode::Est;
  let aligned = tree::remove_attr(node, "rend").is_some();

  let cell = if label_row {
    let header = tree::rename(node, "th");
    if reading_text {
      tree::set_attr(&header, "scope", "col");
    }
    header
  } else {
    tree::rename(node, "td")
  };
  if aligned && reading_text {
    tree::set_classes(&cell, &["right"]);
  }
}

pub(super) fn verse_line(target: &Target) {
  let node = &target.node;
  let rend = tree::remove_attr(node, "rend");
  let line = tree::rename(node, "span");
  match rend.as_deref() {
    Some(rend) if !rend.is_empty() => tree::set_classes(&line, &["l", rend]),
    _ => tree::set_classes(&line, &["l"]),
  }
  line.insert_after(tree::new_element("br", &[]));
}

/// Placeholder shown in manuscript views when nothing is transcribed yet.
pub(super) fn empty_placeholder(division: &NodeRef) {
  tree::clear_children(division);
  tree::clear_attrs(division);
  tree::set_classes(division, &["empty"]);
  division.append(tree::new_text_element(
    "p",
    &[("class", "noIndent")],
    "Ingen transkription.",
  ));
}
