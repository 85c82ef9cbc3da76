//! Footnote relocation.
//!
//! Every footnote becomes an inline indicator with a tooltip holding the
//! note, plus an entry in a numbered list appended to the note's enclosing
//! division. Indicator and entry share one identifier; the entry starts
//! with a back-link to it. Entries are filled by
//! [`FootnoteRelocator::finish`] once every note has been rewritten, so that
//! a note nested in another appears in the list in its rewritten form.
use std::sync::LazyLock;

use kuchikikiki::NodeRef;
use regex::Regex;

use crate::{
  processor::TransformOptions,
  tree,
  types::OutputMode,
  utils::compile_regex,
};

static FIRST_NUMBER: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\d+", "FIRST_NUMBER"));

/// Image used as the marker of an editorial comment.
pub const COMMENT_MARKER_SRC: &str = "images/asterisk.svg";

/// Shapes a `<note>` can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
  /// Carries a visible marker (`n`), with or without an identifier.
  Footnote,
  /// No attributes at all: an editor's comment.
  Editorial,
  /// Anything else. Left untouched and reported.
  Unrecognized,
}

/// Classify a note element by its attributes.
#[must_use]
pub fn classify(note: &NodeRef) -> NoteKind {
  if tree::has_attr(note, "n") {
    NoteKind::Footnote
  } else if tree::has_no_attrs(note) {
    NoteKind::Editorial
  } else {
    NoteKind::Unrecognized
  }
}

/// Identifier of a footnote.
///
/// A missing identifier is synthesized from the 1-based position of the
/// note within its division. When the options ask for it, the first number
/// in the identifier is offset so that two language versions shown side by
/// side never share identifiers.
///
/// # Arguments
///
/// * `raw` - The note's own `id` attribute, if any
/// * `position` - 0-based index of the note among its division's footnotes
/// * `options` - Transform options deciding the offset
#[must_use]
pub fn footnote_id(
  raw: Option<&str>,
  position: usize,
  options: &TransformOptions,
) -> String {
  let id = match raw {
    Some(id) if !id.trim().is_empty() => id.trim().to_string(),
    _ => format!("ftn{}", position + 1),
  };
  if !options.offsets_footnotes() {
    return id;
  }
  FIRST_NUMBER
    .find(&id)
    .and_then(|number| number.as_str().parse::<u64>().ok())
    .map_or(id, |number| {
      format!("ftn{}", number + u64::from(options.paired_language_offset))
    })
}

struct FootnoteList {
  division: NodeRef,
  items:    NodeRef,
  count:    usize,
}

/// A list entry waiting for the final content of its tooltip.
struct PendingEntry {
  paragraph: NodeRef,
  content:   NodeRef,
}

/// Per-run state: one list per division that has footnotes.
#[derive(Default)]
pub struct FootnoteRelocator {
  lists:    Vec<FootnoteList>,
  /// Footnotes relocated without a list, per division.
  counters: Vec<(NodeRef, usize)>,
  pending:  Vec<PendingEntry>,
}

impl FootnoteRelocator {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  fn position(&self, division: &NodeRef) -> usize {
    self
      .lists
      .iter()
      .find(|list| &list.division == division)
      .map(|list| list.count)
      .or_else(|| {
        self
          .counters
          .iter()
          .find(|(node, _)| node == division)
          .map(|(_, count)| *count)
      })
      .unwrap_or(0)
  }

  fn bump_counter(&mut self, division: &NodeRef) {
    if let Some((_, count)) =
      self.counters.iter_mut().find(|(node, _)| node == division)
    {
      *count += 1;
    } else {
      self.counters.push((division.clone(), 1));
    }
  }

  /// List element for a division, creating the notes section on first use.
  fn list_for(
    &mut self,
    division: &NodeRef,
    options: &TransformOptions,
  ) -> &mut FootnoteList {
    let index = match self
      .lists
      .iter()
      .position(|list| &list.division == division)
    {
      Some(index) => index,
      None => {
        let section =
          tree::new_element("section", &[("role", "doc-endnotes")]);
        section.append(tree::new_text_element(
          "p",
          &[("class", "noIndent")],
          options.note_heading(),
        ));
        section.append(NodeRef::new_text("\n"));
        let items = tree::new_element("ol", &[("class", "footnotesList")]);
        items.append(NodeRef::new_text("\n"));
        section.append(items.clone());
        division.append(NodeRef::new_text("\n"));
        division.append(section);

        self.lists.push(FootnoteList {
          division: division.clone(),
          items,
          count: 0,
        });
        self.lists.len() - 1
      },
    };
    &mut self.lists[index]
  }

  /// Replace a footnote with its indicator and tooltip and, except in the
  /// normalized manuscript view, add its entry to the division's list.
  ///
  /// # Returns
  ///
  /// The identifier shared by indicator and list entry.
  pub fn relocate(
    &mut self,
    note: &NodeRef,
    division: &NodeRef,
    options: &TransformOptions,
  ) -> String {
    let position = self.position(division);
    let symbol = tree::attr(note, "n").unwrap_or_default();
    let id = footnote_id(tree::attr(note, "id").as_deref(), position, options);
    let with_list = options.mode != OutputMode::NormalizedManuscript;

    let indicator = tree::new_text_element(
      "span",
      &[
        ("class", "footnoteindicator tooltiptrigger ttFoot"),
        ("tabindex", "0"),
        ("data-id", id.as_str()),
      ],
      &symbol,
    );
    let content =
      tree::new_element("span", &[("class", "ttFixed"), ("data-id", id.as_str())]);
    tree::move_children(note, &content);
    let tip = tree::new_element("span", &[("class", "tooltip ttFoot")]);
    tip.append(content.clone());
    note.insert_before(indicator);
    note.insert_before(tip);
    note.detach();

    if !with_list {
      self.bump_counter(division);
      return id;
    }

    let href = format!("#{id}");
    let entry =
      tree::new_element("li", &[("class", "footnoteItem"), ("data-id", id.as_str())]);
    let paragraph = tree::new_element("p", &[("class", "noIndent")]);
    paragraph.append(tree::new_text_element(
      "a",
      &[
        ("class", "xreference footnoteReference"),
        ("href", href.as_str()),
        ("role", "doc-backlink"),
      ],
      &symbol,
    ));
    entry.append(paragraph.clone());
    self.pending.push(PendingEntry { paragraph, content });

    let list = self.list_for(division, options);
    list.items.append(entry);
    list.items.append(NodeRef::new_text("\n"));
    list.count += 1;
    id
  }

  /// Copy each tooltip's content into its list entry. Call once all notes of
  /// the run are relocated.
  pub fn finish(&mut self) {
    for entry in self.pending.drain(..) {
      for child in entry.content.children() {
        entry.paragraph.append(tree::deep_clone(&child));
      }
    }
  }
}

/// Replace an editorial comment with a marker image and a tooltip that
/// keeps the comment's markup.
pub fn render_editorial_note(note: &NodeRef) {
  let marker = tree::new_element("img", &[
    ("class", "tooltiptrigger comment ttComment"),
    ("tabindex", "0"),
    ("src", COMMENT_MARKER_SRC),
  ]);
  let comment = tree::new_element("span", &[(
    "class",
    "tooltip ttComment teiComment noteText",
  )]);
  tree::move_children(note, &comment);
  note.insert_before(marker);
  note.insert_before(comment);
  note.detach();
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;
  use crate::{
    processor::TransformOptionsBuilder,
    tree::{
      Dialect,
      first_element_named,
      parse_fragment,
      serialize_children,
      serialize_node,
    },
  };

  #[test]
  fn test_classify() {
    let root = parse_fragment(
      r#"<note id="ftn1" n="1">a</note><note n="*">b</note><note>c</note><note id="x">d</note>"#,
    )
    .unwrap();
    let kinds: Vec<NoteKind> =
      tree::elements_named(&root, "note").iter().map(classify).collect();
    assert_eq!(kinds, vec![
      NoteKind::Footnote,
      NoteKind::Footnote,
      NoteKind::Editorial,
      NoteKind::Unrecognized,
    ]);
  }

  #[test]
  fn test_footnote_id_offsets() {
    let swedish = TransformOptionsBuilder::new().language("sv").build();
    let finnish = TransformOptionsBuilder::new().language("fi").build();

    assert_eq!(footnote_id(Some("ftn1"), 0, &swedish), "ftn1");
    assert_eq!(footnote_id(Some("ftn2"), 1, &finnish), "ftn502");
    assert_eq!(footnote_id(None, 2, &swedish), "ftn3");
    assert_eq!(footnote_id(None, 0, &finnish), "ftn501");
    assert_eq!(footnote_id(Some("note"), 0, &finnish), "note");
  }

  #[test]
  fn test_relocate_builds_indicator_and_entry() {
    let root = parse_fragment(
      r#"<div><p>Text<note id="ftn1" n="1">See <span class="person">X</span></note></p></div>"#,
    )
    .unwrap();
    let division = first_element_named(&root, "div").unwrap();
    let note = first_element_named(&root, "note").unwrap();
    let options = TransformOptions::default();

    let mut relocator = FootnoteRelocator::new();
    let id = relocator.relocate(&note, &division, &options);
    assert_eq!(id, "ftn1");
    relocator.finish();

    let html = serialize_children(&root, Dialect::Html);
    assert!(html.contains(
      r#"<span class="footnoteindicator tooltiptrigger ttFoot" data-id="ftn1" tabindex="0">1</span><span class="tooltip ttFoot"><span class="ttFixed" data-id="ftn1">See <span class="person">X</span></span></span>"#
    ));
    assert!(html.contains(
      r##"<li class="footnoteItem" data-id="ftn1"><p class="noIndent"><a class="xreference footnoteReference" href="#ftn1" role="doc-backlink">1</a>See <span class="person">X</span></p></li>"##
    ));
    assert!(html.contains(r#"<p class="noIndent">Noter</p>"#));
  }

  #[test]
  fn test_positions_are_per_division() {
    let root = parse_fragment(
      r#"<div id="a"><note n="1">x</note><note n="2">y</note></div><div id="b"><note n="1">z</note></div>"#,
    )
    .unwrap();
    let divisions = tree::elements_named(&root, "div");
    let notes = tree::elements_named(&root, "note");
    let options = TransformOptions::default();
    let mut relocator = FootnoteRelocator::new();

    assert_eq!(relocator.relocate(&notes[0], &divisions[0], &options), "ftn1");
    assert_eq!(relocator.relocate(&notes[1], &divisions[0], &options), "ftn2");
    assert_eq!(relocator.relocate(&notes[2], &divisions[1], &options), "ftn1");
    assert_eq!(tree::elements_named(&root, "ol").len(), 2);
  }

  #[test]
  fn test_nested_note_is_listed_rewritten() {
    let root = parse_fragment(
      r#"<div><p>a<note n="1">outer<note n="2">inner</note></note></p></div>"#,
    )
    .unwrap();
    let division = first_element_named(&root, "div").unwrap();
    let notes = tree::elements_named(&root, "note");
    let options = TransformOptions::default();
    let mut relocator = FootnoteRelocator::new();

    assert_eq!(relocator.relocate(&notes[0], &division, &options), "ftn1");
    assert_eq!(relocator.relocate(&notes[1], &division, &options), "ftn2");
    relocator.finish();

    let html = serialize_children(&root, Dialect::Html);
    assert!(!html.contains("<note"));
    assert_eq!(tree::elements_named(&root, "li").len(), 2);
    let first_entry = first_element_named(&root, "li").unwrap();
    let entry = serialize_node(&first_entry, Dialect::Html);
    assert!(entry.contains("outer"));
    assert!(entry.contains(r#"<span class="ttFixed" data-id="ftn2">inner</span>"#));
  }

  #[test]
  fn test_editorial_note() {
    let root = parse_fragment("a<note>comment <hi>x</hi></note>").unwrap();
    render_editorial_note(&first_element_named(&root, "note").unwrap());
    assert_eq!(
      serialize_children(&root, Dialect::Html),
      r#"a<img class="tooltiptrigger comment ttComment" src="images/asterisk.svg" tabindex="0"/><span class="tooltip ttComment teiComment noteText">comment <hi>x</hi></span>"#
    );
  }
}
