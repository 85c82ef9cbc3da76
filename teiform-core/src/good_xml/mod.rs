//! Conversion of OCR and document-converter TEI exports into the project's
//! hand-edited source format.
//!
//! The export's `<body>` is placed in a template for the document type, the
//! tool-specific attributes are cleaned up following an [`OcrVocabulary`],
//! and the serialized result goes through [`tidy::tidy_xml`].
pub mod tidy;
pub mod vocabulary;

use std::{fmt, str::FromStr, sync::LazyLock};

use kuchikikiki::NodeRef;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
pub use vocabulary::{
  FragmentRule,
  OcrVocabulary,
  StyleAction,
  VOCABULARY_VERSION,
};

use crate::{
  abbreviations::AbbreviationDictionary,
  error::{TransformError, TransformResultOf},
  tree::{self, Dialect},
  utils::compile_regex,
};

static COLOR: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\s*color\(.*\)", "COLOR"));

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Kind of publication being prepared. Decides the body template and a few
/// layout rules.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
  Letter,
  Misc,
  #[default]
  Article,
}

impl DocumentType {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Letter => "letter",
      Self::Misc => "misc",
      Self::Article => "article",
    }
  }
}

impl fmt::Display for DocumentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DocumentType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "letter" => Ok(Self::Letter),
      "misc" => Ok(Self::Misc),
      "article" => Ok(Self::Article),
      other => Err(format!("Unknown document type: {other}")),
    }
  }
}

/// Settings for one good_xml run.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodXmlOptions {
  pub document_type:      DocumentType,
  /// Join paragraphs that OCR split at line ends. Only safe for sources
  /// where real paragraph ends are marked some other way.
  pub correct_paragraphs: bool,
  /// Encode untagged words found in the abbreviation dictionary.
  pub expand_untagged:    bool,
  pub vocabulary:         OcrVocabulary,
  pub abbreviations:      AbbreviationDictionary,
}

impl Default for GoodXmlOptions {
  fn default() -> Self {
    Self {
      document_type:      DocumentType::default(),
      correct_paragraphs: false,
      expand_untagged:    true,
      vocabulary:         OcrVocabulary::default(),
      abbreviations:      AbbreviationDictionary::default(),
    }
  }
}

/// Convert an exported TEI document to project-format XML.
///
/// # Arguments
///
/// * `source` - The exported document
/// * `options` - Document type, style vocabulary and abbreviations
///
/// # Returns
///
/// The cleaned division, serialized with an XML declaration.
///
/// # Errors
///
/// Returns an error if the source is not well-formed or has no `<body>`.
pub fn clean_document(
  source: &str,
  options: &GoodXmlOptions,
) -> TransformResultOf<String> {
  let document = tree::parse_document(source)?;
  let body = tree::first_element_named(&document, "body")
    .ok_or(TransformError::MissingElement("body"))?;

  let output = NodeRef::new_document();
  let division = body_template(options.document_type);
  output.append(division.clone());
  match tree::first_element_named(&division, "closer") {
    Some(closer) => {
      while let Some(child) = body.first_child() {
        closer.insert_before(child);
      }
    },
    None => tree::move_children(&body, &division),
  }

  let false_verse = clean_tree(&division, options);
  debug!(
    "Cleaned {} document, false verse: {false_verse}",
    options.document_type
  );

  let xml = format!(
    "{XML_DECLARATION}{}",
    tree::serialize_node(&division, Dialect::Xml)
  );
  Ok(tidy::tidy_xml(&xml, false_verse, options))
}

fn body_template(document_type: DocumentType) -> NodeRef {
  let division = tree::new_element("div", &[("type", document_type.as_str())]);
  if document_type == DocumentType::Letter {
    let opener = tree::new_element("opener", &[]);
    opener.append(tree::new_element("dateline", &[]));
    opener.append(tree::new_element("salute", &[]));
    let closer = tree::new_element("closer", &[]);
    closer.append(tree::new_element("salute", &[]));
    closer.append(tree::new_element("signed", &[]));
    division.append(opener);
    division.append(closer);
  }
  division
}

/// Apply every element cleanup in order.
///
/// Returns whether verse lines inside paragraphs were unwrapped.
fn clean_tree(root: &NodeRef, options: &GoodXmlOptions) -> bool {
  let letter = options.document_type == DocumentType::Letter;

  for pb in tree::elements_named(root, "pb") {
    tree::remove_attr(&pb, "facs");
    tree::remove_attr(&pb, "xml:id");
    tree::set_attr(&pb, "type", "orig");
  }

  for p in tree::elements_named(root, "p") {
    tree::remove_attr(&p, "facs");
    tree::remove_attr(&p, "style");
    if let Some(rend) = tree::attr(&p, "rend")
      && let Some(action) = options.vocabulary.paragraph_action(&rend, letter)
    {
      apply_style_action(&p, action);
    }
  }

  let false_verse = unwrap_false_verse(root);

  for lb in tree::elements_named(root, "lb") {
    tree::remove_attr(&lb, "facs");
    tree::remove_attr(&lb, "n");
  }

  for head in tree::elements_named(root, "head") {
    if let Some(rend) = tree::remove_attr(&head, "rend") {
      tree::set_attr(&head, "type", &rend);
    }
    let depth = head
      .ancestors()
      .filter(|ancestor| tree::is_element(ancestor, "div"))
      .count();
    if let Some(level) = heading_level(depth) {
      tree::set_attr(&head, "level", level);
    }
  }

  for table in tree::elements_named(root, "table") {
    tree::remove_attr(&table, "rend");
  }
  for cell in tree::elements_named(root, "cell") {
    tree::remove_attr(&cell, "style");
    if tree::attr(&cell, "rend")
      .is_some_and(|rend| options.vocabulary.is_cell_noise(&rend))
    {
      tree::remove_attr(&cell, "rend");
    }
  }
  for list in tree::elements_named(root, "list") {
    tree::remove_attr(&list, "type");
  }

  for hi in tree::elements_named(root, "hi") {
    clean_highlight(&hi, options);
  }

  for seg in tree::elements_named(root, "seg") {
    tree::remove_attr(&seg, "xml:space");
    if let Some(rend) = tree::attr(&seg, "rend")
      && let Some(action) = options.vocabulary.segment_action(&rend)
    {
      apply_style_action(&seg, action);
    }
  }

  for reference in tree::elements_named(root, "ref") {
    if tree::remove_attr(&reference, "target").is_some() {
      tree::set_attr(&reference, "type", "readingtext");
      tree::set_attr(&reference, "id", "");
      tree::rename(&reference, "xref");
    }
  }

  for block in tree::elements_named(root, "ab") {
    tree::remove_attr(&block, "facs");
    tree::remove_attr(&block, "type");
    tree::rename(&block, "p");
  }

  for note in tree::elements_named(root, "note") {
    tree::remove_attr(&note, "place");
    if let Some(id) = tree::remove_attr(&note, "xml:id") {
      tree::set_attr(&note, "id", &id);
    }
  }
  for supplied in tree::elements_named(root, "supplied") {
    tree::remove_attr(&supplied, "reason");
  }
  for comment in tree::elements_named(root, "comment") {
    tree::rename(&comment, "note");
  }

  for struck in tree::elements_named(root, "tag") {
    if is_inside_deletion(&struck) {
      tree::unwrap(&struck);
    } else {
      tree::rename(&struck, "del");
    }
  }

  fill_expansions(root, &options.abbreviations);
  false_verse
}

const fn heading_level(division_depth: usize) -> Option<&'static str> {
  match division_depth {
    0..=2 => Some("1"),
    3 => Some("2"),
    4 => Some("3"),
    5 => Some("4"),
    _ => None,
  }
}

fn apply_style_action(node: &NodeRef, action: &StyleAction) {
  match action {
    StyleAction::DropRendition => {
      tree::remove_attr(node, "rend");
    },
    StyleAction::SetRendition { value } => tree::set_attr(node, "rend", value),
    StyleAction::SetType { value } => {
      tree::remove_attr(node, "rend");
      tree::set_attr(node, "type", value);
    },
    StyleAction::Rename {
      element,
      rendition,
      kind,
    } => {
      tree::remove_attr(node, "rend");
      if let Some(rendition) = rendition {
        tree::set_attr(node, "rend", rendition);
      }
      if let Some(kind) = kind {
        tree::set_attr(node, "type", kind);
      }
      tree::rename(node, element);
    },
    StyleAction::Unwrap => tree::unwrap(node),
    StyleAction::WrapInOpener => {
      tree::remove_attr(node, "rend");
      tree::wrap(node, &tree::new_element("opener", &[]));
    },
  }
}

/// Prose exported as verse lines inside paragraphs loses its lines and, if
/// any were found, every line group.
fn unwrap_false_verse(root: &NodeRef) -> bool {
  let mut false_verse = false;
  for line in tree::elements_named(root, "l") {
    if tree::attr(&line, "rend").as_deref() == Some("indent") {
      tree::remove_attr(&line, "rend");
    }
    if tree::closest_ancestor(&line, "p").is_some() {
      tree::unwrap(&line);
      false_verse = true;
    }
  }
  if false_verse {
    for group in tree::elements_named(root, "lg") {
      tree::unwrap(&group);
    }
  }
  false_verse
}

fn clean_highlight(hi: &NodeRef, options: &GoodXmlOptions) {
  // Superscript exported without any attribute, except from articles.
  if tree::has_no_attrs(hi) && options.document_type != DocumentType::Article {
    tree::set_attr(hi, "rend", "raised");
    return;
  }
  tree::remove_attr(hi, "xml:space");

  if let Some(rend) = tree::attr(hi, "rend") {
    tree::remove_attr(hi, "style");
    let rend = strip_color(&rend);
    if rend.is_empty() {
      tree::unwrap(hi);
      return;
    }
    tree::set_attr(hi, "rend", &rend);
    if let Some(action) = options.vocabulary.highlight_action(&rend) {
      apply_style_action(hi, action);
    }
    return;
  }

  if let Some(style) = tree::attr(hi, "style") {
    if style.contains("super") {
      tree::remove_attr(hi, "style");
      tree::set_attr(hi, "rend", "raised");
    } else if style == "text-decoration: underline;" {
      tree::remove_attr(hi, "style");
    } else {
      tree::unwrap(hi);
    }
  }
}

/// Remove a trailing `color(...)` from a rendition value.
fn strip_color(rend: &str) -> String {
  COLOR.replace_all(rend, "").into_owned()
}

/// A struck-through highlight already inside a deletion, or wrapping one,
/// adds nothing.
fn is_inside_deletion(struck: &NodeRef) -> bool {
  if let Some(parent) = struck.parent()
    && tree::is_element(&parent, "del")
    && parent.children().filter(|c| !tree::is_blank_text(c)).count() == 1
  {
    return true;
  }
  let mut significant = struck.children().filter(|c| !tree::is_blank_text(c));
  matches!(
    (significant.next(), significant.next()),
    (Some(only), None) if tree::is_element(&only, "del")
  )
}

/// Fill empty `<expan>` elements from the dictionary.
fn fill_expansions(root: &NodeRef, dictionary: &AbbreviationDictionary) {
  if dictionary.is_empty() {
    return;
  }
  for choice in tree::elements_named(root, "choice") {
    let Some(abbr) = choice.children().find(|c| tree::is_element(c, "abbr"))
    else {
      continue;
    };
    let key = tree::serialize_children(&abbr, Dialect::Xml);
    let Some(expansion) = dictionary.get(&key) else {
      continue;
    };
    let empty: Vec<NodeRef> = choice
      .children()
      .filter(|c| tree::is_element(c, "expan") && c.first_child().is_none())
      .collect();
    for expan in empty {
      expan.append(NodeRef::new_text(expansion));
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;

  fn options(document_type: DocumentType) -> GoodXmlOptions {
    GoodXmlOptions {
      document_type,
      expand_untagged: false,
      ..Default::default()
    }
  }

  fn export(body: &str) -> String {
    format!(
      r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><teiHeader><fileDesc><titleStmt><title>T</title></titleStmt></fileDesc></teiHeader><text><body>{body}</body></text></TEI>"#
    )
  }

  #[test]
  fn test_document_type_from_str() {
    assert_eq!("Letter".parse::<DocumentType>(), Ok(DocumentType::Letter));
    assert_eq!("misc".parse::<DocumentType>(), Ok(DocumentType::Misc));
    assert!("novel".parse::<DocumentType>().is_err());
    assert_eq!(DocumentType::default(), DocumentType::Article);
  }

  #[test]
  fn test_missing_body() {
    let result = clean_document("<TEI><text/></TEI>", &GoodXmlOptions::default());
    assert!(matches!(result, Err(TransformError::MissingElement("body"))));
  }

  #[test]
  fn test_letter_template() {
    let xml = clean_document(
      &export("<p>Bäste bror!</p>"),
      &options(DocumentType::Letter),
    )
    .unwrap();
    assert!(xml.starts_with(XML_DECLARATION));
    let opener = xml.find("<opener>").unwrap();
    let text = xml.find("Bäste bror!").unwrap();
    let closer = xml.find("<closer>").unwrap();
    assert!(opener < text && text < closer);
    assert!(xml.contains(r#"<div type="letter">"#));
    assert!(xml.contains("<signed/>"));
  }

  #[test]
  fn test_page_break_and_paragraph_attributes() {
    let xml = clean_document(
      &export(
        r##"<pb facs="#f1" xml:id="p1" n="1"/><p facs="#r1" style="x" rend="Quote">Citat</p><p rend="Subtitle">Under</p>"##,
      ),
      &options(DocumentType::Misc),
    )
    .unwrap();
    assert!(xml.contains(r#"<pb n="1" type="orig"/>"#));
    assert!(xml.contains(r#"<p rend="parIndent">Citat</p>"#));
    assert!(xml.contains(r#"<p type="subtitle">Under</p>"#));
  }

  #[test]
  fn test_letter_paragraph_rendition() {
    let body = r#"<p rend="Leipäteksti_ei_sisennetty">Text</p>"#;
    let letter =
      clean_document(&export(body), &options(DocumentType::Letter)).unwrap();
    let article =
      clean_document(&export(body), &options(DocumentType::Article)).unwrap();
    assert!(letter.contains("<p>Text</p>"));
    assert!(article.contains(r#"<p rend="noIndent">Text</p>"#));
  }

  #[test]
  fn test_false_verse_is_unwrapped() {
    let root = tree::parse_fragment(
      r#"<lg><l rend="indent">Dikt</l></lg><p><lg><l>En rad</l><l>till</l></lg></p>"#,
    )
    .unwrap();
    assert!(unwrap_false_verse(&root));
    assert_eq!(tree::elements_named(&root, "l").len(), 1);
    assert!(tree::elements_named(&root, "lg").is_empty());
    assert_eq!(
      tree::serialize_children(&root, Dialect::Xml),
      "<l>Dikt</l><p>En radtill</p>"
    );
  }

  #[test]
  fn test_heading_levels_follow_division_depth() {
    let xml = clean_document(
      &export(
        r#"<head rend="title">A</head><div><div><head>B</head><div><head>C</head></div></div></div>"#,
      ),
      &options(DocumentType::Misc),
    )
    .unwrap();
    assert!(xml.contains(r#"<head level="1" type="title">A</head>"#));
    assert!(xml.contains(r#"<head level="2">B</head>"#));
    assert!(xml.contains(r#"<head level="3">C</head>"#));
  }

  #[test]
  fn test_highlight_cleanup() {
    let root = tree::parse_fragment(concat!(
      r#"<hi rend="italic bold color(#222222)">a</hi>"#,
      r#"<hi rend="color(#333333)">b</hi>"#,
      r#"<hi rend="Vieraskielinen">c</hi>"#,
      r#"<hi style="vertical-align: super;">d</hi>"#,
      r#"<hi style="font-size: 9pt;">e</hi>"#,
      r#"<hi xml:space="preserve" rend="Harvennettu">f</hi>"#,
      "<hi>g</hi>",
    ))
    .unwrap();
    for hi in tree::elements_named(&root, "hi") {
      clean_highlight(&hi, &options(DocumentType::Letter));
    }
    assert_eq!(
      tree::serialize_children(&root, Dialect::Xml),
      concat!(
        r#"<hi rend="boldItalic">a</hi>b<foreign>c</foreign>"#,
        r#"<hi rend="raised">d</hi>e<hi rend="expanded">f</hi>"#,
        r#"<hi rend="raised">g</hi>"#,
      )
    );
  }

  #[test]
  fn test_strip_color() {
    assert_eq!(strip_color("italic color(#222222)"), "italic");
    assert_eq!(strip_color("color(#222222)"), "");
    assert_eq!(strip_color("bold"), "bold");
  }

  #[test]
  fn test_struck_text_becomes_deletion() {
    let root = tree::parse_fragment(
      "<tag>gammal</tag> <del><tag>x</tag></del> <tag><del>y</del></tag>",
    )
    .unwrap();
    for struck in tree::elements_named(&root, "tag") {
      if is_inside_deletion(&struck) {
        tree::unwrap(&struck);
      } else {
        tree::rename(&struck, "del");
      }
    }
    assert_eq!(
      tree::serialize_children(&root, Dialect::Xml),
      "<del>gammal</del> <del>x</del> <del>y</del>"
    );
  }

  #[test]
  fn test_references_notes_and_blocks() {
    let xml = clean_document(
      &export(
        r##"<ab facs="#a" type="x">Block</ab><p><ref target="#n1">1</ref><note place="foot" xml:id="n1">Not</note><comment>Kommentar</comment><supplied reason="lost">o</supplied></p>"##,
      ),
      &options(DocumentType::Misc),
    )
    .unwrap();
    assert!(xml.contains("<p>Block</p>"));
    assert!(xml.contains(r#"<xref id="" type="readingtext">1</xref>"#));
    assert!(xml.contains(r#"<note id="n1">Not</note>"#));
    assert!(xml.contains("<note>Kommentar</note>"));
    assert!(xml.contains("<supplied>o</supplied>"));
  }

  #[test]
  fn test_empty_expansion_is_filled() {
    let mut abbreviations = AbbreviationDictionary::new();
    abbreviations.insert_pair("D:r", "Doktor");
    let options = GoodXmlOptions {
      abbreviations,
      ..options(DocumentType::Misc)
    };
    let xml = clean_document(
      &export("<p><choice><abbr>D:r</abbr><expan/></choice> och <choice><abbr>X</abbr><expan/></choice></p>"),
      &options,
    )
    .unwrap();
    assert!(
      xml.contains("<choice><abbr>D:r</abbr><expan>Doktor</expan></choice>")
    );
    assert!(xml.contains("<choice><abbr>X</abbr><expan/></choice>"));
  }
}
