//! Style names used by OCR and document conversion tools.
//!
//! Transkribus and TEIGarage exports encode formatting as rendition values
//! named after the source document's styles. What each name means for the
//! edition lives in this table instead of in the cleanup code, since the
//! names drift whenever the tools or the editors' templates change. The
//! table is versioned and can be replaced from a TOML file.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current version of the built-in table.
pub const VOCABULARY_VERSION: u32 = 1;

/// What to do with an element carrying a known rendition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StyleAction {
  /// Remove the rendition attribute.
  DropRendition,
  /// Replace the rendition value.
  SetRendition { value: String },
  /// Remove the rendition and set `type`.
  SetType { value: String },
  /// Remove the rendition, rename the element and optionally give it a new
  /// rendition and `type`.
  Rename {
    element:   String,
    #[serde(default)]
    rendition: Option<String>,
    #[serde(default, rename = "type")]
    kind:      Option<String>,
  },
  /// Remove the element, keep its content.
  Unwrap,
  /// Remove the rendition and wrap the element in an `<opener>`.
  WrapInOpener,
}

/// A rendition fragment matched anywhere inside a rendition value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRule {
  pub pattern: String,
  #[serde(flatten)]
  pub action:  StyleAction,
}

/// Versioned mapping from tool style names to cleanup actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrVocabulary {
  pub version: u32,

  /// Paragraph renditions, matched exactly.
  pub paragraph: IndexMap<String, StyleAction>,

  /// Paragraph renditions that mean something else in letters. Consulted
  /// before [`Self::paragraph`].
  pub letter_paragraph: IndexMap<String, StyleAction>,

  /// Highlight renditions, matched exactly.
  pub highlight: IndexMap<String, StyleAction>,

  /// Highlight rendition fragments. The first matching fragment wins, so
  /// longer fragments must come first.
  pub highlight_fragment: Vec<FragmentRule>,

  /// Segment renditions, matched exactly.
  pub segment: IndexMap<String, StyleAction>,

  /// Cell renditions that carry no meaning and are removed.
  pub cell_noise: Vec<String>,
}

impl OcrVocabulary {
  /// Action for a paragraph rendition.
  #[must_use]
  pub fn paragraph_action(&self, rend: &str, letter: bool) -> Option<&StyleAction> {
    letter
      .then(|| self.letter_paragraph.get(rend))
      .flatten()
      .or_else(|| self.paragraph.get(rend))
  }

  /// Action for a highlight rendition: exact names first, then fragments.
  #[must_use]
  pub fn highlight_action(&self, rend: &str) -> Option<&StyleAction> {
    self.highlight.get(rend).or_else(|| {
      self
        .highlight_fragment
        .iter()
        .find(|rule| rend.contains(rule.pattern.as_str()))
        .map(|rule| &rule.action)
    })
  }

  #[must_use]
  pub fn segment_action(&self, rend: &str) -> Option<&StyleAction> {
    self.segment.get(rend)
  }

  #[must_use]
  pub fn is_cell_noise(&self, rend: &str) -> bool {
    self.cell_noise.iter().any(|noise| noise == rend)
  }
}

fn set_rendition(value: &str) -> StyleAction {
  StyleAction::SetRendition {
    value: value.to_string(),
  }
}

fn rename(element: &str, rendition: Option<&str>, kind: Option<&str>) -> StyleAction {
  StyleAction::Rename {
    element:   element.to_string(),
    rendition: rendition.map(str::to_string),
    kind:      kind.map(str::to_string),
  }
}

fn fragment(pattern: &str, action: StyleAction) -> FragmentRule {
  FragmentRule {
    pattern: pattern.to_string(),
    action,
  }
}

impl Default for OcrVocabulary {
  fn default() -> Self {
    let paragraph = IndexMap::from([
      ("Quote".to_string(), set_rendition("parIndent")),
      ("Leipäteksti_ei_sisennetty".to_string(), set_rendition("noIndent")),
      ("footnote text".to_string(), StyleAction::Unwrap),
      ("Subtitle".to_string(), StyleAction::SetType {
        value: "subtitle".to_string(),
      }),
      ("Runo".to_string(), rename("lg", None, None)),
      ("Kirjekappale".to_string(), StyleAction::WrapInOpener),
      ("Standard".to_string(), StyleAction::DropRendition),
      ("color(#222222)".to_string(), StyleAction::DropRendition),
    ]);
    let letter_paragraph = IndexMap::from([(
      "Leipäteksti_ei_sisennetty".to_string(),
      StyleAction::DropRendition,
    )]);
    let highlight = IndexMap::from([
      ("italic bold".to_string(), set_rendition("boldItalic")),
      ("Harvennettu".to_string(), set_rendition("expanded")),
      ("Vieraskielinen".to_string(), rename("foreign", None, None)),
      ("Emphasis".to_string(), StyleAction::DropRendition),
      (
        "Lisätty_marginaaliin".to_string(),
        rename("add", None, Some("marginalia")),
      ),
    ]);
    let highlight_fragment = vec![
      fragment("subscript", set_rendition("sub")),
      fragment("underlined", StyleAction::DropRendition),
      fragment("super", set_rendition("raised")),
      // Struck text becomes a deletion once adjacent markup is settled.
      fragment("strikethrough", rename("tag", None, None)),
      fragment("italic", StyleAction::DropRendition),
    ];
    let segment = IndexMap::from([
      ("italic bold".to_string(), rename("hi", Some("boldItalic"), None)),
      ("italic".to_string(), rename("hi", None, None)),
      ("color(222222)".to_string(), StyleAction::Unwrap),
    ]);

    Self {
      version: VOCABULARY_VERSION,
      paragraph,
      letter_paragraph,
      highlight,
      highlight_fragment,
      segment,
      cell_noise: vec![
        "Body_Text background-color(FAFAFA)".to_string(),
        "Leipäteksti_ei_sisennetty background-color(FAFAFA)".to_string(),
      ],
    }
  }
}
