//! Rewrite rule tables keyed by element and output mode.
//!
//! Each mode has a fixed pass order. A pass visits every source element of
//! one tag in document order and applies the rule [`rule_for`] returns.
//! Tags missing from a mode's order are left untouched.
use crate::{
  tree::Tag,
  types::{OutputMode, TextKind},
};

/// What to do with one source element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// Leave the element as it is.
  Keep,
  /// Drop the element, keep its children.
  Unwrap,
  /// Drop the element together with its content.
  Decompose,
  /// Give the element a new name and a fixed class.
  Rename {
    name:  &'static str,
    class: Option<&'static str>,
  },
  /// Append a space, then unwrap. Keeps words of adjacent blocks apart in
  /// plain text.
  SpacedUnwrap,
  /// Delegate to a specialized transform.
  Transform(Transform),
}

/// Specialized transforms whose outcome depends on attributes or context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
  Division,
  Paragraph,
  LineBreak,
  PageBreak,
  Heading,
  Table,
  Row,
  Cell,
  VerseLine,
  Highlight,
  Milestone,
  Anchor,
  Choice,
  Abbreviation,
  Regularization,
  Foreign,
  PersonName,
  Supplied,
  CrossReference,
  Addition,
  Deletion,
  Gap,
  Unclear,
  Note,
}

const READING_TEXT_ORDER: &[Tag] = &[
  Tag::Paragraph,
  Tag::LineBreak,
  Tag::PageBreak,
  Tag::VerseGroup,
  Tag::VerseLine,
  Tag::Heading,
  Tag::Cell,
  Tag::Row,
  Tag::List,
  Tag::Item,
  Tag::Highlight,
  Tag::Milestone,
  Tag::Anchor,
  Tag::Choice,
  Tag::Original,
  Tag::Expansion,
  Tag::Regularization,
  Tag::Abbreviation,
  Tag::Foreign,
  Tag::PersonName,
  Tag::Supplied,
  Tag::CrossReference,
  Tag::Address,
  Tag::Dateline,
  Tag::Salute,
  Tag::Signed,
  Tag::Deletion,
  Tag::Addition,
  Tag::Gap,
  Tag::Unclear,
  Tag::Note,
  Tag::Division,
  Tag::Opener,
  Tag::Closer,
  Tag::Postscript,
  Tag::Table,
];

const MANUSCRIPT_ORDER: &[Tag] = &[
  Tag::Paragraph,
  Tag::LineBreak,
  Tag::PageBreak,
  Tag::VerseGroup,
  Tag::VerseLine,
  Tag::Heading,
  Tag::Cell,
  Tag::Row,
  Tag::List,
  Tag::Item,
  Tag::Highlight,
  Tag::Milestone,
  Tag::Anchor,
  Tag::Choice,
  Tag::Original,
  Tag::Regularization,
  Tag::Abbreviation,
  Tag::Expansion,
  Tag::Foreign,
  Tag::PersonName,
  Tag::Supplied,
  Tag::CrossReference,
  Tag::Opener,
  Tag::Closer,
  Tag::Postscript,
  Tag::Address,
  Tag::Dateline,
  Tag::Salute,
  Tag::Signed,
  Tag::Addition,
  Tag::Deletion,
  Tag::Gap,
  Tag::Unclear,
  Tag::Note,
  Tag::Division,
];

const DOWNLOAD_XML_ORDER: &[Tag] = &[
  Tag::Division,
  Tag::Paragraph,
  Tag::LineBreak,
  Tag::PageBreak,
];

const DOWNLOAD_TXT_ORDER: &[Tag] = &[
  Tag::LineBreak,
  Tag::Choice,
  Tag::Closer,
  Tag::Division,
  Tag::Expansion,
  Tag::Foreign,
  Tag::Highlight,
  Tag::VerseGroup,
  Tag::List,
  Tag::Opener,
  Tag::Original,
  Tag::PersonName,
  Tag::Postscript,
  Tag::Regularization,
  Tag::Row,
  Tag::Supplied,
  Tag::Table,
  Tag::Unclear,
  Tag::CrossReference,
  Tag::Abbreviation,
  Tag::Address,
  Tag::Cell,
  Tag::Dateline,
  Tag::Heading,
  Tag::Item,
  Tag::VerseLine,
  Tag::Paragraph,
  Tag::Salute,
  Tag::Signed,
  Tag::Anchor,
  Tag::Deletion,
  Tag::Gap,
  Tag::Milestone,
  Tag::PageBreak,
  Tag::Addition,
  Tag::Note,
];

/// Order in which tags are visited for a mode.
#[must_use]
pub const fn pass_order(mode: OutputMode) -> &'static [Tag] {
  match mode {
    OutputMode::Est => READING_TEXT_ORDER,
    OutputMode::Manuscript | OutputMode::NormalizedManuscript => {
      MANUSCRIPT_ORDER
    },
    OutputMode::DownloadXml => DOWNLOAD_XML_ORDER,
    OutputMode::DownloadTxt(_) => DOWNLOAD_TXT_ORDER,
  }
}

/// Rule for a tag in a mode.
#[must_use]
pub const fn rule_for(tag: Tag, mode: OutputMode) -> Rule {
  match mode {
    OutputMode::Est => reading_text_rule(tag),
    OutputMode::Manuscript => manuscript_rule(tag),
    OutputMode::NormalizedManuscript => normalized_manuscript_rule(tag),
    OutputMode::DownloadXml => download_xml_rule(tag),
    OutputMode::DownloadTxt(kind) => download_txt_rule(tag, kind),
  }
}

const fn rename(name: &'static str, class: &'static str) -> Rule {
  Rule::Rename {
    name,
    class: Some(class),
  }
}

/// Rules shared by every HTML rendition.
const fn html_rule(tag: Tag) -> Option<Rule> {
  let rule = match tag {
    Tag::Paragraph => Rule::Transform(Transform::Paragraph),
    Tag::PageBreak => Rule::Transform(Transform::PageBreak),
    Tag::VerseGroup => rename("p", "lg"),
    Tag::VerseLine => Rule::Transform(Transform::VerseLine),
    Tag::Heading => Rule::Transform(Transform::Heading),
    Tag::Cell => Rule::Transform(Transform::Cell),
    Tag::Row => Rule::Transform(Transform::Row),
    Tag::List => Rule::Rename {
      name:  "ul",
      class: None,
    },
    Tag::Item => Rule::Rename {
      name:  "li",
      class: None,
    },
    Tag::Highlight => Rule::Transform(Transform::Highlight),
    Tag::Milestone => Rule::Transform(Transform::Milestone),
    Tag::Anchor => Rule::Transform(Transform::Anchor),
    Tag::Address => rename("p", "address"),
    Tag::Dateline => rename("p", "dateline"),
    Tag::Salute => rename("p", "salute"),
    Tag::Signed => rename("p", "signed"),
    Tag::Choice => Rule::Transform(Transform::Choice),
    Tag::CrossReference => Rule::Transform(Transform::CrossReference),
    Tag::Gap => Rule::Transform(Transform::Gap),
    Tag::Unclear => Rule::Transform(Transform::Unclear),
    Tag::Note => Rule::Transform(Transform::Note),
    Tag::Division => Rule::Transform(Transform::Division),
    _ => return None,
  };
  Some(rule)
}

const fn reading_text_rule(tag: Tag) -> Rule {
  match tag {
    Tag::LineBreak => Rule::Transform(Transform::LineBreak),
    // Stray parts of a choice that the choice transform did not consume.
    Tag::Original | Tag::Expansion => Rule::Unwrap,
    Tag::Regularization => Rule::Transform(Transform::Regularization),
    Tag::Abbreviation => Rule::Transform(Transform::Abbreviation),
    Tag::Foreign => Rule::Transform(Transform::Foreign),
    Tag::PersonName => Rule::Transform(Transform::PersonName),
    Tag::Supplied => Rule::Transform(Transform::Supplied),
    Tag::Deletion => Rule::Decompose,
    Tag::Addition => Rule::Transform(Transform::Addition),
    Tag::Opener => rename("div", "opener tei"),
    Tag::Closer => rename("div", "closer tei"),
    Tag::Postscript => rename("div", "postscript tei"),
    Tag::Table => Rule::Transform(Transform::Table),
    _ => match html_rule(tag) {
      Some(rule) => rule,
      None => Rule::Keep,
    },
  }
}

const fn manuscript_rule(tag: Tag) -> Rule {
  match tag {
    Tag::LineBreak => Rule::Transform(Transform::LineBreak),
    Tag::Original => Rule::Unwrap,
    Tag::Regularization | Tag::Expansion => Rule::Decompose,
    Tag::Abbreviation => rename("span", "abbr"),
    Tag::Foreign | Tag::PersonName => Rule::Unwrap,
    Tag::Supplied => Rule::Transform(Transform::Supplied),
    Tag::Opener => rename("div", "opener"),
    Tag::Closer => rename("div", "closer"),
    Tag::Postscript => rename("div", "postscript"),
    Tag::Addition => Rule::Transform(Transform::Addition),
    Tag::Deletion => Rule::Transform(Transform::Deletion),
    _ => match html_rule(tag) {
      Some(rule) => rule,
      None => Rule::Keep,
    },
  }
}

const fn normalized_manuscript_rule(tag: Tag) -> Rule {
  match tag {
    Tag::Supplied | Tag::Deletion => Rule::Decompose,
    Tag::Addition => Rule::Unwrap,
    // The choice transform turns expansions into tooltips.
    Tag::Expansion => Rule::Unwrap,
    _ => manuscript_rule(tag),
  }
}

const fn download_xml_rule(tag: Tag) -> Rule {
  match tag {
    Tag::Division => Rule::Transform(Transform::Division),
    Tag::Paragraph => Rule::Transform(Transform::Paragraph),
    Tag::LineBreak => Rule::Transform(Transform::LineBreak),
    Tag::PageBreak => Rule::Transform(Transform::PageBreak),
    _ => Rule::Keep,
  }
}

const fn download_txt_rule(tag: Tag, kind: TextKind) -> Rule {
  match tag {
    Tag::LineBreak => Rule::Transform(Transform::LineBreak),
    Tag::Choice
    | Tag::Closer
    | Tag::Division
    | Tag::Foreign
    | Tag::Highlight
    | Tag::VerseGroup
    | Tag::List
    | Tag::Opener
    | Tag::PersonName
    | Tag::Postscript
    | Tag::Row
    | Tag::Table
    | Tag::Unclear
    | Tag::CrossReference => Rule::Unwrap,
    Tag::Address
    | Tag::Cell
    | Tag::Dateline
    | Tag::Heading
    | Tag::Item
    | Tag::VerseLine
    | Tag::Paragraph
    | Tag::Salute
    | Tag::Signed => Rule::SpacedUnwrap,
    Tag::Anchor
    | Tag::Deletion
    | Tag::Gap
    | Tag::Milestone
    | Tag::PageBreak => Rule::Decompose,
    Tag::Addition => Rule::Transform(Transform::Addition),
    Tag::Note => Rule::Transform(Transform::Note),
    Tag::Expansion | Tag::Regularization | Tag::Supplied => match kind {
      TextKind::Established => Rule::Unwrap,
      TextKind::Manuscript => Rule::Decompose,
    },
    Tag::Abbreviation | Tag::Original => match kind {
      TextKind::Established => Rule::Decompose,
      TextKind::Manuscript => Rule::Unwrap,
    },
    _ => Rule::Keep,
  }
}
