//! Closed vocabulary of source element names.

/// Element kinds recognized in edition sources.
///
/// Anything outside this vocabulary parses fine but has no rewrite rule and
/// is left where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
  Division,
  Paragraph,
  LineBreak,
  PageBreak,
  Heading,
  Table,
  Row,
  Cell,
  List,
  Item,
  Highlight,
  VerseGroup,
  VerseLine,
  Choice,
  Abbreviation,
  Expansion,
  Original,
  Regularization,
  Supplied,
  CrossReference,
  Reference,
  PersonName,
  Foreign,
  Addition,
  Deletion,
  Gap,
  Unclear,
  Note,
  Opener,
  Closer,
  Postscript,
  Address,
  Dateline,
  Salute,
  Signed,
  Milestone,
  Anchor,
  Segment,
  AnonymousBlock,
  Comment,
  TagMark,
}

impl Tag {
  /// Every tag, in declaration order.
  pub const ALL: [Self; 41] = [
    Self::Division,
    Self::Paragraph,
    Self::LineBreak,
    Self::PageBreak,
    Self::Heading,
    Self::Table,
    Self::Row,
    Self::Cell,
    Self::List,
    Self::Item,
    Self::Highlight,
    Self::VerseGroup,
    Self::VerseLine,
    Self::Choice,
    Self::Abbreviation,
    Self::Expansion,
    Self::Original,
    Self::Regularization,
    Self::Supplied,
    Self::CrossReference,
    Self::Reference,
    Self::PersonName,
    Self::Foreign,
    Self::Addition,
    Self::Deletion,
    Self::Gap,
    Self::Unclear,
    Self::Note,
    Self::Opener,
    Self::Closer,
    Self::Postscript,
    Self::Address,
    Self::Dateline,
    Self::Salute,
    Self::Signed,
    Self::Milestone,
    Self::Anchor,
    Self::Segment,
    Self::AnonymousBlock,
    Self::Comment,
    Self::TagMark,
  ];

  /// Element name as written in the source markup.
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::Division => "div",
      Self::Paragraph => "p",
      Self::LineBreak => "lb",
      Self::PageBreak => "pb",
      Self::Heading => "head",
      Self::Table => "table",
      Self::Row => "row",
      Self::Cell => "cell",
      Self::List => "list",
      Self::Item => "item",
      Self::Highlight => "hi",
      Self::VerseGroup => "lg",
      Self::VerseLine => "l",
      Self::Choice => "choice",
      Self::Abbreviation => "abbr",
      Self::Expansion => "expan",
      Self::Original => "orig",
      Self::Regularization => "reg",
      Self::Supplied => "supplied",
      Self::CrossReference => "xref",
      Self::Reference => "ref",
      Self::PersonName => "persName",
      Self::Foreign => "foreign",
      Self::Addition => "add",
      Self::Deletion => "del",
      Self::Gap => "gap",
      Self::Unclear => "unclear",
      Self::Note => "note",
      Self::Opener => "opener",
      Self::Closer => "closer",
      Self::Postscript => "postscript",
      Self::Address => "address",
      Self::Dateline => "dateline",
      Self::Salute => "salute",
      Self::Signed => "signed",
      Self::Milestone => "milestone",
      Self::Anchor => "anchor",
      Self::Segment => "seg",
      Self::AnonymousBlock => "ab",
      Self::Comment => "comment",
      Self::TagMark => "tag",
    }
  }

  /// Classify an element name. Returns `None` for names outside the
  /// vocabulary.
  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.iter().copied().find(|tag| tag.name() == name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_names_round_trip() {
    for tag in Tag::ALL {
      assert_eq!(Tag::from_name(tag.name()), Some(tag));
    }
  }

  #[test]
  fn test_unknown_names() {
    assert_eq!(Tag::from_name("span"), None);
    assert_eq!(Tag::from_name("persname"), None);
    assert_eq!(Tag::from_name(""), None);
  }
}
