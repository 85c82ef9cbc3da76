//! Text-level cleanup of serialized project TEI.
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{DocumentType, GoodXmlOptions};
use crate::{abbreviations, utils::compile_regex};

const NARROW_NBSP: &str = "&#x202F;";

static FALSE_VERSE_HYPHEN: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"-\n", "FALSE_VERSE_HYPHEN"));
static FALSE_VERSE_INDENT: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\t{1,7}|\s{2}", "FALSE_VERSE_INDENT"));
static LAYOUT_WHITESPACE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\n|\t|\s{2,}", "LAYOUT_WHITESPACE"));
static INDENTED_NEWLINE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"\n\t{1,7}|\n\s{1,30}", "INDENTED_NEWLINE")
});
static DIVISION_START: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(<div[^>]*>)", "DIVISION_START"));
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r"(</head>|</p>|<lg>|</lg>|</l>|<table>|</table>|</row>|<list>|</list>|</item>|</div>)",
    "BLOCK_END",
  )
});
static LETTER_PART_END: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(</opener>|</closer>)", "LETTER_PART_END"));
static PARAGRAPH_OPENING_BREAK: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(<p [^>]+>|<p>)<lb/>", "PARAGRAPH_OPENING_BREAK")
});
static LINE_BREAK: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r" *<lb/> *", "LINE_BREAK"));
static PARAGRAPH_CLOSING_BREAK: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"<lb/>\n</p>", "PARAGRAPH_CLOSING_BREAK"));
static SPACE_BEFORE_PAGE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r" (<pb [^>]+/>)", "SPACE_BEFORE_PAGE_BREAK")
});
static PAGE_BREAK_BEFORE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r"(<pb [^>]+/>) *(<p|<lg>|<list>|<table>)",
    "PAGE_BREAK_BEFORE_BLOCK",
  )
});
static ELLIPSIS: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(\w) *\. *\.( *\.)?", "ELLIPSIS"));
static SPLIT_HIGHLIGHT: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"</hi><lb/>\n<hi>", "SPLIT_HIGHLIGHT"));
static GROUPED_MILLIONS: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(\d{1,3})( |,)(\d{3,})( |,)(\d{3,})", "GROUPED_MILLIONS")
});
static GROUPED_THOUSANDS: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(\d{1,3})( |,)(\d{3,})", "GROUPED_THOUSANDS")
});
static UNGROUPED_MILLIONS: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(\d{1,3})(\d{3})(\d{3,})", "UNGROUPED_MILLIONS")
});
static UNGROUPED_LARGE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(\d{2,3})(\d{3,})", "UNGROUPED_LARGE"));
static FOUR_DIGITS: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\d{4,}", "FOUR_DIGITS"));
static NOTE_MARKER: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r" *\*\) *", "NOTE_MARKER"));
static PERCENT_AFTER_CHAR: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"([^ \x{A0}])%", "PERCENT_AFTER_CHAR"));
static NOTE_LEADING_SPACE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(<note [^>]+>) ", "NOTE_LEADING_SPACE"));
static LINE_LEADING_SPACE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?m)^ +<", "LINE_LEADING_SPACE"));
static ARTICLE_HYPHEN_BREAK: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"-<lb/>\n", "ARTICLE_HYPHEN_BREAK"));
static ARTICLE_BREAK: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"<lb/>\n", "ARTICLE_BREAK"));
static CHOPPED_DELETION: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"</del><lb/>\n<del>", "CHOPPED_DELETION"));
static CHOPPED_ADDITION: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"</add><lb/>\n<add>", "CHOPPED_ADDITION"));
static FALSE_PARAGRAPH: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"</p>\n<p>", "FALSE_PARAGRAPH"));
static FALSE_PARAGRAPH_AT_PAGE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"</p>\n(<pb [^>]+/>)\n<p>", "FALSE_PARAGRAPH_AT_PAGE")
});
static MARKUP_OR_TEXT: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(<[^>]*>)|([^<]+)", "MARKUP_OR_TEXT"));

/// Characters replaced one by one, applied in order.
const CHARACTER_FIXES: &[(&str, &str)] = &[
  ("<p/>", ""),
  ("„", "”"),
  ("‟", "”"),
  ("“", "”"),
  ("»", "”"),
  ("«", "”"),
  ("—", "–"),
  ("'", "’"),
  ("’’", "”"),
  ("´", "’"),
  ("-\u{AD}", "-"),
  ("\u{AD}-", "-"),
  ("\u{AD}", "-"),
];

/// Apply `f` to the text between tags, leaving markup untouched.
fn map_text<F>(xml: &str, f: F) -> String
where
  F: Fn(&str) -> String,
{
  MARKUP_OR_TEXT
    .replace_all(xml, |caps: &Captures<'_>| {
      caps
        .get(1)
        .map_or_else(|| f(&caps[0]), |markup| markup.as_str().to_string())
    })
    .into_owned()
}

/// Narrow no-break spaces as thousands separators. Four-digit numbers
/// between 1500 and 1914 are years in this material and stay as they are.
fn group_digits(text: &str) -> String {
  let text = GROUPED_MILLIONS.replace_all(text, format!("${{1}}{NARROW_NBSP}${{3}}{NARROW_NBSP}${{5}}"));
  let text = GROUPED_THOUSANDS.replace_all(&text, format!("${{1}}{NARROW_NBSP}${{3}}"));
  let text =
    UNGROUPED_MILLIONS.replace_all(&text, format!("${{1}}{NARROW_NBSP}${{2}}{NARROW_NBSP}${{3}}"));
  let text = UNGROUPED_LARGE.replace_all(&text, format!("${{1}}{NARROW_NBSP}${{2}}"));
  FOUR_DIGITS
    .replace_all(&text, |caps: &Captures<'_>| {
      let number = &caps[0];
      let is_year = number
        .parse::<u32>()
        .is_ok_and(|year| (1500..=1914).contains(&year));
      if is_year {
        number.to_string()
      } else {
        format!("{}{NARROW_NBSP}{}", &number[..1], &number[1..])
      }
    })
    .into_owned()
}

fn collapse_layout(xml: &str, false_verse: bool, document_type: DocumentType) -> String {
  if false_verse {
    let xml = FALSE_VERSE_HYPHEN.replace_all(xml, "");
    let xml = xml.replace('\n', " ");
    return FALSE_VERSE_INDENT.replace_all(&xml, "").into_owned();
  }
  match document_type {
    DocumentType::Letter | DocumentType::Misc => {
      LAYOUT_WHITESPACE.replace_all(xml, "").into_owned()
    },
    DocumentType::Article => {
      let xml = INDENTED_NEWLINE.replace_all(xml, " ");
      LAYOUT_WHITESPACE.replace_all(&xml, "").into_owned()
    },
  }
}

/// Reformat serialized TEI into the layout editors work with and fix
/// characters commonly broken by OCR and word processors.
///
/// # Arguments
///
/// * `xml` - Serialized document
/// * `false_verse` - Whether verse lines inside paragraphs were unwrapped,
///   which leaves one physical line per source line to be rejoined
/// * `options` - Document type, paragraph stitching and abbreviations
#[must_use]
pub fn tidy_xml(xml: &str, false_verse: bool, options: &GoodXmlOptions) -> String {
  let document_type = options.document_type;
  let xml = collapse_layout(xml, false_verse, document_type);

  let xml = DIVISION_START.replace_all(&xml, "\n$1\n");
  let xml = BLOCK_END.replace_all(&xml, "$1\n");
  let xml = if document_type == DocumentType::Letter {
    LETTER_PART_END.replace_all(&xml, "$1\n").into_owned()
  } else {
    xml.into_owned()
  };
  let xml = PARAGRAPH_OPENING_BREAK.replace_all(&xml, "$1");
  let xml = LINE_BREAK.replace_all(&xml, "<lb/>\n");
  let xml = if document_type == DocumentType::Misc {
    PARAGRAPH_CLOSING_BREAK.replace_all(&xml, "</p>").into_owned()
  } else {
    xml.into_owned()
  };
  let xml = xml.replace('\u{A0}', " ");
  let xml = SPACE_BEFORE_PAGE_BREAK.replace_all(&xml, "$1");
  let xml = PAGE_BREAK_BEFORE_BLOCK.replace_all(&xml, "$1\n$2");
  let xml = ELLIPSIS.replace_all(&xml, "$1 ...");
  let xml = SPLIT_HIGHLIGHT.replace_all(&xml, "<lb/>\n");
  let xml = map_text(&xml, group_digits);
  let xml = NOTE_MARKER.replace_all(&xml, r#"<note id="" n="*)"></note>"#);
  let xml = xml
    .replace("&quot;", "”")
    .replace("&apos;", "’")
    .replace('º', r#"<hi rend="raised">o</hi>"#);
  let xml = PERCENT_AFTER_CHAR.replace_all(&xml, "${1}&#x00A0;%");
  let xml = xml.replace(" %", "&#x00A0;%");
  let xml = NOTE_LEADING_SPACE.replace_all(&xml, "$1");
  let xml = LINE_LEADING_SPACE.replace_all(&xml, "<");
  let xml = if document_type == DocumentType::Article {
    let xml = ARTICLE_HYPHEN_BREAK.replace_all(&xml, "");
    ARTICLE_BREAK.replace_all(&xml, " ").into_owned()
  } else {
    xml.into_owned()
  };
  let xml = CHOPPED_DELETION.replace_all(&xml, "<lb/>\n");
  let xml = CHOPPED_ADDITION.replace_all(&xml, "<lb/>\n");
  let xml = if options.correct_paragraphs {
    let xml = FALSE_PARAGRAPH.replace_all(&xml, "<lb/>\n");
    FALSE_PARAGRAPH_AT_PAGE
      .replace_all(&xml, "<lb/>\n$1\n")
      .into_owned()
  } else {
    xml.into_owned()
  };
  let xml = map_text(&xml, |text| text.replace('"', "”"));

  let mut xml = xml;
  for (from, to) in CHARACTER_FIXES {
    xml = xml.replace(from, to);
  }

  if options.expand_untagged {
    xml = abbreviations::expand_untagged(&xml, &options.abbreviations);
  }
  xml
}
