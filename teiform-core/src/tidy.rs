//! Regex cleanup of serialized output.
use std::sync::LazyLock;

use regex::Regex;

use crate::{types::OutputMode, utils::compile_regex};

static EMPTY_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(<a class[^>]*?name[^>]*?)/>", "EMPTY_ANCHOR")
});
static TABS: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"\t", "TABS"));
static TABS_AND_NEWLINES: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\t|\n", "TABS_AND_NEWLINES"));
static BREAK_ONLY_LINE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(?m)^ *(<br/>) *$", "BREAK_ONLY_LINE"));
static WHITESPACE_RUN: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"\s{2,}", "WHITESPACE_RUN"));
// An ellipsis keeps its leading space.
static SPACE_BEFORE_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"\s+(,|;|\.[^\.]|:|\?|!)", "SPACE_BEFORE_PUNCTUATION")
});
static SPACE_BEFORE_ANY_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"\s+(,|;|\.|:|\?|!)", "SPACE_BEFORE_ANY_PUNCTUATION")
});
static PARAGRAPH_LEADING_SPACE: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"(<p(?:\s[^>]*)?>) ", "PARAGRAPH_LEADING_SPACE")
});
static PARAGRAPH_TRAILING_SPACE: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r" (</p>)", "PARAGRAPH_TRAILING_SPACE"));

/// Clean up serialized output for a mode.
///
/// HTML renditions get collapsed whitespace and no padding inside
/// paragraphs; the reading text and the normalized manuscript view also
/// lose spaces left before punctuation by removed content. Plain text is
/// flattened to one trimmed line. Downloadable TEI is returned as is.
#[must_use]
pub fn tidy(content: &str, mode: OutputMode) -> String {
  match mode {
    OutputMode::DownloadXml => content.to_string(),
    OutputMode::DownloadTxt(_) => tidy_text(content),
    OutputMode::Est => {
      let text = EMPTY_ANCHOR.replace_all(content, "$1></a>");
      let text = collapse_html(&text);
      let text = SPACE_BEFORE_PUNCTUATION.replace_all(&text, "$1");
      trim_paragraphs(&text)
    },
    OutputMode::NormalizedManuscript => {
      let text = collapse_html(content);
      let text = SPACE_BEFORE_ANY_PUNCTUATION.replace_all(&text, "$1");
      trim_paragraphs(&text)
    },
    OutputMode::Manuscript => trim_paragraphs(&collapse_html(content)),
  }
}

fn collapse_html(content: &str) -> String {
  let text = TABS.replace_all(content, "");
  let text = BREAK_ONLY_LINE.replace_all(&text, "");
  WHITESPACE_RUN.replace_all(&text, " ").into_owned()
}

fn trim_paragraphs(content: &str) -> String {
  let text = PARAGRAPH_LEADING_SPACE.replace_all(content, "$1");
  PARAGRAPH_TRAILING_SPACE
    .replace_all(&text, "$1")
    .trim()
    .to_string()
}

fn tidy_text(content: &str) -> String {
  let text = TABS_AND_NEWLINES.replace_all(content, "");
  let text = WHITESPACE_RUN.replace_all(&text, " ");
  let text = SPACE_BEFORE_PUNCTUATION.replace_all(&text, "$1");
  text.trim().to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::TextKind;

  #[test]
  fn test_reading_text_tidy() {
    let html = "<p class=\"spaced\"> Ord  , och\t mer ... slut </p>\n  <br/>  \n";
    assert_eq!(
      tidy(html, OutputMode::Est),
      "<p class=\"spaced\">Ord, och mer ... slut</p>"
    );
  }

  #[test]
  fn test_empty_anchor_is_closed() {
    assert_eq!(
      tidy(r#"<a class="anchor x" name="x"/>"#, OutputMode::Est),
      r#"<a class="anchor x" name="x"></a>"#
    );
  }

  #[test]
  fn test_manuscript_keeps_punctuation_spacing() {
    assert_eq!(
      tidy("<p>ord , ord</p>", OutputMode::Manuscript),
      "<p>ord , ord</p>"
    );
    assert_eq!(
      tidy("<p>ord , ord</p>", OutputMode::NormalizedManuscript),
      "<p>ord, ord</p>"
    );
  }

  #[test]
  fn test_plain_text_tidy() {
    assert_eq!(
      tidy(
        "\n\tFörsta  rad \nandra ; tredje \n",
        OutputMode::DownloadTxt(TextKind::Established)
      ),
      "Första rad andra; tredje"
    );
    assert_eq!(tidy(" \n\t ", OutputMode::DownloadTxt(TextKind::Manuscript)), "");
  }

  #[test]
  fn test_download_xml_untouched() {
    let xml = "<p>a  ,\tb</p>";
    assert_eq!(tidy(xml, OutputMode::DownloadXml), xml);
  }
}
