//! Character-level repair of transcription line division, applied to the
//! raw source text before it is parsed.
//!
//! Transcriptions keep one `<lb/>` per manuscript line. A hyphen-minus or
//! soft hyphen before a line break is a hyphenation that disappears when
//! lines are joined; a not sign (`¬`) marks a hyphen that stays visible.
use std::sync::LazyLock;

use regex::Regex;

use crate::{types::OutputMode, utils::compile_regex};

static HYPHEN_SCAN: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r"(-|¬|\x{AD}|–)(</hi>|</supplied>)?<lb/>",
    "HYPHEN_SCAN",
  )
});

static PAGE_BREAK_SCAN: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"<pb[^>]*/>", "PAGE_BREAK_SCAN"));

static MS_HYPHEN: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"(¬|\x{AD})<lb/>", "MS_HYPHEN"));

static CHOPPED_DELETION: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(r"</del><lb/>\n<del>", "CHOPPED_DELETION")
});

/// Ordered hyphen rules: pattern and replacement. Rules that also match a
/// following page break come before the plain variants, and the page break
/// keeps whatever follows it so the page-break spacing can see it.
static HYPHEN_RULES: LazyLock<Vec<(Regex, &'static str)>> =
  LazyLock::new(|| {
    [
      (r"(-|\x{AD})<lb/>\n*(<pb[^>]*/>)", "$2"),
      (r"(-|\x{AD})<lb/>\n*", ""),
      (r"(-|\x{AD})</hi><lb/>\n*(<pb[^>]*/>)\n*<hi>", "$2"),
      (r"(-|\x{AD})</hi><lb/>\n*<hi>", ""),
      (r"(-|\x{AD})(</supplied>)<lb/>\n*", "$2"),
      (r"¬<lb/>\n*(<pb[^>]*/>)", "-$1"),
      (r"¬<lb/>\n*", "-"),
      (r"¬</hi><lb/>\n*(<pb[^>]*/>)\n*<hi>", "-$1"),
      (r"¬</hi><lb/>\n*<hi>", "-"),
      (r"¬(</supplied>)<lb/>\n*", "-$1"),
      // Not a hyphenation: "Väst-</hi> och <hi>Öst-Finland".
      (r"¬</hi><lb/>\n*", "-</hi> "),
      (r"(\w)–<lb/>\n*(<pb[^>]*/>)", "$1–$2"),
      (r"(\w)–<lb/>\n*", "$1–"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
      (compile_regex(pattern, "HYPHEN_RULES"), replacement)
    })
    .collect()
  });

static PAGE_BREAK_RULES: LazyLock<Vec<(Regex, &'static str)>> =
  LazyLock::new(|| {
    [
      (r"\n+(<pb[^>]*/>)", "$1"),
      (r"(<pb[^>]*/>)\n(\w)", "$1 $2"),
      (
        r"(<pb[^>]*/>)\n(<choice|<add|<del|<persName|<xref|<anchor|<hi|<foreign|<supplied|<unclear|<gap)",
        "$1 $2",
      ),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
      (compile_regex(pattern, "PAGE_BREAK_RULES"), replacement)
    })
    .collect()
  });

/// Normalize raw source text for the given output mode.
///
/// Reading-text and download modes join hyphenated words across line
/// breaks, fix page-break spacing and merge per-line deletions.
/// Manuscript modes only turn the hyphen markers into visible hyphens.
/// Text without any matching pattern is returned unchanged, and the
/// result is a fixed point: normalizing it again changes nothing.
#[must_use]
pub fn normalize(source: &str, mode: OutputMode) -> String {
  if matches!(
    mode,
    OutputMode::Manuscript | OutputMode::NormalizedManuscript
  ) {
    return normalize_manuscript(source);
  }

  let mut text = source.to_string();
  loop {
    let next = normalize_pass(&text);
    if next == text {
      return text;
    }
    text = next;
  }
}

fn normalize_manuscript(source: &str) -> String {
  if !MS_HYPHEN.is_match(source) {
    return source.to_string();
  }
  MS_HYPHEN.replace_all(source, "-<lb/>").into_owned()
}

fn normalize_pass(source: &str) -> String {
  let mut text = source.to_string();
  if HYPHEN_SCAN.is_match(&text) {
    text = apply_rules(&text, &HYPHEN_RULES);
  }
  if PAGE_BREAK_SCAN.is_match(&text) {
    text = apply_rules(&text, &PAGE_BREAK_RULES);
  }
  if text.contains("</del><lb/>\n<del>") {
    text = CHOPPED_DELETION.replace_all(&text, "<lb/>\n").into_owned();
  }
  text
}

fn apply_rules(source: &str, rules: &[(Regex, &str)]) -> String {
  rules
    .iter()
    .fold(source.to_string(), |text, (pattern, replacement)| {
      pattern.replace_all(&text, *replacement).into_owned()
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::TextKind;

  #[test]
  fn test_hyphen_before_page_break() {
    assert_eq!(
      normalize("word-<lb/>\n<pb n=\"12\"/>\nother", OutputMode::Est),
      "word<pb n=\"12\"/> other"
    );
  }

  #[test]
  fn test_soft_hyphen_joins_words() {
    assert_eq!(
      normalize("Hel\u{ad}<lb/>\nsingfors", OutputMode::DownloadXml),
      "Helsingfors"
    );
  }

  #[test]
  fn test_split_highlight_is_merged() {
    assert_eq!(
      normalize("<hi>ord-</hi><lb/>\n<hi>ning</hi>", OutputMode::Est),
      "<hi>ordning</hi>"
    );
  }

  #[test]
  fn test_not_sign_keeps_hyphen() {
    assert_eq!(normalize("Nord¬<lb/>\nFinland", OutputMode::Est), "Nord-Finland");
    assert_eq!(
      normalize("<hi>Väst¬</hi><lb/>\noch", OutputMode::Est),
      "<hi>Väst-</hi> och"
    );
  }

  #[test]
  fn test_en_dash_inside_word() {
    assert_eq!(normalize("1860–<lb/>\n1870", OutputMode::Est), "1860–1870");
    // Preceded by space: punctuation, left alone.
    assert_eq!(
      normalize("ja – <lb/>\nsedan", OutputMode::Est),
      "ja – <lb/>\nsedan"
    );
  }

  #[test]
  fn test_page_break_spacing() {
    assert_eq!(
      normalize("slut.\n<pb n=\"3\"/>\n<persName>X</persName>", OutputMode::Est),
      "slut.<pb n=\"3\"/> <persName>X</persName>"
    );
  }

  #[test]
  fn test_chopped_deletions_merge() {
    assert_eq!(
      normalize("<del>a</del><lb/>\n<del>b</del>", OutputMode::Est),
      "<del>a<lb/>\nb</del>"
    );
  }

  #[test]
  fn test_manuscript_only_marks_hyphens() {
    assert_eq!(
      normalize("Nord¬<lb/>\nFin\u{ad}<lb/>\nland", OutputMode::Manuscript),
      "Nord-<lb/>\nFin-<lb/>\nland"
    );
    assert_eq!(
      normalize("word-<lb/>\nother", OutputMode::NormalizedManuscript),
      "word-<lb/>\nother"
    );
  }

  #[test]
  fn test_plain_text_download_joins_like_reading_text() {
    assert_eq!(
      normalize(
        "word-<lb/>\nother",
        OutputMode::DownloadTxt(TextKind::Manuscript)
      ),
      "wordother"
    );
  }

  #[test]
  fn test_no_match_is_noop() {
    let text = "<p>Nothing to see<lb/>\nhere</p>";
    assert_eq!(normalize(text, OutputMode::Est), text);
  }
}
