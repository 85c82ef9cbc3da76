#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use regex::Regex;
use teiform_core::{
  Diagnostic,
  Language,
  OutputMode,
  TeiProcessor,
  TextKind,
  TransformOptionsBuilder,
  TransformResult,
  tree::{self, Dialect},
};

/// Helper to assert that all expected fragments are present in the output.
fn assert_html_contains(html: &str, expected: &[&str]) {
  for &needle in expected {
    assert!(
      html.contains(needle),
      "Expected output to contain '{needle}', but it did not.\nFull \
       output:\n{html}"
    );
  }
}

fn document(division: &str) -> String {
  format!(
    "<TEI><teiHeader><fileDesc><titleStmt><title>Brev till \
     bror</title></titleStmt></fileDesc></teiHeader><text><body>{division}</\
     body></text></TEI>"
  )
}

fn render(source: &str, mode: OutputMode, language: &str) -> TransformResult {
  let options = TransformOptionsBuilder::new()
    .mode(mode)
    .language(language)
    .build();
  TeiProcessor::new(options)
    .render(source)
    .expect("source should render")
}

const LETTER: &str = concat!(
  r#"<div type="letter">"#,
  "<opener><dateline>Helsingfors 1 maj 1890</dateline></opener>",
  "<p>Bäste bror!</p>",
  "<p>Tack för brevet.</p>",
  "<closer><signed>Leo</signed></closer>",
  "</div>"
);

#[test]
fn test_reading_text_letter() {
  let result = render(&document(LETTER), OutputMode::Est, "sv");

  assert_eq!(result.title.as_deref(), Some("Brev till bror"));
  assert!(result.diagnostics.is_empty());
  assert_html_contains(&result.content, &[
    r#"<div class="letter tei" lang="sv">"#,
    r#"<div class="opener tei"><p class="dateline">Helsingfors 1 maj 1890</p></div>"#,
    r#"<p class="noIndent">Bäste bror!</p>"#,
    r#"<p class="spaced">Tack för brevet.</p>"#,
    r#"<div class="closer tei"><p class="signed">Leo</p></div>"#,
  ]);
}

#[test]
fn test_manuscript_letter() {
  let source = document(
    r#"<div type="letter"><p>Jag har <del>inte</del> skrivit.</p></div>"#,
  );
  let result = render(&source, OutputMode::Manuscript, "sv");

  assert_html_contains(&result.content, &[
    r#"<div class="letter">"#,
    r#"<span class="deletion tooltiptrigger ttMs">inte</span><span class="tooltip ttMs">struket</span>"#,
  ]);

  let reading = render(&source, OutputMode::Est, "sv");
  assert!(!reading.content.contains("inte"));
}

#[test]
fn test_empty_expansion_keeps_abbreviation_text() {
  let source = document(
    r#"<div type="letter"><p>Tack <choice><abbr>Dr</abbr><expan/></choice> Ek.</p></div>"#,
  );
  let result = render(&source, OutputMode::Est, "sv");

  assert_html_contains(&result.content, &["Tack Dr Ek."]);
  assert!(!result.content.contains("tooltiptrigger"));
  assert!(!result.content.contains("abbr"));
}

#[test]
fn test_expansion_becomes_tooltip() {
  let source = document(
    r#"<div type="letter"><p>Tack <choice><abbr>D:r</abbr><expan>Doktor</expan></choice> Ek.</p></div>"#,
  );
  let result = render(&source, OutputMode::Est, "sv");

  assert_html_contains(&result.content, &[
    r#"<span class="tooltiptrigger ttAbbreviations abbr"><span class="abbr">D:r</span></span><span class="tooltip ttAbbreviations">Doktor</span>"#,
  ]);
}

const FOOTNOTES: &str = concat!(
  r#"<div type="article"><p>Lantdagen<note id="ftn1" n="1">Första</note> "#,
  r#"samlades<note id="ftn2" n="2">Andra</note>.</p></div>"#
);

#[test]
fn test_finnish_footnotes_are_offset() {
  let finnish = render(&document(FOOTNOTES), OutputMode::Est, "fi");
  assert_html_contains(&finnish.content, &[
    r#"data-id="ftn501""#,
    r#"data-id="ftn502""#,
    r##"href="#ftn501""##,
    "Viitteet",
  ]);
  assert!(!finnish.content.contains(r#"data-id="ftn1""#));

  let swedish = render(&document(FOOTNOTES), OutputMode::Est, "sv");
  assert_html_contains(&swedish.content, &[
    r#"data-id="ftn1""#,
    r#"data-id="ftn2""#,
    "Noter",
  ]);
  assert!(!swedish.content.contains("ftn50"));
}

#[test]
fn test_unknown_language_note_heading() {
  let result = render(&document(FOOTNOTES), OutputMode::Est, "de");
  assert_html_contains(&result.content, &[r#"<p class="noIndent">Notes</p>"#]);
}

#[test]
fn test_every_indicator_has_one_list_entry() {
  let result = render(&document(FOOTNOTES), OutputMode::Est, "sv");
  let indicator =
    Regex::new(r#"class="footnoteindicator tooltiptrigger ttFoot" data-id="([^"]+)""#)
      .unwrap();
  let entry = Regex::new(
    r##"<li class="footnoteItem" data-id="([^"]+)"><p class="noIndent"><a class="xreference footnoteReference" href="#([^"]+)""##,
  )
  .unwrap();

  let indicators: Vec<&str> = indicator
    .captures_iter(&result.content)
    .map(|caps| caps.get(1).unwrap().as_str())
    .collect();
  assert_eq!(indicators, vec!["ftn1", "ftn2"]);

  for id in indicators {
    let entries: Vec<_> = entry
      .captures_iter(&result.content)
      .filter(|caps| &caps[1] == id)
      .collect();
    assert_eq!(entries.len(), 1, "one entry for {id}");
    assert_eq!(&entries[0][2], id);
  }
}

#[test]
fn test_normalized_manuscript_has_no_footnote_list() {
  let result =
    render(&document(FOOTNOTES), OutputMode::NormalizedManuscript, "sv");
  assert_html_contains(&result.content, &[
    "footnoteindicator",
    r#"<span class="ttFixed" data-id="ftn1">Första</span>"#,
  ]);
  assert!(!result.content.contains("footnotesList"));
}

#[test]
fn test_footnotes_attach_to_their_own_part() {
  let source = document(concat!(
    r#"<div type="hansard">"#,
    r#"<div type="LM_written"><p>Skrivet<note id="ftn1" n="1">a</note></p></div>"#,
    r#"<div type="LM_discussion"><p>Sagt<note id="ftn2" n="2">b</note></p></div>"#,
    "</div>"
  ));
  let result = render(&source, OutputMode::Est, "sv");
  assert_eq!(result.content.matches("footnotesList").count(), 2);
}

#[test]
fn test_nested_footnotes_are_rewritten_in_the_list() {
  let source = document(concat!(
    r#"<div type="article"><p>Lantdagen<note id="ftn1" n="1">Yttre"#,
    r#"<note id="ftn2" n="2">Inre</note></note> samlades.</p></div>"#
  ));
  let result = render(&source, OutputMode::Est, "sv");

  assert!(!result.content.contains("<note"), "{}", result.content);
  assert_eq!(result.content.matches(r#"class="footnoteItem""#).count(), 2);

  let outer =
    Regex::new(r#"(?s)<li class="footnoteItem" data-id="ftn1">(.*?)</li>"#)
      .unwrap();
  let entry = outer.captures(&result.content).unwrap();
  assert!(entry[1].contains("Yttre"));
  assert!(entry[1].contains("Inre"));
}

#[test]
fn test_footnote_outside_typed_division_goes_to_the_root() {
  let source = document(
    r#"<div><p>Text<note id="ftn1" n="1">Fotnot</note></p></div>"#,
  );
  let result = render(&source, OutputMode::Est, "sv");

  assert_eq!(result.content.matches("footnotesList").count(), 1);
  assert_html_contains(&result.content, &[
    r#"data-id="ftn1""#,
    r##"href="#ftn1""##,
    "Fotnot",
  ]);
  let section = result.content.find("<section").unwrap();
  let division_end = result.content.rfind("</div>").unwrap();
  assert!(section > division_end, "{}", result.content);
}

#[test]
fn test_rewrite_fragment_root() {
  let options = TransformOptionsBuilder::new()
    .mode(OutputMode::Est)
    .language("sv")
    .build();
  let processor = TeiProcessor::new(options);
  let root = tree::parse_fragment(
    r#"<div type="letter"><p>a<hi rend="italic">b</hi></p></div>"#,
  )
  .unwrap();

  let diagnostics = processor.rewrite(&root);
  let html = tree::serialize_children(&root, Dialect::Html);

  assert!(diagnostics.is_empty());
  assert!(!html.contains("<hi"), "{html}");
  assert_html_contains(&html, &[r#"<em class="italic">b</em>"#]);
}

#[test]
fn test_whitespace_expansion_keeps_tooltip() {
  let source = document(
    r#"<div type="letter"><p>Tack <choice><abbr>Dr</abbr><expan> </expan></choice> Ek.</p></div>"#,
  );
  let result = render(&source, OutputMode::Est, "sv");

  assert_html_contains(&result.content, &[
    r#"<span class="tooltiptrigger ttAbbreviations abbr">"#,
    r#"<span class="tooltip ttAbbreviations">"#,
  ]);
}

#[test]
fn test_unrecognized_note_is_reported() {
  let source = document(
    r#"<div type="letter"><p>Text<note id="x">okänd</note></p></div>"#,
  );
  let result = render(&source, OutputMode::Est, "sv");

  assert_eq!(result.diagnostics.len(), 1);
  let Diagnostic::UnrecognizedNote { markup } = &result.diagnostics[0];
  assert!(markup.contains("okänd"));
  assert!(result.content.contains("okänd"));
}

#[test]
fn test_empty_division_per_mode() {
  let source = document(r#"<div type="letter"><p> </p></div>"#);

  for mode in [
    OutputMode::Est,
    OutputMode::DownloadXml,
    OutputMode::DownloadTxt(TextKind::Established),
  ] {
    let result = render(&source, mode, "sv");
    assert_eq!(result.content, "", "{mode} should be empty");
    assert_eq!(result.title.as_deref(), Some("Brev till bror"));
  }

  for mode in [OutputMode::Manuscript, OutputMode::NormalizedManuscript] {
    let result = render(&source, mode, "sv");
    assert_eq!(
      result.content,
      r#"<div class="empty"><p class="noIndent">Ingen transkription.</p></div>"#
    );
  }
}

#[test]
fn test_plain_text() {
  let source = document(concat!(
    r#"<div type="letter"><opener><dateline>Åbo</dateline></opener>"#,
    r#"<p>Ett<note id="ftn1" n="1">not</note> två<note>kommentar</note> "#,
    r#"<choice><abbr>t.</abbr><expan>tre</expan></choice></p></div>"#
  ));
  let established =
    render(&source, OutputMode::DownloadTxt(TextKind::Established), "sv");
  assert_eq!(established.content, "Åbo Ett not två tre");

  let manuscript =
    render(&source, OutputMode::DownloadTxt(TextKind::Manuscript), "sv");
  assert_eq!(manuscript.content, "Åbo Ett not två t.");
}

#[test]
fn test_language_from_code() {
  assert_eq!(Language::from("FI"), Language::Finnish);
  assert_eq!(Language::from("de").code(), "de");
}
