#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use std::fs;

use teiform_core::{
  DocumentType,
  GoodXmlOptions,
  abbreviations::build_dictionary,
  clean_document,
  tree,
};

const EXPORT: &str = concat!(
  r#"<?xml version="1.0" encoding="UTF-8"?>"#,
  r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><teiHeader><fileDesc><titleStmt><title>Export</title></titleStmt></fileDesc></teiHeader>"#,
  "<text><body>",
  r##"<pb facs="#f1" n="1" xml:id="img1"/>"##,
  r##"<p facs="#r1" rend="Leipäteksti_ei_sisennetty">Tack för brefvet af den 12 maj, "##,
  r#"<hi rend="Harvennettu">Helsingfors</hi> 1888. Summan 125000 mark.</p>"#,
  r#"<p>Hälsa <choice><abbr>D:r</abbr><expan/></choice> Ek och D:r Berg.</p>"#,
  "</body></text></TEI>"
);

#[test]
fn test_export_is_cleaned_with_built_dictionary() {
  let dir = tempfile::tempdir().unwrap();
  let edited = dir.path().join("edited_sv_1.xml");
  fs::write(
    &edited,
    "<p>Till <choice><abbr>D:r</abbr><expan>Doktor</expan></choice> X</p>",
  )
  .unwrap();

  let abbreviations = build_dictionary([&edited]).unwrap();
  assert_eq!(abbreviations.get("D:r"), Some("Doktor"));

  let options = GoodXmlOptions {
    document_type: DocumentType::Article,
    abbreviations,
    ..Default::default()
  };
  let xml = clean_document(EXPORT, &options).unwrap();

  assert!(tree::parse_document(&xml).is_ok(), "output must parse:\n{xml}");
  assert!(xml.contains(r#"<div type="article">"#));
  assert!(xml.contains(r#"<pb n="1" type="orig"/>"#));
  assert!(xml.contains(r#"<p rend="noIndent">Tack"#));
  assert!(xml.contains(r#"<hi rend="expanded">Helsingfors</hi> 1888"#));
  assert!(xml.contains("Summan 125&#x202F;000 mark."));
  assert!(xml.contains("<choice><abbr>D:r</abbr><expan>Doktor</expan></choice> Ek"));
  assert!(xml.contains(
    "och <choice><abbr>D:r</abbr><expan>Doktor</expan></choice> Berg"
  ));
}

#[test]
fn test_letter_export() {
  let options = GoodXmlOptions {
    document_type: DocumentType::Letter,
    expand_untagged: false,
    ..Default::default()
  };
  let xml = clean_document(EXPORT, &options).unwrap();

  assert!(xml.contains(r#"<div type="letter">"#));
  assert!(xml.contains("<p>Tack"));
  assert!(xml.contains("<choice><abbr>D:r</abbr><expan/></choice>"));
  assert!(xml.find("</opener>").unwrap() < xml.find("Tack").unwrap());
}
