#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]

use std::{collections::HashMap, fs, path::Path};

use indicatif::ProgressBar;
use teiform::{
  batch::{collect_inputs, render_files, tidy_files},
  stats::{StatsRun, run_stats},
};
use teiform_core::{
  DocumentMetadata,
  GoodXmlOptions,
  OutputMode,
  TeiProcessor,
  TransformOptionsBuilder,
};

const LETTER: &str = r#"<TEI><teiHeader><title>Brev till Anna</title></teiHeader><text><body><div type="letter"><p>Bäste bror!</p><p>Tack för brevet.</p></div></body></text></TEI>"#;

fn write(root: &Path, relative: &str, content: &str) {
  let path = root.join(relative);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, content).unwrap();
}

#[test]
fn test_render_batch_writes_per_mode_files() {
  let dir = tempfile::tempdir().expect("tempdir");
  let source = dir.path().join("xml");
  write(&source, "Brev/Anna/brev_sv_1.xml", LETTER);
  write(&source, "Brev/Anna/trasig_sv_2.xml", "<TEI><text><body><div>");

  let inputs = collect_inputs(&[source]).unwrap();
  assert_eq!(inputs.len(), 2);

  let output = dir.path().join("build");
  let processor = TeiProcessor::new(
    TransformOptionsBuilder::new().mode(OutputMode::Est).language("sv").build(),
  );
  let summary = render_files(
    &processor,
    &inputs,
    &output,
    &HashMap::new(),
    &ProgressBar::hidden(),
  );

  assert_eq!(summary.written.len(), 1);
  assert_eq!(summary.failed.len(), 1);
  assert!(summary.failed[0].0.ends_with("trasig_sv_2.xml"));
  assert!(summary.finish(false).is_ok());
  assert!(summary.finish(true).is_err());

  let html =
    fs::read_to_string(output.join("Brev/Anna/brev_sv_1_est.html")).unwrap();
  assert!(html.contains("Bäste bror!"));
}

#[test]
fn test_render_download_xml_uses_metadata() {
  let dir = tempfile::tempdir().expect("tempdir");
  let source = dir.path().join("xml");
  write(&source, "brev_sv_1.xml", LETTER);

  let metadata = HashMap::from([(
    "brev_sv_1".to_string(),
    DocumentMetadata {
      publication_title: "Brev till Anna".to_string(),
      publication_date: "1870-05-02".to_string(),
      ..Default::default()
    },
  )]);

  let processor = TeiProcessor::new(
    TransformOptionsBuilder::new()
      .mode(OutputMode::DownloadXml)
      .language("sv")
      .build(),
  );
  let output = dir.path().join("build");
  let summary = render_files(
    &processor,
    &collect_inputs(&[source]).unwrap(),
    &output,
    &metadata,
    &ProgressBar::hidden(),
  );
  assert!(summary.failed.is_empty());

  let xml =
    fs::read_to_string(output.join("brev_sv_1_download-xml.xml")).unwrap();
  assert!(xml.contains("1870-05-02"));
  assert!(xml.contains("Bäste bror!"));
}

#[test]
fn test_tidy_batch_keeps_relative_paths() {
  let dir = tempfile::tempdir().expect("tempdir");
  let source = dir.path().join("export");
  write(
    &source,
    "Artiklar/lagen_sv_3.xml",
    r#"<TEI><teiHeader/><text><body><p rend="Standard">Om lagen</p></body></text></TEI>"#,
  );

  let output = dir.path().join("clean");
  let summary = tidy_files(
    &GoodXmlOptions::default(),
    &collect_inputs(&[source]).unwrap(),
    &output,
    &ProgressBar::hidden(),
  );
  assert!(summary.failed.is_empty());

  let cleaned = fs::read_to_string(output.join("Artiklar/lagen_sv_3.xml")).unwrap();
  assert!(cleaned.contains(r#"<div type="article">"#));
  assert!(cleaned.contains("<p>Om lagen</p>"));
}

#[test]
fn test_stats_run_writes_reports() {
  let dir = tempfile::tempdir().expect("tempdir");
  let root = dir.path().join("Delutgava_1");
  write(&root, "Brev/Privata/Anna/brev_sv_1.xml", LETTER);
  write(&root, "Brev/Privata/Anna/readme.xml", LETTER);
  let metadata = dir.path().join("metadata.json");
  fs::write(
    &metadata,
    r#"[{ "id": 1, "original_language": "sv", "titles": { "sv": "Brev till Anna" } }]"#,
  )
  .unwrap();

  let run = StatsRun {
    root:          &root,
    collection_id: 1,
    url_template:  "https://example.org/{collection}/{publication}",
  };
  let output = dir.path().join("stats");
  let written =
    run_stats(&run, &metadata, &output, &ProgressBar::hidden()).unwrap();
  assert_eq!(written.len(), 4);

  let records = fs::read_to_string(output.join("utg_1.csv")).unwrap();
  let lines: Vec<_> = records.lines().collect();
  // The file without a language and id is skipped.
  assert_eq!(lines.len(), 2);
  assert!(lines[1].starts_with("1,100,sv (orig.),,Brev till Anna,"));
  assert!(lines[1].contains("https://example.org/1/1"));
}
