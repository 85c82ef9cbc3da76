#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::{fmt::Write, hint::black_box};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use teiform_core::{
  OutputMode,
  TeiProcessor,
  TextKind,
  TransformOptionsBuilder,
  normalize::normalize,
};

const LETTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader><fileDesc><titleStmt><title>Brev till Agathe</title></titleStmt></fileDesc></teiHeader>
  <text>
    <body>
      <div type="letter">
        <opener><dateline>Helsingfors d. 2 maj 1880</dateline><salute>Min kära Agathe!</salute></opener>
        <p>Tack för ditt bref af den 28 april. Jag har <del>ännu</del> icke hunnit svara,<lb/>
        ty <persName corresp="12">Senaten</persName> har haft sam-<lb/>
        manträden hvarje dag<note id="ftn1" n="1">Se protokollet för <hi rend="italics">april</hi>.</note>.</p>
        <p>Hälsa <choice><abbr>D<hi rend="raised">r</hi></abbr><expan>Doktor</expan></choice> Ek och hans<lb/>
        <pb n="2"/>
        familj. <foreign xml:lang="fr">Au revoir!</foreign></p>
        <closer><salute>Din tillgifne</salute><signed>Leo</signed></closer>
      </div>
    </body>
  </text>
</TEI>"#;

/// The letter body repeated to roughly the size of a long article.
fn large_document() -> String {
  let start = LETTER.find("<opener>").unwrap();
  let end = LETTER.find("<closer>").unwrap();
  let mut body = String::new();
  for _ in 0..200 {
    let _ = write!(body, "{}", &LETTER[start..end]);
  }
  LETTER.replacen(&LETTER[start..end], &body, 1)
}

fn bench_normalize(c: &mut Criterion) {
  let mut group = c.benchmark_group("normalize");
  let large = large_document();

  group.bench_with_input(BenchmarkId::new("est", "small"), &LETTER, |b, source| {
    b.iter(|| normalize(black_box(source), black_box(OutputMode::Est)));
  });
  group.bench_with_input(
    BenchmarkId::new("est", "large"),
    &large.as_str(),
    |b, source| {
      b.iter(|| normalize(black_box(source), black_box(OutputMode::Est)));
    },
  );

  group.finish();
}

fn bench_render(c: &mut Criterion) {
  let mut group = c.benchmark_group("render");
  let large = large_document();

  for mode in [
    OutputMode::Est,
    OutputMode::Manuscript,
    OutputMode::DownloadXml,
    OutputMode::DownloadTxt(TextKind::Established),
  ] {
    let processor = TeiProcessor::new(
      TransformOptionsBuilder::new().mode(mode).language("sv").build(),
    );

    group.bench_with_input(
      BenchmarkId::new(mode.as_str(), "small"),
      &LETTER,
      |b, source| {
        b.iter(|| processor.render(black_box(source)).unwrap());
      },
    );
    group.bench_with_input(
      BenchmarkId::new(mode.as_str(), "large"),
      &large.as_str(),
      |b, source| {
        b.iter(|| processor.render(black_box(source)).unwrap());
      },
    );
  }

  group.finish();
}

criterion_group!(benches, bench_normalize, bench_render);
criterion_main!(benches);
