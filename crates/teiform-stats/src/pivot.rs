//! Summary tables over statistics records.
use std::{
  collections::{BTreeMap, BTreeSet},
  io,
};

use crate::{
  classify::LETTERS,
  error::StatsResult,
  record::PublicationRecord,
};

/// Label of grand total rows and columns.
pub const TOTAL: &str = "summa";

/// Label of per-genre subtotal rows.
pub const SUBTOTAL: &str = "totalt";

/// Label of the row holding pages already translated.
pub const TRANSLATED: &str = "redan översatt";

/// A labelled table of numbers. Missing cells are written empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
  pub index_names: Vec<String>,
  pub columns:     Vec<String>,
  pub rows:        Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
  pub labels: Vec<String>,
  pub values: Vec<Option<f64>>,
}

impl TableRow {
  fn new<L: Into<String>>(labels: Vec<L>, values: Vec<Option<f64>>) -> Self {
    Self {
      labels: labels.into_iter().map(Into::into).collect(),
      values,
    }
  }
}

impl Table {
  /// Look up a cell by row labels and column name.
  #[must_use]
  pub fn cell(&self, labels: &[&str], column: &str) -> Option<f64> {
    let index = self.columns.iter().position(|name| name == column)?;
    self
      .rows
      .iter()
      .find(|row| row.labels.iter().map(String::as_str).eq(labels.iter().copied()))
      .and_then(|row| row.values.get(index).copied().flatten())
  }

  /// Write the table as CSV, index columns first.
  ///
  /// # Errors
  ///
  /// Returns an error if writing fails.
  pub fn write_csv<W: io::Write>(&self, writer: W) -> StatsResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(self.index_names.iter().chain(&self.columns))?;
    for row in &self.rows {
      let values = row
        .values
        .iter()
        .map(|value| value.map(format_number).unwrap_or_default());
      writer.write_record(row.labels.iter().cloned().chain(values))?;
    }
    writer.flush()?;
    Ok(())
  }
}

/// Format a sum: whole numbers without decimals, the rest with one.
#[must_use]
#[allow(clippy::float_cmp, reason = "Whole sums are exact")]
pub fn format_number(value: f64) -> String {
  if value.fract() == 0.0 {
    format!("{value:.0}")
  } else {
    format!("{value:.1}")
  }
}

fn round_sum(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

fn close_genre(rows: &mut Vec<TableRow>, subtotal: Option<(String, f64, f64)>) {
  if let Some((genre, images, pages)) = subtotal {
    rows.push(TableRow::new(
      vec![genre, SUBTOTAL.to_string()],
      vec![Some(images), Some(round_sum(pages))],
    ));
  }
}

fn image_total(record: &PublicationRecord) -> f64 {
  f64::from(record.images.map_or(0, |count| count.images))
}

/// Images and pages per genre and language, with a subtotal row per genre
/// and a grand total.
#[must_use]
pub fn pages_per_genre(records: &[PublicationRecord]) -> Table {
  let mut cells: BTreeMap<(String, String), (f64, f64)> = BTreeMap::new();
  for record in records {
    let cell = cells
      .entry((record.location.main_folder.clone(), record.language.clone()))
      .or_default();
    cell.0 += image_total(record);
    cell.1 += record.measure.pages;
  }

  let mut rows = Vec::new();
  let mut total = (0.0, 0.0);
  let mut genre_total: Option<(String, f64, f64)> = None;

  for ((genre, language), (images, pages)) in cells {
    if genre_total.as_ref().is_some_and(|(current, ..)| *current != genre) {
      close_genre(&mut rows, genre_total.take());
    }
    let entry = genre_total.get_or_insert_with(|| (genre.clone(), 0.0, 0.0));
    entry.1 += images;
    entry.2 += pages;
    total.0 += images;
    total.1 += pages;

    rows.push(TableRow::new(
      vec![genre, language],
      vec![Some(images), Some(round_sum(pages))],
    ));
  }
  close_genre(&mut rows, genre_total);

  rows.push(TableRow::new(
    vec![TOTAL, ""],
    vec![Some(total.0), Some(round_sum(total.1))],
  ));

  Table {
    index_names: vec!["genre".to_string(), "språk".to_string()],
    columns: vec!["bildantal".to_string(), "tryckta_sidor".to_string()],
    rows,
  }
}

/// Pages per language, with the pages that still need translating into
/// Finnish and Swedish and the pages already translated into each.
#[must_use]
pub fn pages_per_language(records: &[PublicationRecord]) -> Table {
  let mut pages: BTreeMap<String, f64> = BTreeMap::new();
  for record in records {
    *pages.entry(record.language.clone()).or_default() += record.measure.pages;
  }

  // Originals in the other target language are translated separately, so
  // neither target language counts towards the other.
  let needs = |language: &str, target: &str, other: &str| {
    language != target
      && language != format!("{target} (orig.)")
      && language != other
  };

  let mut rows = Vec::new();
  let mut totals = [0.0; 3];
  for (language, sum) in &pages {
    let sum = round_sum(*sum);
    let to_fi = if needs(language, "fi", "sv") { sum } else { 0.0 };
    let to_sv = if needs(language, "sv", "fi") { sum } else { 0.0 };
    totals[0] += sum;
    totals[1] += to_fi;
    totals[2] += to_sv;
    rows.push(TableRow::new(
      vec![language.clone()],
      vec![Some(sum), Some(to_fi), Some(to_sv)],
    ));
  }

  rows.push(TableRow::new(
    vec![TOTAL],
    totals.iter().map(|total| Some(round_sum(*total))).collect(),
  ));

  let translated = |language: &str| {
    pages.get(language).map_or(0.0, |sum| round_sum(*sum))
  };
  rows.push(TableRow::new(
    vec![TRANSLATED],
    vec![None, Some(translated("fi")), Some(translated("sv"))],
  ));

  Table {
    index_names: vec!["språk".to_string()],
    columns: vec![
      "tryckta_sidor".to_string(),
      "att_översätta_till_fi".to_string(),
      "att_översätta_till_sv".to_string(),
    ],
    rows,
  }
}

/// Letter pages per correspondent and language, split by subfolder.
///
/// Returns [`None`] when the records contain no letters.
#[must_use]
pub fn pages_per_correspondent(records: &[PublicationRecord]) -> Option<Table> {
  let letters: Vec<_> = records
    .iter()
    .filter(|record| record.location.main_folder == LETTERS)
    .filter_map(|record| {
      let correspondent = record.location.correspondent.clone()?;
      let subfolder = record.location.subfolder.clone()?;
      Some((correspondent, record.language.clone(), subfolder, record.measure.pages))
    })
    .collect();

  if letters.is_empty() {
    return None;
  }

  let subfolders: Vec<String> = letters
    .iter()
    .map(|(_, _, subfolder, _)| subfolder.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect();

  let mut cells: BTreeMap<(String, String), Vec<Option<f64>>> = BTreeMap::new();
  for (correspondent, language, subfolder, pages) in letters {
    let column = subfolders
      .iter()
      .position(|name| *name == subfolder)
      .unwrap_or_default();
    let row = cells
      .entry((correspondent, language))
      .or_insert_with(|| vec![None; subfolders.len()]);
    *row[column].get_or_insert(0.0) += pages;
  }

  let mut column_totals = vec![None; subfolders.len()];
  let mut grand_total = 0.0;
  let mut rows = Vec::with_capacity(cells.len() + 1);
  for ((correspondent, language), values) in cells {
    let mut row_total = 0.0;
    let mut rounded = Vec::with_capacity(values.len() + 1);
    for (column, value) in values.into_iter().enumerate() {
      if let Some(value) = value {
        row_total += value;
        *column_totals[column].get_or_insert(0.0) += value;
      }
      rounded.push(value.map(round_sum));
    }
    grand_total += row_total;
    rounded.push(Some(round_sum(row_total)));
    rows.push(TableRow::new(vec![correspondent, language], rounded));
  }

  let mut totals: Vec<Option<f64>> =
    column_totals.into_iter().map(|total| total.map(round_sum)).collect();
  totals.push(Some(round_sum(grand_total)));
  rows.push(TableRow::new(vec![TOTAL, ""], totals));

  let mut columns = subfolders;
  columns.push(TOTAL.to_string());

  Some(Table {
    index_names: vec!["korrespondent".to_string(), "språk".to_string()],
    columns,
    rows,
  })
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  #![allow(clippy::float_cmp, reason = "Sums are rounded to one decimal")]
  use teiform_core::ContentMeasure;

  use super::*;
  use crate::{classify::FileLocation, record::ImageCount};

  fn record(
    genre: &str,
    subfolder: &str,
    correspondent: Option<&str>,
    language: &str,
    length: usize,
    images: Option<u32>,
  ) -> PublicationRecord {
    PublicationRecord {
      publication_id: 1,
      group_id:       1,
      language:       language.to_string(),
      date:           None,
      title:          String::new(),
      measure:        ContentMeasure::from_length(length),
      location:       FileLocation {
        main_folder:   genre.to_string(),
        subfolder:     Some(subfolder.to_string()),
        correspondent: correspondent.map(str::to_string),
        file_path:     String::new(),
      },
      translators:    String::new(),
      images:         images.map(|images| {
        ImageCount {
          images,
          external_link: false,
        }
      }),
      url:            String::new(),
    }
  }

  fn records() -> Vec<PublicationRecord> {
    vec![
      record("Brev", "Privata", Some("Anna"), "sv (orig.)", 5000, Some(3)),
      record("Brev", "Privata", Some("Anna"), "fi", 5000, None),
      record("Brev", "Officiella", Some("Anna"), "sv (orig.)", 2500, Some(1)),
      record("Brev", "Officiella", Some("Berg"), "de (orig.)", 250, Some(2)),
      record("Artiklar", "Tidningar", None, "fi (orig.)", 1250, Some(0)),
      record("Artiklar", "Tidningar", None, "sv", 1250, None),
    ]
  }

  #[test]
  fn test_pages_per_genre_subtotals() {
    let table = pages_per_genre(&records());

    assert_eq!(table.cell(&["Brev", "sv (orig.)"], "tryckta_sidor"), Some(3.0));
    assert_eq!(table.cell(&["Brev", "sv (orig.)"], "bildantal"), Some(4.0));
    assert_eq!(table.cell(&["Brev", SUBTOTAL], "tryckta_sidor"), Some(5.1));
    assert_eq!(table.cell(&["Artiklar", SUBTOTAL], "tryckta_sidor"), Some(1.0));
    assert_eq!(table.cell(&[TOTAL, ""], "tryckta_sidor"), Some(6.1));
    assert_eq!(table.cell(&[TOTAL, ""], "bildantal"), Some(6.0));

    // Each genre closes with its subtotal.
    let labels: Vec<_> = table.rows.iter().map(|row| row.labels.join("/")).collect();
    assert_eq!(labels[2], "Artiklar/totalt");
    assert_eq!(labels.last().unwrap(), "summa/");
  }

  #[test]
  fn test_pages_per_language_translation_columns() {
    let table = pages_per_language(&records());

    assert_eq!(table.cell(&["de (orig.)"], "att_översätta_till_fi"), Some(0.1));
    assert_eq!(table.cell(&["de (orig.)"], "att_översätta_till_sv"), Some(0.1));
    assert_eq!(table.cell(&["sv (orig.)"], "att_översätta_till_fi"), Some(3.0));
    assert_eq!(table.cell(&["sv (orig.)"], "att_översätta_till_sv"), Some(0.0));
    assert_eq!(table.cell(&["fi"], "att_översätta_till_sv"), Some(0.0));
    assert_eq!(table.cell(&[TRANSLATED], "att_översätta_till_fi"), Some(2.0));
    assert_eq!(table.cell(&[TRANSLATED], "att_översätta_till_sv"), Some(0.5));
    assert_eq!(table.cell(&[TRANSLATED], "tryckta_sidor"), None);
  }

  #[test]
  fn test_pages_per_correspondent() {
    let table = pages_per_correspondent(&records()).unwrap();

    assert_eq!(table.columns, ["Officiella", "Privata", "summa"]);
    assert_eq!(table.cell(&["Anna", "sv (orig.)"], "Officiella"), Some(1.0));
    assert_eq!(table.cell(&["Anna", "sv (orig.)"], "summa"), Some(3.0));
    assert_eq!(table.cell(&["Berg", "de (orig.)"], "Privata"), None);
    assert_eq!(table.cell(&[TOTAL, ""], "Privata"), Some(4.0));
    assert_eq!(table.cell(&[TOTAL, ""], TOTAL), Some(5.1));
  }

  #[test]
  fn test_no_letters_no_correspondent_table() {
    let articles: Vec<_> = records()
      .into_iter()
      .filter(|record| record.location.main_folder != LETTERS)
      .collect();
    assert!(pages_per_correspondent(&articles).is_none());
  }

  #[test]
  fn test_csv_layout() {
    let table = pages_per_language(&records()[4..]);
    let mut out = Vec::new();
    table.write_csv(&mut out).unwrap();

    let csv = String::from_utf8(out).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
      lines[0],
      "språk,tryckta_sidor,att_översätta_till_fi,att_översätta_till_sv"
    );
    assert_eq!(lines[1], "fi (orig.),0.5,0,0.5");
    assert_eq!(lines[2], "sv,0.5,0,0");
    assert_eq!(lines[3], "summa,1,0,0.5");
    assert_eq!(lines[4], "redan översatt,,0,0.5");
  }
}
