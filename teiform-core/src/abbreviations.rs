//! Dictionary of abbreviations and their expansions.
//!
//! Built from `<choice>` pairs already encoded in the edition, and used to
//! fill in expansions for abbreviations that OCR exports leave empty or
//! untagged.
use std::{collections::BTreeMap, fs, path::Path, sync::LazyLock};

use log::{debug, warn};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::{
  error::TransformResultOf,
  tree::{self, Dialect},
  utils::compile_regex,
};

/// Most alternative expansions recorded for one abbreviation, as
/// `abbr_1` .. `abbr_4`.
pub const MAX_ALTERNATIVES: usize = 4;

/// Words that are only abbreviations when explicitly encoded as such.
/// Untagged, they are ordinary words.
pub const DO_NOT_EXPAND: &[&str] = &[
  "afsigt", "allmän", "art", "des", "f.", "fr", "följ", "Följ", "för", "för.",
  "först", "först.", "G.", "gen", "H.", "hand.", "just", "L", "L.", "m", "M",
  "min", "min.", "mån", "ord", "ord.", "R", "R.", "regn", "regn.", "rest",
  "rest.", "s", "s.", "S", "t.", "tills", "upp", "upp.", "v.", "väg.",
];

static CHOICE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
  compile_regex(
    r"<choice><abbr>.*?</abbr><expan>.*?</expan></choice>|<choice><expan>.*?</expan><abbr>.*?</abbr></choice>",
    "CHOICE_PAIR",
  )
});
static ALTERNATIVE_SUFFIX: LazyLock<Regex> =
  LazyLock::new(|| compile_regex(r"_\d$", "ALTERNATIVE_SUFFIX"));

/// Abbreviations mapped to expansions, sorted by abbreviation.
///
/// Abbreviations keep their inner markup (e.g. raised letters), so keys are
/// serialized XML fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationDictionary {
  entries: BTreeMap<String, String>,
}

impl AbbreviationDictionary {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[must_use]
  pub fn get(&self, abbreviation: &str) -> Option<&str> {
    self.entries.get(abbreviation).map(String::as_str)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(abbr, expan)| (abbr.as_str(), expan.as_str()))
  }

  /// Record a pair. A differing expansion of a known abbreviation is stored
  /// under the first free `abbr_N` key, for an editor to pick from later.
  ///
  /// # Returns
  ///
  /// Whether the dictionary changed.
  pub fn insert_pair(&mut self, abbreviation: &str, expansion: &str) -> bool {
    match self.entries.get(abbreviation) {
      None => {
        self
          .entries
          .insert(abbreviation.to_string(), expansion.to_string());
        true
      },
      Some(known) if known == expansion => false,
      Some(_) => {
        for n in 1..=MAX_ALTERNATIVES {
          let key = format!("{abbreviation}_{n}");
          match self.entries.get(&key) {
            Some(known) if known == expansion => return false,
            Some(_) => {},
            None => {
              self.entries.insert(key, expansion.to_string());
              return true;
            },
          }
        }
        debug!("No free alternative left for {abbreviation}: {expansion}");
        false
      },
    }
  }

  /// Parse a dictionary from JSON.
  ///
  /// # Errors
  ///
  /// Returns an error if the JSON is not an object of strings.
  pub fn from_json(json: &str) -> TransformResultOf<Self> {
    Ok(serde_json::from_str(json)?)
  }

  /// Serialize the dictionary as a JSON object sorted by key.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_json(&self) -> TransformResultOf<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Load a dictionary from a JSON file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed.
  pub fn load(path: &Path) -> TransformResultOf<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_json(content.trim_start_matches('\u{feff}'))
  }
}

/// Encoded abbreviation/expansion pairs in a source text, in either child
/// order. The surrounding text does not need to be well-formed.
#[must_use]
pub fn extract_pairs(source: &str) -> Vec<(String, String)> {
  CHOICE_PAIR
    .find_iter(source)
    .filter_map(|found| {
      let fragment = match tree::parse_fragment(found.as_str()) {
        Ok(fragment) => fragment,
        Err(e) => {
          warn!("Skipping malformed choice {}: {e}", found.as_str());
          return None;
        },
      };
      let abbr = tree::first_element_named(&fragment, "abbr")?;
      let expan = tree::first_element_named(&fragment, "expan")?;
      Some((
        tree::serialize_children(&abbr, Dialect::Xml),
        expan.text_contents(),
      ))
    })
    .collect()
}

/// Build a dictionary from a set of files.
///
/// # Errors
///
/// Returns an error if a file cannot be read.
pub fn build_dictionary<I, P>(files: I) -> TransformResultOf<AbbreviationDictionary>
where
  I: IntoIterator<Item = P>,
  P: AsRef<Path>,
{
  let mut dictionary = AbbreviationDictionary::new();
  let mut pairs = 0usize;
  for file in files {
    let content = fs::read_to_string(file.as_ref())?;
    for (abbreviation, expansion) in extract_pairs(&content) {
      pairs += 1;
      dictionary.insert_pair(&abbreviation, &expansion);
    }
  }
  debug!("Built dictionary of {} entries from {pairs} pairs", dictionary.len());
  Ok(dictionary)
}

/// Encode untagged occurrences of known abbreviations as `<choice>` pairs.
///
/// Only whole words are matched, so already tagged abbreviations and parts
/// of longer words are left alone. Words in [`DO_NOT_EXPAND`] and
/// undecided alternatives (`abbr_N`) are skipped.
#[must_use]
pub fn expand_untagged(xml: &str, dictionary: &AbbreviationDictionary) -> String {
  let mut xml = xml.to_string();
  for (abbreviation, expansion) in dictionary.iter() {
    if DO_NOT_EXPAND.contains(&abbreviation)
      || ALTERNATIVE_SUFFIX.is_match(abbreviation)
    {
      continue;
    }
    let pattern = format!(
      r"(?m)(\s|^|»|”|\(){}(\s|\.|,|\?|!|»|”|:|;|\)|<lb/>|</p>)",
      regex::escape(abbreviation)
    );
    let Ok(word) = Regex::new(&pattern) else {
      warn!("Cannot build a pattern for abbreviation {abbreviation}");
      continue;
    };
    if !word.is_match(&xml) {
      continue;
    }
    xml = word
      .replace_all(&xml, |caps: &Captures<'_>| {
        format!(
          "{}<choice><abbr>{abbreviation}</abbr><expan>{expansion}</expan></choice>{}",
          &caps[1], &caps[2]
        )
      })
      .into_owned();
  }
  xml
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;

  #[test]
  fn test_extract_pairs_in_either_order() {
    let source = r#"... tack <choice><abbr>D<hi rend="raised">r</hi></abbr><expan>Doktor</expan></choice> och <choice><expan>senator</expan><abbr>sen.</abbr></choice> <choice><abbr"#;
    assert_eq!(extract_pairs(source), vec![
      (r#"D<hi rend="raised">r</hi>"#.to_string(), "Doktor".to_string()),
      ("sen.".to_string(), "senator".to_string()),
    ]);
  }

  #[test]
  fn test_alternative_expansions() {
    let mut dictionary = AbbreviationDictionary::new();
    assert!(dictionary.insert_pair("B.", "bror"));
    assert!(!dictionary.insert_pair("B.", "bror"));
    assert!(dictionary.insert_pair("B.", "baron"));
    assert!(dictionary.insert_pair("B.", "biskop"));
    assert!(!dictionary.insert_pair("B.", "baron"));
    assert_eq!(dictionary.get("B._1"), Some("baron"));
    assert_eq!(dictionary.get("B._2"), Some("biskop"));

    for expansion in ["a", "b", "c"] {
      dictionary.insert_pair("B.", expansion);
    }
    assert_eq!(dictionary.len(), 1 + MAX_ALTERNATIVES);
  }

  #[test]
  fn test_json_is_sorted() {
    let mut dictionary = AbbreviationDictionary::new();
    dictionary.insert_pair("sen.", "senator");
    dictionary.insert_pair("Dr", "Doktor");
    let json = dictionary.to_json().unwrap();
    assert!(json.find("Dr").unwrap() < json.find("sen.").unwrap());
    assert_eq!(AbbreviationDictionary::from_json(&json).unwrap(), dictionary);
  }

  #[test]
  fn test_expand_untagged_whole_words_only() {
    let mut dictionary = AbbreviationDictionary::new();
    dictionary.insert_pair("Fr.", "Fru");
    dictionary.insert_pair("för", "före");
    dictionary.insert_pair("Dr", "Doktor");
    dictionary.insert_pair("Dr", "Doktorn");

    let xml = "<p>Till Fr. Ek och Fri, för Dr<lb/>\n<choice><abbr>Dr</abbr><expan/></choice></p>";
    assert_eq!(
      expand_untagged(xml, &dictionary),
      "<p>Till <choice><abbr>Fr.</abbr><expan>Fru</expan></choice> Ek och Fri, för <choice><abbr>Dr</abbr><expan>Doktor</expan></choice><lb/>\n<choice><abbr>Dr</abbr><expan/></choice></p>"
    );
  }
}
