//! TEI wrapper for the downloadable XML rendition.
//!
//! The rewritten `<body>` is placed in a fixed TEI skeleton whose header
//! carries the document's bibliographic data, with labels in Swedish or
//! Finnish depending on the requested language.
use kuchikikiki::NodeRef;

use crate::{
  processor::TransformOptions,
  tree::{self, Dialect},
  types::{DocumentMetadata, Language},
};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

/// Localized header labels.
struct Labels {
  /// Responsibility label and a predicate picking the matching translation
  /// by its `translated_into` value.
  translation:   Option<(&'static str, fn(&str) -> bool)>,
  original_lang: Option<&'static str>,
}

fn labels(language: &Language) -> Labels {
  match language {
    Language::Swedish => Labels {
      translation:   Some(("översättning till svenska", |into| {
        into.contains("svenska")
      })),
      original_lang: Some("Dokumentets originalspråk: "),
    },
    Language::Finnish => Labels {
      translation:   Some(("suomentanut", |into| into == "suomeksi")),
      original_lang: Some("Dokumentin alkuperäiskieli: "),
    },
    Language::Other(_) => Labels {
      translation:   None,
      original_lang: None,
    },
  }
}

fn newline() -> NodeRef {
  NodeRef::new_text("\n")
}

fn append_line(parent: &NodeRef, child: NodeRef) {
  parent.append(child);
  parent.append(newline());
}

fn title_statement(
  metadata: Option<&DocumentMetadata>,
  fallback_title: Option<&str>,
  language: &Language,
) -> NodeRef {
  let statement = tree::new_element("titleStmt", &[]);
  statement.append(newline());

  let title = metadata
    .map(|metadata| metadata.publication_title.as_str())
    .or(fallback_title)
    .unwrap_or_default();
  append_line(&statement, tree::new_text_element("title", &[], title));
  if let Some(subtitle) =
    metadata.and_then(|metadata| metadata.publication_subtitle.as_deref())
  {
    append_line(
      &statement,
      tree::new_text_element("title", &[("type", "sub")], subtitle),
    );
  }

  let responsibility = tree::new_element("respStmt", &[]);
  responsibility.append(newline());
  if let (Some(metadata), Some((label, matches))) =
    (metadata, labels(language).translation)
  {
    if let Some(translation) = metadata
      .translations
      .iter()
      .find(|translation| matches(&translation.translated_into))
    {
      append_line(&responsibility, tree::new_text_element("resp", &[], label));
      for translator in &translation.translators {
        append_line(
          &responsibility,
          tree::new_text_element("name", &[], translator),
        );
      }
    }
  }
  append_line(&statement, responsibility);
  statement
}

fn bibliography(metadata: &DocumentMetadata, language: &Language) -> NodeRef {
  let bibl = tree::new_element("bibl", &[]);
  bibl.append(newline());

  let authors = if metadata.author.is_empty() {
    &metadata.sender
  } else {
    &metadata.author
  };
  for person in authors {
    append_line(&bibl, tree::new_text_element("author", &[], person));
  }
  for person in &metadata.recipient {
    append_line(&bibl, tree::new_text_element("recipient", &[], person));
  }
  if let Some(published_by) = &metadata.published_by {
    append_line(&bibl, tree::new_text_element("publisher", &[], published_by));
  }
  append_line(
    &bibl,
    tree::new_text_element("date", &[], &metadata.publication_date),
  );
  append_line(
    &bibl,
    tree::new_text_element("docType", &[], &metadata.document_type),
  );

  let text_lang = tree::new_element("textLang", &[]);
  if let Some(prefix) = labels(language).original_lang {
    text_lang.append(NodeRef::new_text(prefix));
  }
  text_lang.append(NodeRef::new_text(metadata.original_language.as_str()));
  if let Some((main, others)) = metadata.orig_lang_abbr.split_first() {
    tree::set_attr(&text_lang, "mainLang", main);
    if !others.is_empty() {
      tree::set_attr(&text_lang, "otherLangs", &others.join(" "));
    }
  }
  append_line(&bibl, text_lang);
  bibl
}

/// Build the complete downloadable TEI document around a rewritten body.
///
/// # Arguments
///
/// * `body` - The rewritten `<body>` element. It is moved into the result
/// * `metadata` - Bibliographic data; without it only the title is filled in
/// * `fallback_title` - Title from the source header, used without metadata
/// * `options` - Transform options providing language and publisher
///
/// # Returns
///
/// The serialized document, starting with an XML declaration.
#[must_use]
pub fn tei_document(
  body: &NodeRef,
  metadata: Option<&DocumentMetadata>,
  fallback_title: Option<&str>,
  options: &TransformOptions,
) -> String {
  let language = &options.language;

  let header = if metadata.is_some() {
    tree::new_element("teiHeader", &[("xml:lang", language.code())])
  } else {
    tree::new_element("teiHeader", &[])
  };
  header.append(newline());
  let file_description = tree::new_element("fileDesc", &[]);
  file_description.append(newline());
  append_line(
    &file_description,
    title_statement(metadata, fallback_title, language),
  );

  let publication = tree::new_element("publicationStmt", &[]);
  publication.append(newline());
  append_line(
    &publication,
    tree::new_text_element("publisher", &[], &options.publisher),
  );
  append_line(&file_description, publication);

  let source = tree::new_element("sourceDesc", &[]);
  source.append(newline());
  if let Some(metadata) = metadata {
    append_line(&source, bibliography(metadata, language));
  }
  append_line(&file_description, source);
  append_line(&header, file_description);

  let text = tree::new_element("text", &[]);
  text.append(newline());
  body.detach();
  append_line(&text, body.clone());

  let tei = tree::new_element("TEI", &[("xmlns", TEI_NAMESPACE)]);
  tei.append(newline());
  append_line(&tei, header);
  append_line(&tei, text);

  format!(
    "{XML_DECLARATION}\n{}\n",
    tree::serialize_node(&tei, Dialect::Xml)
  )
}
