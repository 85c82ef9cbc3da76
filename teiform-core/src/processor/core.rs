//! Core implementation of the TEI processor.
//!
//! This module contains the rewrite engine that drives the rule tables over
//! a parsed document, and the rendering pipeline around it: normalization,
//! parsing, empty-document handling, rewriting, pruning, serialization and
//! tidying.
use std::collections::BTreeMap;

use kuchikikiki::NodeRef;
use log::{debug, error};

use super::{
  context::{RewriteContext, Target, collect_targets},
  inline,
  rules::{Rule, Transform, pass_order, rule_for},
  structure,
  types::{TeiProcessor, TransformOptions},
};
use crate::{
  error::TransformResultOf,
  footnotes::{self, NoteKind},
  header,
  normalize::normalize,
  tidy::tidy,
  tree::{self, Dialect, Tag},
  types::{Diagnostic, DocumentMetadata, OutputMode, TransformResult},
};

impl TeiProcessor {
  /// Create a new `TeiProcessor` with the given options.
  #[must_use]
  pub const fn new(options: TransformOptions) -> Self {
    Self { options }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &TransformOptions {
    &self.options
  }

  /// Render a source document in the configured mode.
  ///
  /// # Errors
  ///
  /// Returns an error if the normalized source is not well-formed XML.
  pub fn render(&self, source: &str) -> TransformResultOf<TransformResult> {
    self.render_with_metadata(source, None)
  }

  /// Render a source document, using bibliographic data for the header of
  /// downloadable TEI. Other modes ignore the metadata.
  ///
  /// # Errors
  ///
  /// Returns an error if the normalized source is not well-formed XML.
  pub fn render_with_metadata(
    &self,
    source: &str,
    metadata: Option<&DocumentMetadata>,
  ) -> TransformResultOf<TransformResult> {
    let mode = self.options.mode;
    let normalized = normalize(source, mode);
    let document = tree::parse_document(&normalized)?;
    let title = extract_title(&document);
    let body = body_of(&document);

    let top_division = tree::first_element_named(&body, Tag::Division.name());
    let untranscribed = top_division
      .as_ref()
      .is_some_and(|division| !tree::has_visible_text(division));

    let diagnostics = match mode {
      OutputMode::Manuscript | OutputMode::NormalizedManuscript
        if untranscribed =>
      {
        if let Some(division) = &top_division {
          debug!("Rendering placeholder for an untranscribed manuscript");
          structure::empty_placeholder(division);
        }
        Vec::new()
      },
      OutputMode::Manuscript | OutputMode::NormalizedManuscript => {
        self.rewrite(&body)
      },
      OutputMode::Est if top_division.is_none() => {
        return Ok(empty_result(title));
      },
      _ if untranscribed || !tree::has_visible_text(&body) => {
        return Ok(empty_result(title));
      },
      _ => self.rewrite(&body),
    };

    match mode {
      OutputMode::Est => prune_empty(&body, true),
      OutputMode::NormalizedManuscript => prune_empty(&body, false),
      _ => {},
    }

    let content = match mode {
      OutputMode::DownloadXml => {
        header::tei_document(&body, metadata, title.as_deref(), &self.options)
      },
      OutputMode::DownloadTxt(_) => body.text_contents(),
      _ => tree::serialize_children(&body, Dialect::Html),
    };

    Ok(TransformResult {
      content: tidy(&content, mode),
      title,
      diagnostics,
    })
  }

  /// Apply the rule table of the configured mode to every vocabulary
  /// element under `root`, in place.
  ///
  /// Targets are collected before the first mutation. Passes then run tag by
  /// tag in the mode's fixed order; elements an earlier pass removed from
  /// under `root` are skipped.
  ///
  /// # Returns
  ///
  /// Problems found in the tree that did not stop the rewrite.
  pub fn rewrite(&self, root: &NodeRef) -> Vec<Diagnostic> {
    let mode = self.options.mode;
    let mut ctx = RewriteContext::new(&self.options, root);

    let mut passes: BTreeMap<Tag, Vec<Target>> = BTreeMap::new();
    for target in collect_targets(root) {
      passes.entry(target.tag).or_default().push(target);
    }

    for &tag in pass_order(mode) {
      let Some(targets) = passes.remove(&tag) else {
        continue;
      };
      let rule = rule_for(tag, mode);
      debug!(
        "Applying {rule:?} to {} <{}> element(s)",
        targets.len(),
        tag.name()
      );
      for target in &targets {
        if tree::is_within(&target.node, root) {
          apply_rule(rule, target, &mut ctx);
        }
      }
    }
    ctx.footnotes.finish();

    ctx.diagnostics
  }
}

fn empty_result(title: Option<String>) -> TransformResult {
  TransformResult {
    content: String::new(),
    title,
    diagnostics: Vec::new(),
  }
}

/// Title text from the TEI header.
fn extract_title(document: &NodeRef) -> Option<String> {
  let header = tree::first_element_named(document, "teiHeader")?;
  let title = tree::first_element_named(&header, "title")?;
  let text = title.text_contents();
  let text = text.trim();
  (!text.is_empty()).then(|| text.to_string())
}

/// The `<body>` element. Sources without one get their top-level content
/// wrapped in a new body.
fn body_of(document: &NodeRef) -> NodeRef {
  if let Some(body) = tree::first_element_named(document, "body") {
    return body;
  }
  let body = tree::new_element("body", &[]);
  tree::move_children(document, &body);
  document.append(body.clone());
  body
}

fn apply_rule(rule: Rule, target: &Target, ctx: &mut RewriteContext<'_>) {
  let node = &target.node;
  match rule {
    Rule::Keep => {},
    Rule::Unwrap => tree::unwrap(node),
    Rule::Decompose => tree::decompose(node),
    Rule::Rename { name, class } => {
      let renamed = tree::rename(node, name);
      if let Some(class) = class {
        tree::set_classes(&renamed, &[class]);
      }
    },
    Rule::SpacedUnwrap => {
      node.append(NodeRef::new_text(" "));
      tree::unwrap(node);
    },
    Rule::Transform(transform) => apply_transform(transform, target, ctx),
  }
}

fn apply_transform(
  transform: Transform,
  target: &Target,
  ctx: &mut RewriteContext<'_>,
) {
  match transform {
    Transform::Division => structure::division(target, ctx),
    Transform::Paragraph => structure::paragraph(target, ctx),
    Transform::LineBreak => structure::line_break(target, ctx),
    Transform::PageBreak => structure::page_break(target, ctx),
    Transform::Heading => structure::heading(target, ctx),
    Transform::Table => structure::table(target, ctx),
    Transform::Row => structure::row(target),
    Transform::Cell => structure::cell(target, ctx),
    Transform::VerseLine => structure::verse_line(target),
    Transform::Highlight => inline::highlight(target, ctx),
    Transform::Milestone => inline::milestone(target, ctx),
    Transform::Anchor => inline::anchor(target),
    Transform::Choice => inline::choice(target, ctx),
    Transform::Abbreviation => inline::abbreviation(target),
    Transform::Regularization => inline::regularization(target),
    Transform::Foreign => inline::foreign(target),
    Transform::PersonName => inline::person_name(target),
    Transform::Supplied => inline::supplied(target, ctx),
    Transform::CrossReference => inline::cross_reference(target, ctx),
    Transform::Addition => inline::addition(target, ctx),
    Transform::Deletion => inline::deletion(target),
    Transform::Gap => inline::gap(target, ctx),
    Transform::Unclear => inline::unclear(target),
    Transform::Note => note(target, ctx),
  }
}

fn note(target: &Target, ctx: &mut RewriteContext<'_>) {
  let node = &target.node;
  let plain_text = matches!(ctx.options.mode, OutputMode::DownloadTxt(_));

  match footnotes::classify(node) {
    NoteKind::Unrecognized => {
      let markup = tree::serialize_node(node, Dialect::Xml);
      error!("Unrecognized note, leaving it in place: {markup}");
      ctx.diagnostics.push(Diagnostic::UnrecognizedNote { markup });
    },
    NoteKind::Footnote if plain_text => {
      node.prepend(NodeRef::new_text(" "));
      tree::unwrap(node);
    },
    NoteKind::Editorial if plain_text => tree::decompose(node),
    NoteKind::Footnote => {
      let division = target.division.clone().unwrap_or_else(|| ctx.root.clone());
      let id = ctx.footnotes.relocate(node, &division, ctx.options);
      debug!("Relocated footnote {id}");
    },
    NoteKind::Editorial => footnotes::render_editorial_note(node),
  }
}

fn has_class(node: &NodeRef, class: &str) -> bool {
  tree::attr(node, "class")
    .is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

/// Remove elements left without content after rewriting: verse lines with
/// their trailing break, paragraphs and, when `headings` is set, the lower
/// heading levels.
fn prune_empty(root: &NodeRef, headings: bool) {
  for line in tree::elements_named(root, "span") {
    if !has_class(&line, "l") || !line.children().all(|c| tree::is_blank_text(&c))
    {
      continue;
    }
    if let Some(next) = line.next_sibling()
      && tree::is_element(&next, "br")
    {
      next.detach();
    }
    line.detach();
  }

  let mut names = vec!["p"];
  if headings {
    names.extend(["h3", "h4", "h5", "h6"]);
  }
  for name in names {
    for element in tree::elements_named(root, name) {
      if !tree::has_visible_text(&element) {
        element.detach();
      }
    }
  }
}
