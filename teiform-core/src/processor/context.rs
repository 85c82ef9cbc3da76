//! Traversal context threaded through one rewrite run.
//!
//! Everything a rule needs to know about where a node sits in the source
//! hierarchy is captured in a [`Target`] before the first mutation, so that
//! later rules see the original division structure even after divisions
//! have been renamed or unwrapped.
use kuchikikiki::NodeRef;

use super::types::TransformOptions;
use crate::{
  footnotes::FootnoteRelocator,
  tree::{self, Tag},
  types::{Diagnostic, DivisionType},
};

/// A source element scheduled for rewriting, with its structural context.
#[derive(Debug, Clone)]
pub struct Target {
  pub tag:  Tag,
  pub node: NodeRef,

  /// Type of the nearest enclosing division that is a whole document
  /// (skipping chapters and sections).
  pub document_kind: Option<DivisionType>,

  /// Nearest enclosing typed division. Footnote lists are attached here.
  pub division: Option<NodeRef>,

  /// Number of typed divisions enclosing the node.
  pub depth: usize,
}

/// Mutable state of one rewrite run.
pub struct RewriteContext<'a> {
  pub options: &'a TransformOptions,

  /// Root of the rewritten subtree. Footnotes outside any typed division
  /// are listed here.
  pub root: NodeRef,

  /// Type of the top division, if the document has one.
  pub top_kind: Option<DivisionType>,

  /// The top division itself, in its source form.
  pub top_division: Option<NodeRef>,

  /// Paragraphs handled so far, in document order.
  pub paragraphs_seen: usize,

  pub footnotes: FootnoteRelocator,

  pub diagnostics: Vec<Diagnostic>,
}

impl<'a> RewriteContext<'a> {
  #[must_use]
  pub fn new(options: &'a TransformOptions, root: &NodeRef) -> Self {
    let top_division = tree::first_element_named(root, Tag::Division.name());
    let top_kind = top_division
      .as_ref()
      .and_then(|div| tree::attr(div, "type"))
      .and_then(|value| DivisionType::from_attr(&value));
    Self {
      options,
      root: root.clone(),
      top_kind,
      top_division,
      paragraphs_seen: 0,
      footnotes: FootnoteRelocator::new(),
      diagnostics: Vec::new(),
    }
  }

  /// Whether the top division makes headings start at level 1.
  #[must_use]
  pub fn is_front_matter(&self) -> bool {
    self
      .top_kind
      .as_ref()
      .is_some_and(DivisionType::is_front_matter)
  }
}

/// Collect every vocabulary element under `root` in document order.
#[must_use]
pub fn collect_targets(root: &NodeRef) -> Vec<Target> {
  let mut targets = Vec::new();
  let mut divisions: Vec<(NodeRef, DivisionType)> = Vec::new();
  walk(root, &mut divisions, &mut targets);
  targets
}

fn walk(
  node: &NodeRef,
  divisions: &mut Vec<(NodeRef, DivisionType)>,
  targets: &mut Vec<Target>,
) {
  for child in node.children() {
    let Some(tag) = tree::tag_of(&child) else {
      if child.as_element().is_some() {
        walk(&child, divisions, targets);
      }
      continue;
    };

    targets.push(Target {
      tag,
      node: child.clone(),
      document_kind: divisions
        .iter()
        .rev()
        .map(|(_, kind)| kind)
        .find(|kind| kind.is_document_kind())
        .cloned(),
      division: divisions.last().map(|(div, _)| div.clone()),
      depth: divisions.len(),
    });

    let typed = (tag == Tag::Division)
      .then(|| tree::attr(&child, "type"))
      .flatten()
      .and_then(|value| DivisionType::from_attr(&value));
    match typed {
      Some(kind) => {
        divisions.push((child.clone(), kind));
        walk(&child, divisions, targets);
        divisions.pop();
      },
      None => walk(&child, divisions, targets),
    }
  }
}
