//! Transforms for inline and editorial markup.
use kuchikikiki::NodeRef;

use super::context::{RewriteContext, Target};
use crate::{
  tree,
  types::{OutputMode, TextKind},
};

/// Symbol shown for a regularization with nothing to show.
const EMPTY_CORRECTION: &str = "\u{22a0}";

/// `<span class="tooltip {kind}">text</span>`
fn tooltip(kind: &str, text: &str) -> NodeRef {
  let class = format!("tooltip {kind}");
  tree::new_text_element("span", &[("class", class.as_str())], text)
}

fn in_heading(node: &NodeRef) -> bool {
  node.parent().is_some_and(|parent| {
    matches!(
      tree::element_name(&parent),
      Some("h1" | "h2" | "h3" | "h4" | "h5" | "h6")
    )
  })
}

pub(super) fn highlight(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let reading_text = ctx.options.mode == OutputMode::Est;
  let rend = tree::remove_attr(node, "rend");

  match rend.as_deref() {
    Some("raised") => {
      tree::rename(node, "sup");
    },
    Some("sub") => {
      tree::rename(node, "sub");
    },
    _ if reading_text && in_heading(node) => tree::unwrap(node),
    Some(rend) => {
      let emphasis = tree::rename(node, "em");
      tree::set_classes(&emphasis, &[rend]);
    },
    None if reading_text => {
      tree::rename(node, "i");
    },
    None => {
      tree::rename(node, "em");
    },
  }
}

pub(super) fn milestone(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let class = match tree::remove_attr(node, "type").as_deref() {
    Some("editorial") => Some("space"),
    Some("bar") if ctx.options.mode == OutputMode::Est => Some("milestoneBar"),
    Some("bar") => Some("bar"),
    _ => None,
  };
  let rule = tree::rename(node, "hr");
  if let Some(class) = class {
    tree::set_classes(&rule, &[class]);
  }
}

pub(super) fn anchor(target: &Target) {
  let node = &target.node;
  let id = tree::remove_attr(node, "id");
  let anchor = tree::rename(node, "a");
  if let Some(id) = id.filter(|id| !id.is_empty()) {
    tree::set_attr(&anchor, "name", &id);
    tree::set_classes(&anchor, &["anchor", id.as_str()]);
  }
}

fn child_elements(node: &NodeRef) -> Vec<NodeRef> {
  node
    .children()
    .filter(|child| child.as_element().is_some())
    .collect()
}

pub(super) fn choice(target: &Target, ctx: &RewriteContext<'_>) {
  match ctx.options.mode {
    OutputMode::Est => reading_text_choice(&target.node),
    OutputMode::NormalizedManuscript => normalized_choice(&target.node),
    _ => tree::unwrap(&target.node),
  }
}

/// Both forms are shown; the alternative becomes a tooltip after the
/// trigger. An expansion with no text at all collapses the whole choice to
/// its text; whitespace counts as text.
fn reading_text_choice(node: &NodeRef) {
  let trigger = tree::rename(node, "span");
  let mut classes = vec!["tooltiptrigger"];
  let mut last = trigger.clone();
  let mut collapse = false;

  for child in child_elements(&trigger) {
    match tree::element_name(&child) {
      Some("orig") => {
        classes.extend(["ttChanges", "choice"]);
        let tip = tree::rename(&child, "span");
        tree::clear_attrs(&tip);
        tree::set_classes(&tip, &["tooltip", "ttChanges"]);
        tip.prepend(NodeRef::new_text("original: "));
        last.insert_after(tip.clone());
        last = tip;
      },
      Some("expan") => {
        if !child.text_contents().is_empty() {
          classes.extend(["ttAbbreviations", "abbr"]);
          let tip = tree::rename(&child, "span");
          tree::clear_attrs(&tip);
          tree::set_classes(&tip, &["tooltip", "ttAbbreviations"]);
          last.insert_after(tip.clone());
          last = tip;
        } else {
          tree::unwrap(&child);
          collapse = true;
        }
      },
      _ => {},
    }
  }

  if collapse {
    tree::unwrap(&trigger);
  } else {
    tree::clear_attrs(&trigger);
    tree::set_classes(&trigger, &classes);
  }
}

/// Abbreviations keep their written form with the expansion as tooltip;
/// corrections are resolved to what was written.
fn normalized_choice(node: &NodeRef) {
  let children = child_elements(node);
  let corrected = children
    .iter()
    .any(|child| tree::is_element(child, "orig") || tree::is_element(child, "reg"));
  let expansion = children
    .iter()
    .find(|child| tree::is_element(child, "expan"))
    .filter(|expan| !expan.text_contents().is_empty());

  match expansion {
    Some(expansion) if !corrected => {
      let tip = tree::rename(expansion, "span");
      tree::clear_attrs(&tip);
      tree::set_classes(&tip, &["tooltip", "ttAbbreviations"]);
      let trigger = tree::rename(node, "span");
      tree::clear_attrs(&trigger);
      tree::set_classes(&trigger, &["tooltiptrigger", "ttAbbreviations", "abbr"]);
      trigger.insert_after(tip);
    },
    _ => tree::unwrap(node),
  }
}

pub(super) fn abbreviation(target: &Target) {
  let node = &target.node;
  let parent = node.parent();
  let parent_is_trigger = |classes: &[&str]| {
    parent.as_ref().is_some_and(|parent| {
      tree::is_element(parent, "span") && tree::has_exact_classes(parent, classes)
    })
  };

  if parent_is_trigger(&["tooltiptrigger", "ttAbbreviations", "abbr"]) {
    let abbreviation = tree::rename(node, "span");
    tree::set_classes(&abbreviation, &["abbr"]);
  } else if parent_is_trigger(&["tooltiptrigger"]) {
    // A choice with neither alternative: nothing to trigger.
    if let Some(parent) = &parent {
      tree::unwrap(parent);
    }
    tree::unwrap(node);
  } else {
    tree::unwrap(node);
  }
}

pub(super) fn regularization(target: &Target) {
  let node = &target.node;
  tree::remove_attr(node, "resp");
  let hidden = tree::remove_attr(node, "type").is_some();
  let correction = tree::rename(node, "span");
  if hidden {
    tree::set_classes(&correction, &["corr", "corr_hide"]);
    correction.prepend(NodeRef::new_text(EMPTY_CORRECTION));
  } else {
    tree::set_classes(&correction, &["corr"]);
  }
}

pub(super) fn foreign(target: &Target) {
  let node = &target.node;
  let Some(language) =
    tree::remove_attr(node, "xml:lang").filter(|lang| !lang.trim().is_empty())
  else {
    tree::unwrap(node);
    return;
  };
  let trigger = tree::rename(node, "span");
  tree::set_classes(&trigger, &["tooltiptrigger", "ttLang"]);
  trigger.insert_after(tooltip("ttLang", &language));
}

pub(super) fn person_name(target: &Target) {
  let node = &target.node;
  let Some(id) = tree::attr(node, "corresp")
    .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
  else {
    tree::unwrap(node);
    return;
  };
  tree::remove_attr(node, "corresp");
  let person = tree::rename(node, "span");
  tree::set_attr(&person, "data-id", &id);
  tree::set_classes(&person, &["person", "tooltiptrigger", "ttPerson"]);
}

pub(super) fn supplied(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let supplied_type = tree::remove_attr(node, "type");

  if ctx.options.mode != OutputMode::Est {
    // Manuscripts never show an editor's guess as fact.
    if supplied_type.as_deref() == Some("gap") {
      tree::clear_children(node);
      tree::clear_attrs(node);
      illegible(node, false, TooltipPlacement::After);
    } else {
      tree::decompose(node);
    }
    return;
  }

  tree::remove_attr(node, "resp");
  let mut classes = vec!["choice", "tooltiptrigger", "ttChanges"];
  match supplied_type.as_deref() {
    None | Some("gap") => classes.push("corr"),
    Some("editorial") => classes.push("editorial"),
    Some(_) => {},
  }
  let span = tree::rename(node, "span");
  tree::set_classes(&span, &classes);
  span.insert_after(tooltip("ttChanges", "tillagt av utgivaren"));
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TooltipPlacement {
  After,
  Inside,
}

/// Turn an element into the `[...]` marker of an illegible passage.
fn illegible(node: &NodeRef, struck: bool, placement: TooltipPlacement) {
  let gap = tree::rename(node, "span");
  if struck {
    tree::set_classes(&gap, &["gap", "tooltiptrigger", "ttMs", "deletion"]);
  } else {
    tree::set_classes(&gap, &["gap", "tooltiptrigger", "ttMs"]);
  }
  gap.prepend(NodeRef::new_text("[...]"));
  let tip = tooltip("ttMs", "oläsligt");
  match placement {
    TooltipPlacement::After => gap.insert_after(tip),
    TooltipPlacement::Inside => gap.append(tip),
  }
}

pub(super) fn gap(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let overstruck = tree::remove_attr(node, "reason").is_some();
  match ctx.options.mode {
    OutputMode::Manuscript => illegible(node, overstruck, TooltipPlacement::After),
    _ if overstruck => tree::decompose(node),
    OutputMode::NormalizedManuscript => {
      illegible(node, false, TooltipPlacement::Inside);
    },
    _ => illegible(node, false, TooltipPlacement::After),
  }
}

pub(super) fn unclear(target: &Target) {
  let span = tree::rename(&target.node, "span");
  tree::set_classes(&span, &["unclear", "tooltiptrigger", "ttMs"]);
  span.insert_after(tooltip("ttMs", "svårtytt"));
}

pub(super) fn deletion(target: &Target) {
  let span = tree::rename(&target.node, "span");
  tree::set_classes(&span, &["deletion", "tooltiptrigger", "ttMs"]);
  span.insert_after(tooltip("ttMs", "struket"));
}

pub(super) fn addition(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let addition_type = tree::attr(node, "type");

  match ctx.options.mode {
    OutputMode::Manuscript => {
      tree::remove_attr(node, "type");
      let span = tree::rename(node, "span");
      match addition_type.as_deref() {
        Some(kind) if !kind.is_empty() => tree::set_classes(&span, &["add", kind]),
        _ => tree::set_classes(&span, &["add"]),
      }
    },
    OutputMode::Est => match addition_type.as_deref() {
      // Later additions are usually by archive staff.
      Some("later") => tree::decompose(node),
      Some("marginalia") if !tree::has_visible_text(node) => {
        tree::decompose(node);
      },
      Some("marginalia") => {
        tree::remove_attr(node, "type");
        let span = tree::rename(node, "span");
        tree::set_classes(&span, &[
          "add",
          "marginalia",
          "tooltiptrigger",
          "ttMs",
        ]);
        span.insert_after(tooltip("ttMs", "tillagt i marginalen"));
      },
      _ => tree::unwrap(node),
    },
    OutputMode::DownloadTxt(TextKind::Established)
      if addition_type.as_deref() == Some("later") =>
    {
      tree::decompose(node);
    },
    _ => tree::unwrap(node),
  }
}

pub(super) fn cross_reference(target: &Target, ctx: &RewriteContext<'_>) {
  let node = &target.node;
  let link_type = tree::attr(node, "type").unwrap_or_default();
  let id = tree::attr(node, "id").filter(|id| !id.is_empty());
  let url = tree::attr(node, "target").filter(|url| !url.is_empty());
  let reading_text = ctx.options.mode == OutputMode::Est;

  let link = match (link_type.as_str(), id, url) {
    ("introduction" | "readingtext", Some(id), _) => {
      let href = if reading_text { id.replace('_', " ") } else { id };
      Some((href, format!("ref_{link_type}")))
    },
    ("manuscript", Some(id), _) if !reading_text => {
      Some((id, "ref_manuscript".to_string()))
    },
    ("ext", _, Some(url)) => Some((url, "ref_external".to_string())),
    _ => None,
  };

  let Some((href, class)) = link else {
    tree::unwrap(node);
    return;
  };
  for name in ["type", "id", "target"] {
    tree::remove_attr(node, name);
  }
  let anchor = tree::rename(node, "a");
  tree::set_attr(&anchor, "href", &href);
  tree::set_classes(&anchor, &["xreference", class.as_str()]);
}
