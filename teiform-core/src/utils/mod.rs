//! Small helpers shared across the pipeline stages.
use regex::Regex;

/// Returns a regex that never matches anything.
///
/// Stand-in for a static pattern that failed to compile.
#[must_use]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| {
    #[allow(
      clippy::expect_used,
      reason = "This pattern is guaranteed to be valid"
    )]
    Regex::new(r"^\b$").expect("regex pattern ^\\b$ should always compile")
  })
}

/// Compile a static pattern, logging and falling back to
/// [`never_matching_regex`] on failure.
#[must_use]
pub fn compile_regex(pattern: &str, name: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}
