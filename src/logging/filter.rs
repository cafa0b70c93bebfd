// SPDX-License-Identifier: Apache-2.0 OR MIT
// Text filters applied on the producer side before a line is queued

use super::error::FilterError;
use chrono::format::{Item, StrftimeItems};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// A pure text transformation applied to every log line
///
/// Filters run on the calling thread of
/// [`Logger::print_log_line`](super::Logger::print_log_line), possibly from
/// many threads at once, so implementations must be `Send + Sync` and should
/// not depend on call order.
pub trait LogFilter: Send + Sync {
    /// Transform one message
    fn filter(&self, message: &str) -> String;
}

impl<F> LogFilter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn filter(&self, message: &str) -> String {
        self(message)
    }
}

/// Ordered, immutable chain of filters
///
/// Cloning is cheap: clones share the same filter list.
#[derive(Clone)]
pub struct FilterPipeline {
    filters: Arc<[Arc<dyn LogFilter>]>,
}

impl FilterPipeline {
    /// Create a pipeline that applies `filters` in the given order
    pub fn new(filters: Vec<Arc<dyn LogFilter>>) -> Self {
        Self {
            filters: filters.into(),
        }
    }

    /// Pipeline with no filters (identity)
    pub fn identity() -> Self {
        Self::new(Vec::new())
    }

    /// Apply every filter in order, feeding each output into the next filter
    pub fn apply(&self, raw: &str) -> String {
        let Some((first, rest)) = self.filters.split_first() else {
            return raw.to_string();
        };
        rest.iter()
            .fold(first.filter(raw), |message, filter| filter.filter(&message))
    }

    /// Number of configured filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Check if the pipeline is the identity
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Default timestamp layout for [`AddDateFilter`]
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefixes each message with the local date and time
#[derive(Debug, Clone)]
pub struct AddDateFilter {
    format: String,
}

impl AddDateFilter {
    pub fn new() -> Self {
        Self {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Use a custom `strftime` layout
    pub fn with_format(format: impl Into<String>) -> Result<Self, FilterError> {
        let format = format.into();
        if format.is_empty() {
            return Err(FilterError::EmptyDateFormat);
        }
        // Rendering an invalid specifier panics, so reject it up front
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(FilterError::InvalidDateFormat(format));
        }
        Ok(Self { format })
    }

    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for AddDateFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFilter for AddDateFilter {
    fn filter(&self, message: &str) -> String {
        format!("{} {}", chrono::Local::now().format(&self.format), message)
    }
}

/// Replaces every match of a regex with a fixed string
#[derive(Debug, Clone)]
pub struct ReplaceRegexFilter {
    pattern: Regex,
    replace_with: String,
}

impl ReplaceRegexFilter {
    /// Compile `pattern`; `replace_with` may use `$1`-style group references
    pub fn new(pattern: &str, replace_with: impl Into<String>) -> Result<Self, FilterError> {
        let regex = Regex::new(pattern).map_err(|e| FilterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: regex,
            replace_with: replace_with.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl LogFilter for ReplaceRegexFilter {
    fn filter(&self, message: &str) -> String {
        self.pattern
            .replace_all(message, self.replace_with.as_str())
            .into_owned()
    }
}

/// Strips everything except ASCII letters, digits and spaces
#[derive(Debug, Clone)]
pub struct RemoveSpecialCharactersFilter {
    inner: ReplaceRegexFilter,
}

static SPECIAL_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^ a-zA-Z0-9]+").expect("special character pattern is valid"));

impl RemoveSpecialCharactersFilter {
    pub fn new() -> Self {
        Self {
            inner: ReplaceRegexFilter {
                pattern: SPECIAL_CHARACTERS.clone(),
                replace_with: String::new(),
            },
        }
    }
}

impl Default for RemoveSpecialCharactersFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFilter for RemoveSpecialCharactersFilter {
    fn filter(&self, message: &str) -> String {
        self.inner.filter(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> Arc<dyn LogFilter> {
        Arc::new(|s: &str| s.to_uppercase())
    }

    fn bracket() -> Arc<dyn LogFilter> {
        Arc::new(|s: &str| format!("[{}]", s))
    }

    #[test]
    fn test_identity_pipeline() {
        let pipeline = FilterPipeline::identity();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply("unchanged #1"), "unchanged #1");
    }

    #[test]
    fn test_single_filter() {
        let pipeline = FilterPipeline::new(vec![upper()]);
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.apply("hello"), "HELLO");
    }

    #[test]
    fn test_filter_order_matters() {
        let strip = || -> Arc<dyn LogFilter> {
            Arc::new(ReplaceRegexFilter::new(r"\[|\]", "").unwrap())
        };

        // bracket then strip: brackets removed again
        let a = FilterPipeline::new(vec![bracket(), strip()]);
        // strip then bracket: brackets survive
        let b = FilterPipeline::new(vec![strip(), bracket()]);

        assert_eq!(a.apply("x"), "x");
        assert_eq!(b.apply("x"), "[x]");
    }

    #[test]
    fn test_remove_special_characters() {
        let filter = RemoveSpecialCharactersFilter::new();
        assert_eq!(filter.filter("Number 12 \n"), "Number 12 ");
        assert_eq!(filter.filter("#4$2!"), "42");
        assert_eq!(filter.filter("plain text 7"), "plain text 7");
        assert_eq!(filter.filter("äöü"), "");
    }

    #[test]
    fn test_special_character_filters_share_pattern() {
        let a = RemoveSpecialCharactersFilter::new();
        let b = RemoveSpecialCharactersFilter::default();
        assert_eq!(a.inner.pattern.as_str(), SPECIAL_CHARACTERS.as_str());
        assert_eq!(b.inner.pattern.as_str(), "[^ a-zA-Z0-9]+");
        assert_eq!(a.filter("a-b_c"), b.filter("a-b_c"));
    }

    #[test]
    fn test_replace_regex_groups() {
        let filter = ReplaceRegexFilter::new(r"(\w+)@(\w+)", "$2 at $1").unwrap();
        assert_eq!(filter.filter("user@host"), "host at user");
        assert_eq!(filter.pattern(), r"(\w+)@(\w+)");
    }

    #[test]
    fn test_replace_regex_invalid_pattern() {
        let err = ReplaceRegexFilter::new("(unclosed", "").unwrap_err();
        match err {
            FilterError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_add_date_prefix() {
        let filter = AddDateFilter::with_format("%Y").unwrap();
        let out = filter.filter("msg");
        let (year, rest) = out.split_once(' ').unwrap();
        assert_eq!(rest, "msg");
        assert_eq!(year.len(), 4);
        assert!(year.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_add_date_default_format() {
        let filter = AddDateFilter::default();
        assert_eq!(filter.format(), DEFAULT_DATE_FORMAT);
        // "YYYY-MM-DD HH:MM:SS " is 20 chars
        let out = filter.filter("x");
        assert_eq!(out.len(), 21);
        assert!(out.ends_with(" x"));
    }

    #[test]
    fn test_add_date_bad_format_rejected() {
        assert_eq!(
            AddDateFilter::with_format("").unwrap_err(),
            FilterError::EmptyDateFormat
        );
        assert_eq!(
            AddDateFilter::with_format("%Q").unwrap_err(),
            FilterError::InvalidDateFormat("%Q".to_string())
        );
    }
}
