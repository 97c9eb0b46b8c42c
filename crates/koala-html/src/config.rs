//! Tree builder configuration.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Which doctype the document is expected to carry. Only affects the
/// wording of doctype-related messages and the HTML 4 checks; the
/// document mode is always computed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctypeExpectation {
    /// `<!DOCTYPE html>`.
    #[default]
    Html,
    /// The HTML 4.01 Strict doctype.
    Html401Strict,
    /// The HTML 4.01 Transitional doctype.
    Html401Transitional,
    /// Accept either; turn on HTML 4 checks when an HTML 4 public id shows up.
    Auto,
    /// Compute the document mode silently.
    NoDoctypeErrors,
}

impl DoctypeExpectation {
    /// The "Expected ..." suffix used by messages about a missing doctype,
    /// or `None` when such messages are suppressed.
    #[must_use]
    pub const fn expected_suffix(self) -> Option<&'static str> {
        match self {
            Self::Html => Some("Expected \u{201C}<!DOCTYPE html>\u{201D}."),
            Self::Auto => Some("Expected e.g. \u{201C}<!DOCTYPE html>\u{201D}."),
            Self::Html401Strict => Some(
                "Expected \u{201C}<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">\u{201D}.",
            ),
            Self::Html401Transitional => Some(
                "Expected \u{201C}<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\" \"http://www.w3.org/TR/html4/loose.dtd\">\u{201D}.",
            ),
            Self::NoDoctypeErrors => None,
        }
    }
}

/// What to do with names that cannot be represented in XML 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// Keep the name and warn.
    #[default]
    Allow,
    /// Warn and escape the name into a valid NCName.
    AlterInfoset,
    /// Abort the parse.
    Fatal,
}

/// Options for a [`TreeBuilder`](crate::TreeBuilder).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use koala_html::TreeBuilderConfig;
///
/// let config: TreeBuilderConfig = serde_json::from_str(r#"{"scripting_enabled": false}"#).unwrap();
/// assert!(!config.scripting_enabled);
/// assert!(config.wanting_comments);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeBuilderConfig {
    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#other-parsing-state-flags)
    /// "The scripting flag is set to "enabled" if scripting was enabled for
    /// the Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    pub scripting_enabled: bool,
    /// Doctype the document is expected to have.
    pub doctype_expectation: DoctypeExpectation,
    /// Handling of names that are not XML 1.0 compatible.
    pub name_policy: NamePolicy,
    /// Whether doctype tokens produce a doctype node.
    pub reporting_doctype: bool,
    /// Whether comments reach the sink.
    pub wanting_comments: bool,
    /// Whether parse errors are recorded at all.
    pub report_errors: bool,
}

impl Default for TreeBuilderConfig {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            doctype_expectation: DoctypeExpectation::Html,
            name_policy: NamePolicy::Allow,
            reporting_doctype: true,
            wanting_comments: true,
            report_errors: true,
        }
    }
}

impl TreeBuilderConfig {
    /// Set the scripting flag.
    #[must_use]
    pub const fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    /// Set the doctype expectation.
    #[must_use]
    pub const fn with_doctype_expectation(mut self, expectation: DoctypeExpectation) -> Self {
        self.doctype_expectation = expectation;
        self
    }

    /// Set the name policy.
    #[must_use]
    pub const fn with_name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = policy;
        self
    }

    /// Enable or disable doctype nodes.
    #[must_use]
    pub const fn with_reporting_doctype(mut self, reporting: bool) -> Self {
        self.reporting_doctype = reporting;
        self
    }

    /// Enable or disable comment nodes.
    #[must_use]
    pub const fn with_comments(mut self, wanted: bool) -> Self {
        self.wanting_comments = wanted;
        self
    }

    /// Enable or disable error recording.
    #[must_use]
    pub const fn with_error_reporting(mut self, report: bool) -> Self {
        self.report_errors = report;
        self
    }
}
