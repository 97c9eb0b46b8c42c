//! Attribute and name checks that run before an element is created:
//! duplicate ids, `xmlns` declarations, XML 1.0 name compatibility and
//! `<meta>` charset sniffing.

use std::borrow::Cow;
use std::fmt::Write as _;

use koala_dom::Namespace;

use super::TreeBuilder;
use crate::config::NamePolicy;
use crate::error::TreeBuilderError;
use crate::foreign_content::foreign_attribute_name;
use crate::sink::{TokenizerDirective, TreeSink};
use crate::token::Attribute;

/// Whether `name` is an XML 1.0 `NCName`: a letter or `_`, then letters,
/// digits, `.`, `-`, `_` or U+00B7, and no colon.
pub(crate) fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '\u{B7}'))
}

/// Make `name` an `NCName` by replacing each offending character with `U`
/// and its six-digit uppercase hex code point.
pub(crate) fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let ok = if i == 0 {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '\u{B7}')
        };
        if ok {
            escaped.push(c);
        } else {
            let _ = write!(escaped, "U{:06X}", u32::from(c));
        }
    }
    escaped
}

/// The part of an attribute name the `NCName` check applies to. Adjusted
/// foreign attributes keep their `xlink:`/`xml:` prefix.
fn local_part(name: &str, ns: Namespace) -> &str {
    if ns == Namespace::Html {
        return name;
    }
    foreign_attribute_name(name).map_or(name, |adjusted| adjusted.local_name)
}

fn is_xmlns(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// [§ 2.5.4](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#extracting-character-encodings-from-meta-elements)
/// "algorithm for extracting a character encoding from a meta element"
///
/// Returns the raw label after `charset=`, unquoted.
///
/// ```
/// use koala_html::extract_charset_from_content;
///
/// assert_eq!(
///     extract_charset_from_content("text/html; charset=utf-8").as_deref(),
///     Some("utf-8")
/// );
/// assert_eq!(extract_charset_from_content("text/html"), None);
/// ```
#[must_use]
pub fn extract_charset_from_content(content: &str) -> Option<String> {
    #[derive(Clone, Copy)]
    enum State {
        Initial,
        Matched(usize),
        AfterCharset,
        AfterEquals,
        Quoted(char),
        Unquoted,
    }
    const CHARSET: &[u8] = b"charset";

    let mut state = State::Initial;
    let mut start = None;
    let mut end = None;

    for (i, c) in content.char_indices() {
        match state {
            State::Initial | State::Matched(_) => {
                let matched = match state {
                    State::Matched(n) => n,
                    _ => 0,
                };
                // "Loop: Find the first seven characters in s after position
                //  that are an ASCII case-insensitive match for the word "charset"."
                state = if c.is_ascii() && (c as u8).eq_ignore_ascii_case(&CHARSET[matched]) {
                    if matched + 1 == CHARSET.len() {
                        State::AfterCharset
                    } else {
                        State::Matched(matched + 1)
                    }
                } else {
                    State::Initial
                };
            }
            State::AfterCharset => match c {
                // "Skip any ASCII whitespace that immediately follow the word "charset""
                ' ' | '\t' | '\n' | '\u{C}' | '\r' => {}
                '=' => state = State::AfterEquals,
                // "If the next character is not a U+003D EQUALS SIGN (=),
                //  then move position to point just before that next
                //  character, and jump back to the step labeled loop."
                _ => return None,
            },
            State::AfterEquals => match c {
                ' ' | '\t' | '\n' | '\u{C}' | '\r' => {}
                '"' | '\'' => {
                    start = Some(i + 1);
                    state = State::Quoted(c);
                }
                _ => {
                    start = Some(i);
                    state = State::Unquoted;
                }
            },
            State::Quoted(quote) => {
                if c == quote {
                    end = Some(i);
                    break;
                }
            }
            State::Unquoted => {
                if matches!(c, ' ' | '\t' | '\n' | '\u{C}' | '\r' | ';') {
                    end = Some(i);
                    break;
                }
            }
        }
    }

    let start = start?;
    let end = end.unwrap_or(content.len());
    content.get(start..end).map(str::to_string)
}

impl<S: TreeSink> TreeBuilder<S> {
    /// Report an `id` value that appeared on an earlier start tag.
    pub(super) fn check_duplicate_id(&mut self, attributes: &[Attribute]) {
        let Some(id) = attributes.iter().find(|a| a.name == "id") else {
            return;
        };
        if let Some(&first) = self.id_locations.get(&id.value) {
            self.err(format!("Duplicate ID \u{201C}{}\u{201D}.", id.value));
            self.warn(format!(
                "The first occurrence of ID \u{201C}{}\u{201D} was here (token {first}).",
                id.value
            ));
        } else {
            let _ = self.id_locations.insert(id.value.clone(), self.token_index);
        }
    }

    /// Check `xmlns` declarations against `ns` and apply the name policy to
    /// attribute names. Returns the attributes to create the element with.
    pub(super) fn checked_attributes<'a>(
        &mut self,
        attributes: &'a [Attribute],
        ns: Namespace,
    ) -> Result<Cow<'a, [Attribute]>, TreeBuilderError> {
        for attribute in attributes.iter().filter(|a| is_xmlns(&a.name)) {
            if attribute.name == "xmlns" {
                if self.html4 {
                    self.err("Attribute \u{201C}xmlns\u{201D} not allowed here. (HTML4-only error.)");
                } else if attribute.value != ns.uri() {
                    self.err(format!(
                        "Bad value \u{201C}{}\u{201D} for the attribute \u{201C}xmlns\u{201D} (only \u{201C}{}\u{201D} permitted here).",
                        attribute.value,
                        ns.uri()
                    ));
                    self.apply_name_policy(
                        "Attribute \u{201C}xmlns\u{201D} is not serializable as XML 1.0.".to_string(),
                    )?;
                }
            } else if ns != Namespace::Html && attribute.name == "xmlns:xlink" {
                if attribute.value != "http://www.w3.org/1999/xlink" {
                    self.err(format!(
                        "Bad value \u{201C}{}\u{201D} for the attribute \u{201C}xmlns:link\u{201D} (only \u{201C}http://www.w3.org/1999/xlink\u{201D} permitted here).",
                        attribute.value
                    ));
                    self.apply_name_policy(
                        "Attribute \u{201C}xmlns:xlink\u{201D} with the value \u{201C}http://www.w3org/1999/xlink\u{201D} is not serializable as XML 1.0 without changing document semantics.".to_string(),
                    )?;
                }
            } else {
                let local = attribute.name.strip_prefix("xmlns:").unwrap_or(&attribute.name);
                self.err(format!("Attribute \u{201C}{local}\u{201D} not allowed here."));
                self.apply_name_policy(format!(
                    "Attribute with the local name \u{201C}{local}\u{201D} is not serializable as XML 1.0."
                ))?;
            }
        }

        let offending = |a: &Attribute| !is_xmlns(&a.name) && !is_ncname(local_part(&a.name, ns));
        if !attributes.iter().any(offending) {
            return Ok(Cow::Borrowed(attributes));
        }

        let mut adjusted = attributes.to_vec();
        for attribute in &mut adjusted {
            if !offending(attribute) {
                continue;
            }
            let message = format!(
                "Attribute \u{201C}{}\u{201D} is not serializable as XML 1.0.",
                attribute.name
            );
            self.apply_name_policy(message)?;
            if self.config.name_policy == NamePolicy::AlterInfoset {
                attribute.name = escape_name(&attribute.name);
            }
        }
        Ok(Cow::Owned(adjusted))
    }

    /// The name a custom element is created and popped with.
    pub(super) fn check_pop_name(&mut self, name: &str) -> Result<String, TreeBuilderError> {
        if is_ncname(name) {
            return Ok(name.to_string());
        }
        self.apply_name_policy(format!(
            "Element name \u{201C}{name}\u{201D} cannot be represented as XML 1.0."
        ))?;
        Ok(match self.config.name_policy {
            NamePolicy::AlterInfoset => escape_name(name),
            NamePolicy::Allow | NamePolicy::Fatal => name.to_string(),
        })
    }

    /// Warn, or abort under [`NamePolicy::Fatal`].
    fn apply_name_policy(&mut self, message: String) -> Result<(), TreeBuilderError> {
        match self.config.name_policy {
            NamePolicy::Allow | NamePolicy::AlterInfoset => {
                self.warn(message);
                Ok(())
            }
            NamePolicy::Fatal => Err(self.fatal_with(message)),
        }
    }

    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    ///
    /// "If the element has a charset attribute, and getting an encoding from
    /// its value results in an encoding, and the confidence is currently
    /// tentative, then change the encoding to the resulting encoding.
    ///
    /// Otherwise, if the element has an http-equiv attribute whose value is
    /// an ASCII case-insensitive match for the string "Content-Type", and
    /// the element has a content attribute, and applying the algorithm for
    /// extracting a character encoding from a meta element to that
    /// attribute's value returns an encoding, and the confidence is
    /// currently tentative, then change the encoding to the extracted
    /// encoding."
    pub(super) fn check_meta_charset(&mut self, attributes: &[Attribute]) {
        let value_of = |name: &str| {
            attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str())
        };

        let mut charset = None;
        if let Some(content) = value_of("content") {
            charset = extract_charset_from_content(content);
            if charset.is_some()
                && !value_of("http-equiv").is_some_and(|v| v.eq_ignore_ascii_case("content-type"))
            {
                self.warn("Attribute \u{201C}content\u{201D} would be sniffed as an internal character encoding declaration but there was no matching \u{201C}http-equiv='Content-Type'\u{201D} attribute.");
            }
        }
        if charset.is_none() {
            charset = value_of("charset").map(str::to_string);
        }
        if let Some(charset) = charset {
            log::trace!(target: super::LOG_TARGET, "meta declares charset {charset}");
            self.directives
                .push(TokenizerDirective::SetEncodingDeclaration(charset));
            self.directives.push(TokenizerDirective::RequestSuspension);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ncname() {
        assert!(is_ncname("div"));
        assert!(is_ncname("_x.y-z"));
        assert!(!is_ncname("1abc"));
        assert!(!is_ncname("a:b"));
        assert!(!is_ncname(""));
    }

    #[test]
    fn test_escape_name() {
        assert_eq!(escape_name("a:b"), "aU00003Ab");
        assert_eq!(escape_name("1a"), "U000031a");
        assert!(is_ncname(&escape_name("x<y>")));
    }

    #[test]
    fn test_extract_charset_unquoted_and_quoted() {
        assert_eq!(
            extract_charset_from_content("text/html; charset=ISO-8859-1").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(
            extract_charset_from_content("text/html;CHARSET = 'utf-8' ").as_deref(),
            Some("utf-8")
        );
        assert_eq!(
            extract_charset_from_content("charset=utf-8;foo").as_deref(),
            Some("utf-8")
        );
    }

    #[test]
    fn test_extract_charset_without_equals() {
        assert_eq!(extract_charset_from_content("charset utf-8"), None);
        assert_eq!(extract_charset_from_content("charset="), None);
    }

    #[test]
    fn test_extract_charset_unterminated_quote_runs_to_end() {
        assert_eq!(
            extract_charset_from_content("charset=\"utf-8").as_deref(),
            Some("utf-8")
        );
    }
}
