//! Tokens delivered to the tree builder.

use serde::{Deserialize, Serialize};

/// An attribute on a start tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Consecutive character tokens arrive as one [`Token::Characters`] run.
/// The JSON form is internally tagged:
/// `{"type": "StartTag", "name": "p", "attributes": [], "self_closing": false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag. When a DOCTYPE token is created, its name,
    /// public identifier, and system identifier must be marked as missing
    /// (which is a distinct state from the empty string)"
    Doctype {
        /// "a name"
        #[serde(default)]
        name: Option<String>,
        /// "a public identifier"
        #[serde(default)]
        public_id: Option<String>,
        /// "a system identifier"
        #[serde(default)]
        system_id: Option<String>,
        /// "a force-quirks flag"
        #[serde(default)]
        force_quirks: bool,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },

    /// A run of character tokens.
    Characters {
        /// The characters, in document order.
        data: String,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// "a tag name"
        name: String,
        /// "a list of attributes"
        #[serde(default)]
        attributes: Vec<Attribute>,
        /// "a self-closing flag"
        #[serde(default)]
        self_closing: bool,
    },

    /// End tag token. Attributes on end tags are a tokenizer error and never
    /// reach tree construction.
    EndTag {
        /// "a tag name"
        name: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// A start tag with no attributes.
    #[must_use]
    pub fn start_tag(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// An end tag.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// A character run.
    #[must_use]
    pub fn characters(data: &str) -> Self {
        Self::Characters {
            data: data.to_string(),
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tag_json_defaults() {
        let token: Token = serde_json::from_str(r#"{"type":"StartTag","name":"br"}"#).unwrap();
        assert_eq!(token, Token::start_tag("br"));
    }

    #[test]
    fn test_doctype_json_missing_ids_stay_missing() {
        let token: Token = serde_json::from_str(r#"{"type":"Doctype","name":"html"}"#).unwrap();
        assert_eq!(
            token,
            Token::Doctype {
                name: Some("html".to_string()),
                public_id: None,
                system_id: None,
                force_quirks: false,
            }
        );
    }

    #[test]
    fn test_eof_tag() {
        let token: Token = serde_json::from_str(r#"{"type":"EndOfFile"}"#).unwrap();
        assert!(token.is_eof());
    }
}
