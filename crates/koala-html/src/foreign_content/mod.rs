//! Attribute adjustments for SVG and MathML start tags.
//!
//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
//!
//! The tokenizer lowercases every attribute name. SVG and MathML are case
//! sensitive, so the tree builder restores the casing before the sink sees
//! the attributes.

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::adjust_svg_attributes;

/// A namespaced attribute produced by "adjust foreign attributes".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignAttributeName {
    /// The prefix, empty for `xmlns` itself.
    pub prefix: &'static str,
    /// The local name.
    pub local_name: &'static str,
    /// The attribute namespace URI.
    pub namespace: &'static str,
}

const XLINK: &str = "http://www.w3.org/1999/xlink";
const XML: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// [§ 13.2.6.1 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "if any of the attributes on the token match the strings given in the
/// first column of the following table, let the attribute be a namespaced
/// attribute, with the prefix being the string given in the corresponding
/// cell in the second column, the local name being the string given in the
/// corresponding cell in the third column, and the namespace being the
/// namespace given in the corresponding cell in the fourth column."
///
/// Format: (attribute name, prefix, local name, namespace)
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str, &str, &str)] = &[
    ("xlink:actuate", "xlink", "actuate", XLINK),
    ("xlink:arcrole", "xlink", "arcrole", XLINK),
    ("xlink:href", "xlink", "href", XLINK),
    ("xlink:role", "xlink", "role", XLINK),
    ("xlink:show", "xlink", "show", XLINK),
    ("xlink:title", "xlink", "title", XLINK),
    ("xlink:type", "xlink", "type", XLINK),
    ("xml:lang", "xml", "lang", XML),
    ("xml:space", "xml", "space", XML),
    ("xmlns", "", "xmlns", XMLNS),
    ("xmlns:xlink", "xmlns", "xlink", XMLNS),
];

/// The namespaced form of an attribute on an SVG or MathML element, if it
/// has one.
///
/// ```
/// use koala_html::foreign_content::foreign_attribute_name;
///
/// let href = foreign_attribute_name("xlink:href").unwrap();
/// assert_eq!((href.prefix, href.local_name), ("xlink", "href"));
/// assert!(foreign_attribute_name("href").is_none());
/// ```
#[must_use]
pub fn foreign_attribute_name(name: &str) -> Option<ForeignAttributeName> {
    FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|(from, ..)| *from == name)
        .map(|&(_, prefix, local_name, namespace)| ForeignAttributeName {
            prefix,
            local_name,
            namespace,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_lang_is_namespaced() {
        let lang = foreign_attribute_name("xml:lang");
        assert_eq!(
            lang,
            Some(ForeignAttributeName {
                prefix: "xml",
                local_name: "lang",
                namespace: XML,
            })
        );
    }

    #[test]
    fn test_unprefixed_xmlns() {
        let xmlns = foreign_attribute_name("xmlns");
        assert!(xmlns.is_some_and(|n| n.prefix.is_empty() && n.namespace == XMLNS));
        assert!(foreign_attribute_name("xmlns:foo").is_none());
    }
}
