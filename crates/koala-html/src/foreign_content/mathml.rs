//! MathML attribute casing.

use crate::token::Attribute;

/// [§ 13.2.6.1 Adjust MathML attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes)
///
/// "When the steps below require the user agent to adjust MathML attributes
/// for a token, then, if the token has an attribute named definitionurl,
/// change its name to definitionURL (note the case difference)."
pub fn adjust_mathml_attributes(attributes: &mut [Attribute]) {
    for attr in attributes.iter_mut().filter(|a| a.name == "definitionurl") {
        attr.name = "definitionURL".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_url() {
        let mut attrs = vec![
            Attribute::new("definitionurl".to_string(), "x".to_string()),
            Attribute::new("mathvariant".to_string(), "bold".to_string()),
        ];
        adjust_mathml_attributes(&mut attrs);
        assert_eq!(attrs[0].name, "definitionURL");
        assert_eq!(attrs[1].name, "mathvariant");
    }
}
