//! DOCTYPE classification.
//!
//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use serde::Serialize;
use strum_macros::Display;

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated ... mode ("no-quirks", "quirks", or
/// "limited-quirks")."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum DocumentMode {
    /// "quirks"
    Quirks,
    /// "limited-quirks"
    AlmostStandards,
    /// "no-quirks"
    Standards,
}

/// "The public identifier starts with: ..." (compared ASCII case-insensitively)
const QUIRKY_PUBLIC_ID_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to: ..."
const QUIRKY_PUBLIC_IDS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// Public ids that are quirky only when the system identifier is missing.
const QUIRKY_WITHOUT_SYSTEM_ID: &[&str] = &[
    "-//w3c//dtd html 4.01 transitional//en",
    "-//w3c//dtd html 4.01 frameset//en",
    "-//w3c//dtd html 4.01//en",
];

const IBM_XHTML_SYSTEM_ID: &str = "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Public ids of the HTML 4 doctypes. Compared exactly.
const HTML4_PUBLIC_IDS: &[&str] = &[
    "-//W3C//DTD HTML 4.0 Frameset//EN",
    "-//W3C//DTD HTML 4.0 Transitional//EN",
    "-//W3C//DTD HTML 4.0//EN",
    "-//W3C//DTD HTML 4.01 Frameset//EN",
    "-//W3C//DTD HTML 4.01 Transitional//EN",
    "-//W3C//DTD HTML 4.01//EN",
];

fn starts_with_ignore_ascii_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn is_quirky(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> bool {
    if force_quirks || name != Some("html") {
        return true;
    }
    if let Some(public) = public_id
        && (QUIRKY_PUBLIC_ID_PREFIXES
            .iter()
            .any(|prefix| starts_with_ignore_ascii_case(public, prefix))
            || QUIRKY_PUBLIC_IDS
                .iter()
                .any(|id| id.eq_ignore_ascii_case(public)))
    {
        return true;
    }
    match system_id {
        None => public_id.is_some_and(|public| {
            QUIRKY_WITHOUT_SYSTEM_ID
                .iter()
                .any(|id| id.eq_ignore_ascii_case(public))
        }),
        Some(system) => system.eq_ignore_ascii_case(IBM_XHTML_SYSTEM_ID),
    }
}

fn is_almost_standards(public_id: Option<&str>, system_id: Option<&str>) -> bool {
    let Some(public) = public_id else {
        return false;
    };
    if public.eq_ignore_ascii_case("-//w3c//dtd xhtml 1.0 transitional//en")
        || public.eq_ignore_ascii_case("-//w3c//dtd xhtml 1.0 frameset//en")
    {
        return true;
    }
    system_id.is_some()
        && (public.eq_ignore_ascii_case("-//w3c//dtd html 4.01 transitional//en")
            || public.eq_ignore_ascii_case("-//w3c//dtd html 4.01 frameset//en"))
}

/// Decide the document mode a DOCTYPE token selects.
///
/// ```
/// use koala_html::{DocumentMode, classify_doctype};
///
/// assert_eq!(classify_doctype(Some("html"), None, None, false), DocumentMode::Standards);
/// assert_eq!(classify_doctype(None, None, None, false), DocumentMode::Quirks);
/// ```
#[must_use]
pub fn classify_doctype(
    name: Option<&str>,
    public_id: Option<&str>,
    system_id: Option<&str>,
    force_quirks: bool,
) -> DocumentMode {
    if is_quirky(name, public_id, system_id, force_quirks) {
        DocumentMode::Quirks
    } else if is_almost_standards(public_id, system_id) {
        DocumentMode::AlmostStandards
    } else {
        DocumentMode::Standards
    }
}

/// Whether the public id names one of the HTML 4 doctypes.
#[must_use]
pub fn is_html4_public_id(public_id: Option<&str>) -> bool {
    public_id.is_some_and(|id| HTML4_PUBLIC_IDS.contains(&id))
}

/// Whether the doctype is one of the obsolete-but-permitted ones that only
/// deserve a warning.
pub(crate) fn is_obsolete_permitted(public_id: Option<&str>, system_id: Option<&str>) -> bool {
    match (public_id, system_id) {
        (Some("-//W3C//DTD HTML 4.0//EN"), None | Some("http://www.w3.org/TR/REC-html40/strict.dtd"))
        | (Some("-//W3C//DTD HTML 4.01//EN"), None | Some("http://www.w3.org/TR/html4/strict.dtd"))
        | (
            Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"),
        )
        | (Some("-//W3C//DTD XHTML 1.1//EN"), Some("http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd")) => {
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_doctype_is_standards() {
        assert_eq!(classify_doctype(Some("html"), None, None, false), DocumentMode::Standards);
        assert_eq!(
            classify_doctype(Some("html"), None, Some("about:legacy-compat"), false),
            DocumentMode::Standards
        );
    }

    #[test]
    fn test_force_quirks_and_wrong_name() {
        assert_eq!(classify_doctype(Some("html"), None, None, true), DocumentMode::Quirks);
        assert_eq!(classify_doctype(Some("svg"), None, None, false), DocumentMode::Quirks);
    }

    #[test]
    fn test_quirky_prefix_is_case_insensitive() {
        assert_eq!(
            classify_doctype(Some("html"), Some("-//IETF//DTD HTML 2.0//EN"), None, false),
            DocumentMode::Quirks
        );
        assert_eq!(classify_doctype(Some("html"), Some("HTML"), None, false), DocumentMode::Quirks);
    }

    #[test]
    fn test_html401_strict_depends_on_system_id() {
        let public = Some("-//W3C//DTD HTML 4.01//EN");
        assert_eq!(classify_doctype(Some("html"), public, None, false), DocumentMode::Quirks);
        assert_eq!(
            classify_doctype(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/strict.dtd"),
                false
            ),
            DocumentMode::Standards
        );
    }

    #[test]
    fn test_transitional_almost_standards_needs_system_id() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(classify_doctype(Some("html"), public, None, false), DocumentMode::Quirks);
        assert_eq!(
            classify_doctype(
                Some("html"),
                public,
                Some("http://www.w3.org/TR/html4/loose.dtd"),
                false
            ),
            DocumentMode::AlmostStandards
        );
    }

    #[test]
    fn test_xhtml_transitional_is_almost_standards() {
        assert_eq!(
            classify_doctype(
                Some("html"),
                Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
                None,
                false
            ),
            DocumentMode::AlmostStandards
        );
    }

    #[test]
    fn test_ibm_system_id() {
        assert_eq!(
            classify_doctype(Some("html"), None, Some(IBM_XHTML_SYSTEM_ID), false),
            DocumentMode::Quirks
        );
    }

    #[test]
    fn test_html4_public_ids_are_exact() {
        assert!(is_html4_public_id(Some("-//W3C//DTD HTML 4.01//EN")));
        assert!(!is_html4_public_id(Some("-//w3c//dtd html 4.01//en")));
        assert!(!is_html4_public_id(None));
    }
}
