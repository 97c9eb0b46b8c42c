//! Element classification.
//!
//! Tree construction treats many tags identically: `b`, `i`, `em` and
//! friends take the same path through every insertion mode. Each known
//! tag therefore maps to one [`ElementCategory`] plus the three flags that
//! bound scope searches and foster parenting.

use koala_dom::Namespace;
use strum_macros::Display;

/// Groups of tags that share tree-construction behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ElementCategory {
    /// Anything not listed below, including unknown tags.
    Other,
    /// `a`
    A,
    /// `base`
    Base,
    /// `body`
    Body,
    /// `br`
    Br,
    /// `button`
    Button,
    /// `caption`
    Caption,
    /// `col`
    Col,
    /// `colgroup`
    Colgroup,
    /// `form`
    Form,
    /// `frame`
    Frame,
    /// `frameset`
    Frameset,
    /// `image`
    Image,
    /// `input`
    Input,
    /// `isindex`
    Isindex,
    /// `li`
    Li,
    /// `link`
    Link,
    /// `math`
    Math,
    /// `meta`
    Meta,
    /// `svg`
    Svg,
    /// `head`
    Head,
    /// `hr`
    Hr,
    /// `html`
    Html,
    /// `nobr`
    Nobr,
    /// `noframes`
    Noframes,
    /// `noscript`
    Noscript,
    /// `optgroup`
    Optgroup,
    /// `option`
    Option,
    /// `p`
    P,
    /// `plaintext`
    Plaintext,
    /// `script`
    Script,
    /// `select`
    Select,
    /// `style`
    Style,
    /// `table`
    Table,
    /// `textarea`
    Textarea,
    /// `title`
    Title,
    /// `tr`
    Tr,
    /// `xmp`
    Xmp,
    /// `tbody`, `thead`, `tfoot`
    TbodyTheadTfoot,
    /// `td`, `th`
    TdTh,
    /// `dd`, `dt`
    DdDt,
    /// `h1` through `h6`
    H1ToH6,
    /// `marquee`, `applet`
    MarqueeApplet,
    /// `pre`, `listing`
    PreListing,
    /// `b`, `big`, `code`, `em`, `i`, `s`, `small`, `strike`, `strong`, `tt`, `u`
    FormattingRun,
    /// `ul`, `ol`, `dl`
    UlOlDl,
    /// `iframe`
    Iframe,
    /// `embed`, `img`
    EmbedImg,
    /// `area`, `basefont`, `bgsound`, `spacer`, `wbr`
    AreaBasefontBgsoundSpacerWbr,
    /// `div`, `blockquote`, `center`, `menu`
    DivBlockquoteCenterMenu,
    /// `address`, `dir`, `article`, `aside`, `datagrid`, `details`, `hgroup`,
    /// `figure`, `footer`, `header`, `nav`, `section`
    AddressSectioning,
    /// `ruby`, `span`, `sub`, `sup`, `var`
    RubySpanSubSupVar,
    /// `rt`, `rp`
    RtRp,
    /// `command`
    Command,
    /// `param`, `source`
    ParamSource,
    /// `mglyph`, `malignmark`
    MglyphMalignmark,
    /// `mi`, `mo`, `mn`, `ms`, `mtext`
    MathTextIntegration,
    /// `annotation-xml`
    AnnotationXml,
    /// `foreignObject`, `desc`
    ForeignObjectDesc,
    /// `noembed`
    Noembed,
    /// `fieldset`
    Fieldset,
    /// `output`, `label`
    OutputLabel,
    /// `object`
    Object,
    /// `font`
    Font,
    /// `keygen`
    Keygen,
}

/// A classified tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementName {
    /// Lowercase local name, as tokenized.
    pub name: String,
    /// The name to create SVG elements with (`foreignObject`).
    pub camel_case_name: String,
    /// Behavior group.
    pub category: ElementCategory,
    /// Bounds "has an element in scope" searches (HTML namespace only).
    pub scoping: bool,
    /// Member of the "special" category (HTML namespace only).
    pub special: bool,
    /// Content misplaced inside it gets foster parented.
    pub foster_parenting: bool,
    /// Not a tag the parser knows; the name is checked against the name
    /// policy before use.
    pub custom: bool,
}

impl ElementName {
    /// Classify a tag name. Uppercase ASCII is folded first.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let (category, custom) = match category_of(&name) {
            Some(category) => (category, false),
            None => (ElementCategory::Other, !is_known_other(&name)),
        };
        Self {
            camel_case_name: svg_camel_case(&name).map_or_else(|| name.clone(), str::to_string),
            category,
            scoping: SCOPING.contains(&name.as_str()),
            special: SPECIAL.contains(&name.as_str()),
            foster_parenting: FOSTER_PARENTING.contains(&name.as_str()),
            custom,
            name,
        }
    }
}

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// HTML elements that end a scope search. The SVG `foreignObject` is added
/// when it is pushed.
const SCOPING: &[&str] = &[
    "applet", "button", "caption", "html", "marquee", "object", "table", "td", "th",
];

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules"
const SPECIAL: &[&str] = &[
    "address", "area", "article", "aside", "base", "basefont", "bgsound", "blockquote", "body",
    "br", "center", "col", "colgroup", "command", "datagrid", "dd", "details", "dir", "div",
    "dl", "dt", "embed", "fieldset", "figure", "footer", "form", "frame", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "iframe", "image", "img",
    "input", "isindex", "keygen", "li", "link", "listing", "menu", "meta", "nav", "noembed",
    "noframes", "noscript", "ol", "p", "param", "plaintext", "pre", "script", "section",
    "select", "source", "spacer", "style", "tbody", "textarea", "tfoot", "thead", "title",
    "tr", "ul", "wbr", "xmp",
];

/// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
///
/// "When the current node is a table, tbody, tfoot, thead, or tr element"
const FOSTER_PARENTING: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

fn category_of(name: &str) -> Option<ElementCategory> {
    use ElementCategory as C;
    Some(match name {
        "a" => C::A,
        "base" => C::Base,
        "body" => C::Body,
        "br" => C::Br,
        "button" => C::Button,
        "caption" => C::Caption,
        "col" => C::Col,
        "colgroup" => C::Colgroup,
        "form" => C::Form,
        "frame" => C::Frame,
        "frameset" => C::Frameset,
        "image" => C::Image,
        "input" => C::Input,
        "isindex" => C::Isindex,
        "li" => C::Li,
        "link" => C::Link,
        "math" => C::Math,
        "meta" => C::Meta,
        "svg" => C::Svg,
        "head" => C::Head,
        "hr" => C::Hr,
        "html" => C::Html,
        "nobr" => C::Nobr,
        "noframes" => C::Noframes,
        "noscript" => C::Noscript,
        "optgroup" => C::Optgroup,
        "option" => C::Option,
        "p" => C::P,
        "plaintext" => C::Plaintext,
        "script" => C::Script,
        "select" => C::Select,
        "style" => C::Style,
        "table" => C::Table,
        "textarea" => C::Textarea,
        "title" => C::Title,
        "tr" => C::Tr,
        "xmp" => C::Xmp,
        "tbody" | "thead" | "tfoot" => C::TbodyTheadTfoot,
        "td" | "th" => C::TdTh,
        "dd" | "dt" => C::DdDt,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => C::H1ToH6,
        "marquee" | "applet" => C::MarqueeApplet,
        "pre" | "listing" => C::PreListing,
        "b" | "big" | "code" | "em" | "i" | "s" | "small" | "strike" | "strong" | "tt" | "u" => {
            C::FormattingRun
        }
        "ul" | "ol" | "dl" => C::UlOlDl,
        "iframe" => C::Iframe,
        "embed" | "img" => C::EmbedImg,
        "area" | "basefont" | "bgsound" | "spacer" | "wbr" => C::AreaBasefontBgsoundSpacerWbr,
        "div" | "blockquote" | "center" | "menu" => C::DivBlockquoteCenterMenu,
        "address" | "dir" | "article" | "aside" | "datagrid" | "details" | "hgroup" | "figure"
        | "footer" | "header" | "nav" | "section" => C::AddressSectioning,
        "ruby" | "span" | "sub" | "sup" | "var" => C::RubySpanSubSupVar,
        "rt" | "rp" => C::RtRp,
        "command" => C::Command,
        "param" | "source" => C::ParamSource,
        "mglyph" | "malignmark" => C::MglyphMalignmark,
        "mi" | "mo" | "mn" | "ms" | "mtext" => C::MathTextIntegration,
        "annotation-xml" => C::AnnotationXml,
        "foreignobject" | "desc" => C::ForeignObjectDesc,
        "noembed" => C::Noembed,
        "fieldset" => C::Fieldset,
        "output" | "label" => C::OutputLabel,
        "object" => C::Object,
        "font" => C::Font,
        "keygen" => C::Keygen,
        _ => return None,
    })
}

/// Known tags whose category is [`ElementCategory::Other`].
fn is_known_other(name: &str) -> bool {
    svg_camel_case(name).is_some()
        || matches!(
            name,
            "abbr"
                | "acronym"
                | "audio"
                | "bdo"
                | "canvas"
                | "cite"
                | "datalist"
                | "del"
                | "dfn"
                | "dialog"
                | "ins"
                | "kbd"
                | "legend"
                | "map"
                | "mark"
                | "meter"
                | "progress"
                | "q"
                | "samp"
                | "time"
                | "video"
                | "circle"
                | "defs"
                | "ellipse"
                | "g"
                | "line"
                | "path"
                | "polygon"
                | "polyline"
                | "rect"
                | "stop"
                | "text"
                | "tspan"
                | "use"
                | "mrow"
                | "mfrac"
                | "msqrt"
                | "mroot"
                | "msub"
                | "msup"
                | "mtable"
                | "mtr"
                | "mtd"
                | "annotation"
                | "semantics"
        )
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "If the adjusted current node is an element in the SVG namespace, and the
/// token's tag name is one of the ones in the first column of the following
/// table, change the tag name to the name given in the corresponding cell in
/// the second column."
const SVG_TAG_ADJUSTMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

fn svg_camel_case(name: &str) -> Option<&'static str> {
    SVG_TAG_ADJUSTMENTS
        .iter()
        .find(|(lower, _)| *lower == name)
        .map(|(_, camel)| *camel)
}

/// Whether an element with this namespace and name is `foreignObject`.
#[must_use]
pub fn is_svg_foreign_object(ns: Namespace, name: &str) -> bool {
    ns == Namespace::Svg && name == "foreignobject"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_run_shares_category() {
        for tag in ["b", "big", "code", "em", "i", "s", "small", "strike", "strong", "tt", "u"] {
            assert_eq!(ElementName::classify(tag).category, ElementCategory::FormattingRun);
        }
    }

    #[test]
    fn test_flags() {
        let table = ElementName::classify("table");
        assert!(table.scoping && table.special && table.foster_parenting);

        let td = ElementName::classify("td");
        assert!(td.scoping && !td.special && !td.foster_parenting);

        let tr = ElementName::classify("tr");
        assert!(!tr.scoping && tr.special && tr.foster_parenting);

        let b = ElementName::classify("b");
        assert!(!b.scoping && !b.special && !b.foster_parenting);
    }

    #[test]
    fn test_uppercase_folds() {
        let p = ElementName::classify("P");
        assert_eq!(p.name, "p");
        assert_eq!(p.category, ElementCategory::P);
    }

    #[test]
    fn test_svg_camel_case() {
        let fo = ElementName::classify("foreignObject");
        assert_eq!(fo.name, "foreignobject");
        assert_eq!(fo.camel_case_name, "foreignObject");
        assert_eq!(fo.category, ElementCategory::ForeignObjectDesc);
        assert!(!fo.custom);
    }

    #[test]
    fn test_unknown_tag_is_custom() {
        let x = ElementName::classify("x-widget");
        assert_eq!(x.category, ElementCategory::Other);
        assert!(x.custom);
        assert!(!ElementName::classify("span").custom);
        assert!(!ElementName::classify("abbr").custom);
    }
}
