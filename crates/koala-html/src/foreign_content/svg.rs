//! SVG attribute casing.

use crate::token::Attribute;

/// [§ 13.2.6.1 Adjust SVG attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes)
///
/// "When the steps below require the user agent to adjust SVG attributes
/// for a token, then, for each attribute on the token whose attribute name
/// is one of the ones in the first column of the following table, change
/// the attribute's name to the name given in the corresponding cell in the
/// second column. (This fixes the case of SVG attributes that are not all
/// lowercase.)"
const SVG_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// Restore the casing of SVG attribute names.
pub fn adjust_svg_attributes(attributes: &mut [Attribute]) {
    for attr in &mut *attributes {
        if let Some(&(_, to)) = SVG_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(from, _)| *from == attr.name)
        {
            attr.name = to.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_box() {
        let mut attrs = vec![
            Attribute::new("viewbox".to_string(), "0 0 10 10".to_string()),
            Attribute::new("fill".to_string(), "red".to_string()),
        ];
        adjust_svg_attributes(&mut attrs);
        assert_eq!(attrs[0].name, "viewBox");
        assert_eq!(attrs[1].name, "fill");
    }

    #[test]
    fn test_table_has_no_duplicates() {
        let mut names: Vec<&str> = SVG_ATTRIBUTE_ADJUSTMENTS.iter().map(|(from, _)| *from).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SVG_ATTRIBUTE_ADJUSTMENTS.len());
    }
}
