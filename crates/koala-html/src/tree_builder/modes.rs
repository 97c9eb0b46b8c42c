//! Insertion modes and the fallthrough order between them.

use serde::Serialize;
use strum_macros::{Display, EnumIter};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary
/// operation of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// "in body" while the frameset-ok flag is still "ok".
    FramesetOk,
    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.11](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolgroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intbody)
    InTableBody,
    /// [§ 13.2.6.4.14](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intr)
    InRow,
    /// [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intd)
    InCell,
    /// [§ 13.2.6.4.16](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.19](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

impl InsertionMode {
    /// The stage a start tag moves to when this mode has no rule for it.
    ///
    /// `InTableBody → InRow → InTable → InCaption → InCell → FramesetOk →
    /// InBody → InHead → InHeadNoscript → InColumnGroup → InSelectInTable →
    /// InSelect → AfterBody → InFrameset → AfterFrameset`
    #[must_use]
    pub const fn start_tag_fallthrough(self) -> Option<Self> {
        match self {
            Self::InTableBody => Some(Self::InRow),
            Self::InRow => Some(Self::InTable),
            Self::InTable => Some(Self::InCaption),
            Self::InCaption => Some(Self::InCell),
            Self::InCell => Some(Self::FramesetOk),
            Self::FramesetOk => Some(Self::InBody),
            Self::InBody => Some(Self::InHead),
            Self::InHead => Some(Self::InHeadNoscript),
            Self::InHeadNoscript => Some(Self::InColumnGroup),
            Self::InColumnGroup => Some(Self::InSelectInTable),
            Self::InSelectInTable => Some(Self::InSelect),
            Self::InSelect => Some(Self::AfterBody),
            Self::AfterBody => Some(Self::InFrameset),
            Self::InFrameset => Some(Self::AfterFrameset),
            _ => None,
        }
    }

    /// The stage an end tag moves to when this mode has no rule for it.
    ///
    /// `InRow → InTableBody → InTable → InCaption → InCell → FramesetOk →
    /// InBody`, plus `InSelectInTable → InSelect`. "in body" handles every
    /// end tag itself.
    #[must_use]
    pub const fn end_tag_fallthrough(self) -> Option<Self> {
        match self {
            Self::InRow => Some(Self::InTableBody),
            Self::InTableBody => Some(Self::InTable),
            Self::InTable => Some(Self::InCaption),
            Self::InCaption => Some(Self::InCell),
            Self::InCell => Some(Self::FramesetOk),
            Self::FramesetOk => Some(Self::InBody),
            Self::InSelectInTable => Some(Self::InSelect),
            _ => None,
        }
    }

    /// Table-related modes in which `<select>` switches to
    /// [`InsertionMode::InSelectInTable`].
    #[must_use]
    pub const fn is_table_context(self) -> bool {
        matches!(
            self,
            Self::InTable
                | Self::InCaption
                | Self::InColumnGroup
                | Self::InTableBody
                | Self::InRow
                | Self::InCell
        )
    }
}

/// Whether the current node is in SVG or MathML content. Orthogonal to
/// [`InsertionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum ForeignFlag {
    /// An SVG or MathML element is open in scope.
    InForeign,
    /// Ordinary HTML content.
    NotInForeign,
}

/// What a mode handler wants done with the token it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The token has been consumed.
    Done,
    /// Run the token again from the top with the (changed) current mode.
    Reprocess,
    /// Hand the token to the next stage of the fallthrough chain.
    FallThrough,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_every_chain_terminates() {
        let count = InsertionMode::iter().count();
        for start in InsertionMode::iter() {
            let mut steps = 0;
            let mut mode = start;
            while let Some(next) = mode.start_tag_fallthrough() {
                mode = next;
                steps += 1;
                assert!(steps < count, "start tag chain from {start} loops");
            }
            let mut steps = 0;
            let mut mode = start;
            while let Some(next) = mode.end_tag_fallthrough() {
                mode = next;
                steps += 1;
                assert!(steps < count, "end tag chain from {start} loops");
            }
        }
    }

    #[test]
    fn test_start_tag_chain_reaches_after_frameset() {
        let mut mode = InsertionMode::InTableBody;
        let mut seen = vec![mode];
        while let Some(next) = mode.start_tag_fallthrough() {
            mode = next;
            seen.push(mode);
        }
        assert_eq!(seen.len(), 15);
        assert_eq!(mode, InsertionMode::AfterFrameset);
    }

    #[test]
    fn test_end_tag_chain_starts_with_row() {
        assert_eq!(
            InsertionMode::InRow.end_tag_fallthrough(),
            Some(InsertionMode::InTableBody)
        );
        assert_eq!(InsertionMode::Text.end_tag_fallthrough(), None);
    }
}
