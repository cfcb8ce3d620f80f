#![forbid(unsafe_code)]

//! Text preparation for pointer fields.

use unicode_normalization::UnicodeNormalization;

use flowstack_widgets::split_glyphs;

/// Split DOM text into glyph strings, one element each.
///
/// Text is NFC-normalized first so a decomposed accent renders as a single
/// glyph box. Leading and trailing whitespace is dropped; inner runs of
/// whitespace collapse to one non-breaking space, as the browser would
/// render them.
pub fn field_glyphs(text: &str) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    split_glyphs(&collapsed.nfc().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowstack_widgets::pointer_field::NBSP;
    use pretty_assertions::assert_eq;

    #[test]
    fn decomposed_accent_becomes_one_glyph() {
        assert_eq!(field_glyphs("Cafe\u{301}"), vec!["C", "a", "f", "é"]);
    }

    #[test]
    fn whitespace_collapses_to_single_nbsp() {
        assert_eq!(
            field_glyphs("  Go\n\t  on "),
            vec!["G", "o", NBSP, "o", "n"]
        );
    }

    #[test]
    fn blank_text_has_no_glyphs() {
        assert!(field_glyphs(" \n ").is_empty());
    }
}
