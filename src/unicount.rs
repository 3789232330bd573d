/// Positions in file data are counted in UTF-16 code units, because thats what the editors produce.
/// Rust strings are UTF-8, so we need to convert back and forth all over the place.
///
/// All of this is a thin layer over str_indices, which does the heavy lifting with SIMD-ish tricks.

use std::ops::Range;

pub fn count_utf16(s: &str) -> usize {
    str_indices::utf16::count(s)
}

/// Convert a UTF-16 offset into a byte offset. Offsets past the end of the string are clamped to
/// the string's length.
pub fn utf16_to_bytes(s: &str, utf16_pos: usize) -> usize {
    str_indices::utf16::to_byte_idx(s, utf16_pos)
}

/// Like utf16_to_bytes, but returns None if the offset is past the end of the string or lands in
/// the middle of a surrogate pair.
pub fn utf16_to_bytes_exact(s: &str, utf16_pos: usize) -> Option<usize> {
    let byte_pos = utf16_to_bytes(s, utf16_pos);
    (str_indices::utf16::from_byte_idx(s, byte_pos) == utf16_pos).then_some(byte_pos)
}

pub fn split_at_utf16(s: &str, utf16_pos: usize) -> (&str, &str) {
    s.split_at(utf16_to_bytes(s, utf16_pos))
}

pub fn slice_utf16(s: &str, range: Range<usize>) -> &str {
    let start = utf16_to_bytes(s, range.start);
    let end = start + utf16_to_bytes(&s[start..], range.end - range.start);
    &s[start..end]
}

/// Characters outside the BMP take up two UTF-16 code units. Edits are only ever generated for
/// text without them.
pub fn contains_non_bmp_chars(s: &str) -> bool {
    s.chars().any(|c| c.len_utf16() > 1)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_code_units() {
        assert_eq!(count_utf16(""), 0);
        assert_eq!(count_utf16("hello"), 5);
        assert_eq!(count_utf16("日本語"), 3);
        assert_eq!(count_utf16("a𐆐b"), 4);
    }

    #[test]
    fn splits_by_code_unit() {
        assert_eq!(split_at_utf16("hi", 0), ("", "hi"));
        assert_eq!(split_at_utf16("hi", 1), ("h", "i"));
        assert_eq!(split_at_utf16("hi", 2), ("hi", ""));
        assert_eq!(split_at_utf16("日本語", 2), ("日本", "語"));
        assert_eq!(split_at_utf16("a𐆐b", 3), ("a𐆐", "b"));
    }

    #[test]
    fn exact_offsets() {
        assert_eq!(utf16_to_bytes_exact("abc", 3), Some(3));
        assert_eq!(utf16_to_bytes_exact("abc", 4), None);
        assert_eq!(utf16_to_bytes_exact("a𐆐b", 3), Some(5));
        // Half way through the surrogate pair.
        assert_eq!(utf16_to_bytes_exact("a𐆐b", 2), None);
    }

    #[test]
    fn slices_by_code_unit() {
        assert_eq!(slice_utf16("hello world", 6..11), "world");
        assert_eq!(slice_utf16("日本語です", 1..3), "本語");
        assert_eq!(slice_utf16("abc", 1..1), "");
    }

    #[test]
    fn detects_non_bmp() {
        assert!(!contains_non_bmp_chars("plain ascii"));
        assert!(!contains_non_bmp_chars("Δ ↯ ©"));
        assert!(contains_non_bmp_chars("roman 𐆐"));
    }
}
