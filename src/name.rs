//! Name Matcher — normalizes a user token and compares it against an
//! 11-byte on-disk 8.3 name field.
//!
//! Follows standard short-name conventions: space-padded, uppercase,
//! 8+3 split. No LFN, no validity checks beyond the split and pad.

/// Normalizes `input` into an 11-byte space-padded uppercase 8.3 name.
/// `..` is handled by the caller ([`matches`]) since it compares against
/// the literal two-byte prefix rather than a padded name.
pub fn normalize_8_3(input: &str) -> [u8; 11] {
    let mut buf = [0x20u8; 11];
    let (base, ext) = match input.find('.') {
        Some(i) => (&input[..i], &input[i + 1..]),
        None => (input, ""),
    };
    for (dst, src) in buf[0..8].iter_mut().zip(base.bytes().take(8)) {
        *dst = src.to_ascii_uppercase();
    }
    for (dst, src) in buf[8..11].iter_mut().zip(ext.bytes().take(3)) {
        *dst = src.to_ascii_uppercase();
    }
    buf
}

/// True if `input` matches the on-disk 11-byte `name` field: a
/// `..`-prefixed input matches the `..` entry; otherwise the normalized
/// 11-byte form is compared byte-for-byte.
pub fn matches(input: &str, name: &[u8; 11]) -> bool {
    if input.starts_with("..") {
        return name[0] == b'.' && name[1] == b'.';
    }
    normalize_8_3(input) == *name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_name_without_extension() {
        assert_eq!(&normalize_8_3("FOO"), b"FOO        ");
    }

    #[test]
    fn splits_base_and_extension() {
        assert_eq!(&normalize_8_3("foo.txt"), b"FOO     TXT");
    }

    #[test]
    fn is_case_insensitive_on_ascii() {
        assert!(matches("foo.txt", b"FOO     TXT"));
        assert!(matches("FOO.TXT", b"FOO     TXT"));
    }

    #[test]
    fn dotdot_matches_only_dotdot_entry() {
        assert!(matches("..", b"..         "));
        assert!(!matches("..", b"FOO     TXT"));
        assert!(!matches("FOO.TXT", b"..         "));
    }

    #[test]
    fn truncates_long_base_and_extension() {
        assert_eq!(&normalize_8_3("abcdefghij.txtx"), b"ABCDEFGHTXT");
    }
}
