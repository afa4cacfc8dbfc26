//! Character and name classes
//!
//! The output text model is XML 1.0: a terminal may only carry a codepoint
//! from the `Char` production, and attribute names with a `prefix:` are
//! treated as namespace-qualified.

use memchr::memchr;

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Decode a terminal codepoint, rejecting anything outside the text model
#[inline]
pub fn content_char(codepoint: u32) -> Option<char> {
    if is_valid_xml_char(codepoint) {
        char::from_u32(codepoint)
    } else {
        None
    }
}

/// True if the name carries a namespace prefix (`prefix:local`)
#[inline]
pub fn is_qualified(name: &str) -> bool {
    memchr(b':', name.as_bytes()).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_chars() {
        assert!(is_valid_xml_char('a' as u32));
        assert!(is_valid_xml_char(0x9));
        assert!(is_valid_xml_char(0xA));
        assert!(is_valid_xml_char(0x1F600));
    }

    #[test]
    fn test_invalid_chars() {
        assert!(!is_valid_xml_char(0x0));
        assert!(!is_valid_xml_char(0x1));
        assert!(!is_valid_xml_char(0x1B));
        assert!(!is_valid_xml_char(0xD800));
        assert!(!is_valid_xml_char(0xFFFE));
        assert!(!is_valid_xml_char(0x110000));
    }

    #[test]
    fn test_content_char() {
        assert_eq!(content_char(0x48), Some('H'));
        assert_eq!(content_char(0x7), None);
    }

    #[test]
    fn test_qualified_names() {
        assert!(is_qualified("ixml:state"));
        assert!(!is_qualified("id"));
    }
}
