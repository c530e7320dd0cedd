//! Character classes used by the directive grammar.

/// First character of a variable, property or placeholder name.
pub fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Any character of a variable, property or placeholder name.
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Inline whitespace that may separate tokens inside a directive.
pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// The single character consumed after a directive or before a block terminator.
pub fn is_directive_break(c: char) -> bool {
    c == ' ' || c == '\n'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_chars() {
        assert!(is_name_start('_'));
        assert!(is_name_start('x'));
        assert!(!is_name_start('1'));
        assert!(is_name_char('1'));
        assert!(!is_name_char('.'));
        assert!(!is_name_char('@'));
    }

    #[test]
    fn test_breaks() {
        assert!(is_directive_break(' '));
        assert!(is_directive_break('\n'));
        assert!(!is_directive_break('\t'));
        assert!(is_space('\t'));
    }
}
