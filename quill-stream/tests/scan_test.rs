use proptest::prelude::*;
use quill_stream::{chars, SourceStream, StreamExt, TextSourceStream};

#[test]
fn test_increment_str_is_atomic() {
    let mut stream = TextSourceStream::new("@varx");
    assert!(!stream.increment_str("@var("));
    assert_eq!(stream.pointer(), 0);
    assert!(stream.increment_str("@var"));
    assert_eq!(stream.current_char(), Some('x'));
}

#[test]
fn test_matches_str_does_not_consume() {
    let mut stream = TextSourceStream::new("@endfor");
    assert!(stream.matches_str("@end"));
    assert_eq!(stream.pointer(), 0);
}

#[test]
fn test_matches_directive_requires_word_boundary() {
    let mut stream = TextSourceStream::new("@elsevier");
    assert!(stream.matches_str("@else"));
    assert!(!stream.matches_directive("@else"));

    let mut stream = TextSourceStream::new("@else@endif");
    assert!(stream.matches_directive("@else"));
    assert_eq!(stream.pointer(), 0);

    let mut stream = TextSourceStream::new("@elseif(x)");
    assert!(stream.matches_directive("@elseif("));
}

#[test]
fn test_increment_until_consumed() {
    let mut stream = TextSourceStream::new("abc;def");
    assert!(stream.increment_until_consumed(";"));
    assert_eq!(stream.current_char(), Some('d'));

    let mut stream = TextSourceStream::new("abc");
    assert!(!stream.increment_until_consumed(";"));
    assert_eq!(stream.pointer(), 0);
}

#[test]
fn test_increment_until_leaves_match() {
    let mut stream = TextSourceStream::new("ab@c");
    assert!(stream.increment_until("@"));
    assert_eq!(stream.current_char(), Some('@'));
}

#[test]
fn test_escape_spaces_and_break() {
    let mut stream = TextSourceStream::new("  \tx \ny");
    assert!(stream.escape_spaces());
    assert_eq!(stream.current_char(), Some('x'));
    assert!(!stream.escape_spaces());
    stream.increment_pointer();
    assert!(stream.increment_directive_break());
    assert!(stream.increment_directive_break());
    assert!(!stream.increment_directive_break());
    assert_eq!(stream.current_char(), Some('y'));
}

#[test]
fn test_parse_text_while() {
    let mut stream = TextSourceStream::new("name_1.rest");
    assert_eq!(stream.parse_text_while(chars::is_name_char), "name_1");
    assert_eq!(stream.current_char(), Some('.'));
}

#[test]
fn test_reset_if_none_restores() {
    let mut stream = TextSourceStream::new("abc");
    let result: Option<()> = stream.reset_if_none(|s| {
        s.increment_pointer();
        s.increment_pointer();
        None
    });
    assert!(result.is_none());
    assert_eq!(stream.pointer(), 0);
}

#[test]
fn test_attempt_keeps_error_location() {
    let mut stream = TextSourceStream::new("abc");
    let result: Result<Option<()>, usize> = stream.attempt(|s| {
        s.increment_pointer();
        Err(s.pointer())
    });
    assert_eq!(result, Err(1));
    assert_eq!(stream.pointer(), 1);
}

#[test]
fn test_preceded_by() {
    let mut stream = TextSourceStream::new("a @endfor");
    stream.increment_until("@");
    assert!(stream.preceded_by(' '));
    assert!(!stream.preceded_by('a'));
    assert_eq!(stream.current_char(), Some('@'));
}

#[test]
fn test_directive_scan_skips_nested_blocks() {
    let text = "x @for(a) y @endfor z @endfor tail";
    let mut stream = TextSourceStream::new(text);
    assert_eq!(
        stream.increment_until_directive_with_skip("@for(", &["@endfor"]),
        Some(0)
    );
    assert_eq!(stream.pointer(), text.rfind("@endfor").unwrap());
}

#[test]
fn test_directive_scan_separators_only_at_top_level() {
    let text = "a @if(b) c @else d @endif e @else f @endif";
    let mut stream = TextSourceStream::new(text);
    let found =
        stream.increment_until_directive_with_skip("@if(", &["@elseif(", "@else", "@endif"]);
    assert_eq!(found, Some(1));
    assert_eq!(stream.pointer(), text.find("@else f").unwrap());
}

#[test]
fn test_directive_scan_ignores_longer_words() {
    let text = "see @endforeach here @endfor";
    let mut stream = TextSourceStream::new(text);
    assert_eq!(
        stream.increment_until_directive_with_skip("@for(", &["@endfor"]),
        Some(0)
    );
    assert_eq!(stream.pointer(), text.rfind("@endfor").unwrap());
}

#[test]
fn test_directive_scan_unterminated() {
    let mut stream = TextSourceStream::new("@for(x) never closed");
    stream.increment_str("@for(");
    let pointer = stream.pointer();
    assert_eq!(
        stream.increment_until_directive_with_skip("@for(", &["@endfor"]),
        None
    );
    assert_eq!(stream.pointer(), pointer);
}

proptest! {
    #[test]
    fn prop_failed_match_never_moves(text in "[a-z@ ]{0,24}", literal in "[a-z@]{1,6}") {
        let mut stream = TextSourceStream::new(text.clone());
        if !stream.increment_str(&literal) {
            prop_assert_eq!(stream.pointer(), 0);
        } else {
            prop_assert!(text.starts_with(&literal));
            prop_assert_eq!(stream.pointer(), literal.len());
        }
    }
}
