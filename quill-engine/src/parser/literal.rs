use crate::error::{RenderError, Result};
use crate::value::Primitive;
use quill_stream::{chars, SourceStream, StreamExt};

/// `42`, `-7`, `3.5`, `9L`. Integers that do not fit an int become longs.
pub(crate) fn parse_number<S: SourceStream + ?Sized>(stream: &mut S) -> Option<Primitive> {
    stream.reset_if_none(|s| {
        let mut text = String::new();
        if s.increment('-') {
            text.push('-');
        }
        let digits = s.parse_text_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return None;
        }
        text.push_str(&digits);

        let decimals = s.reset_if_none(|s| {
            if !s.increment('.') {
                return None;
            }
            let decimals = s.parse_text_while(|c| c.is_ascii_digit());
            (!decimals.is_empty()).then_some(decimals)
        });
        if let Some(decimals) = decimals {
            text.push('.');
            text.push_str(&decimals);
            return text.parse().ok().map(Primitive::Double);
        }
        if s.increment('L') {
            return text.parse().ok().map(Primitive::Long);
        }
        match text.parse::<i32>() {
            Ok(n) => Some(Primitive::Int(n)),
            Err(_) => text.parse::<i64>().ok().map(Primitive::Long),
        }
    })
}

/// `"text"` with `\"`, `\\`, `\n`, `\t` and `\r` escapes.
pub(crate) fn parse_string_literal<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Option<String>> {
    if stream.current_char() != Some('"') {
        return Ok(None);
    }
    let position = stream.position();
    stream.increment_pointer();
    let mut text = String::new();
    loop {
        match stream.current_char() {
            None => return Err(RenderError::parse("unterminated string literal", position)),
            Some('"') => {
                stream.increment_pointer();
                return Ok(Some(text));
            }
            Some('\\') => {
                stream.increment_pointer();
                let escaped = stream
                    .current_char()
                    .ok_or_else(|| RenderError::parse("unterminated string literal", position))?;
                text.push(unescape(escaped));
                stream.increment_pointer();
            }
            Some(ch) => {
                text.push(ch);
                stream.increment_pointer();
            }
        }
    }
}

/// `'c'`, with the same escapes as strings.
pub(crate) fn parse_char_literal<S: SourceStream + ?Sized>(
    stream: &mut S,
) -> Result<Option<char>> {
    if stream.current_char() != Some('\'') {
        return Ok(None);
    }
    let position = stream.position();
    stream.increment_pointer();
    let value = match stream.current_char() {
        Some('\\') => {
            stream.increment_pointer();
            stream.current_char().map(unescape)
        }
        other => other,
    };
    let Some(value) = value else {
        return Err(RenderError::parse("unterminated char literal", position));
    };
    stream.increment_pointer();
    if !stream.increment('\'') {
        return Err(RenderError::parse(
            "char literal must hold exactly one character",
            position,
        ));
    }
    Ok(Some(value))
}

/// `true` or `false`, not followed by more name characters.
pub(crate) fn parse_boolean<S: SourceStream + ?Sized>(stream: &mut S) -> Option<bool> {
    stream.reset_if_none(|s| {
        let value = if s.increment_str("true") {
            true
        } else if s.increment_str("false") {
            false
        } else {
            return None;
        };
        (!s.current_char().is_some_and(chars::is_name_char)).then_some(value)
    })
}

fn unescape(ch: char) -> char {
    match ch {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_stream::TextSourceStream;

    #[test]
    fn test_numbers() {
        let mut stream = TextSourceStream::new("42;");
        assert_eq!(parse_number(&mut stream), Some(Primitive::Int(42)));
        assert_eq!(stream.current_char(), Some(';'));

        let mut stream = TextSourceStream::new("-2.5");
        assert_eq!(parse_number(&mut stream), Some(Primitive::Double(-2.5)));

        let mut stream = TextSourceStream::new("7L");
        assert_eq!(parse_number(&mut stream), Some(Primitive::Long(7)));

        let mut stream = TextSourceStream::new("3000000000");
        assert_eq!(parse_number(&mut stream), Some(Primitive::Long(3_000_000_000)));
    }

    #[test]
    fn test_number_leaves_trailing_dot() {
        let mut stream = TextSourceStream::new("5.x");
        assert_eq!(parse_number(&mut stream), Some(Primitive::Int(5)));
        assert_eq!(stream.current_char(), Some('.'));

        let mut stream = TextSourceStream::new("-x");
        assert_eq!(parse_number(&mut stream), None);
        assert_eq!(stream.pointer(), 0);
    }

    #[test]
    fn test_string_literal() {
        let mut stream = TextSourceStream::new(r#""say \"hi\"\n" rest"#);
        assert_eq!(
            parse_string_literal(&mut stream),
            Ok(Some("say \"hi\"\n".to_string()))
        );
        assert_eq!(stream.current_char(), Some(' '));

        let mut stream = TextSourceStream::new("\"open");
        assert!(matches!(
            parse_string_literal(&mut stream),
            Err(RenderError::Parse { .. })
        ));
    }

    #[test]
    fn test_char_literal() {
        let mut stream = TextSourceStream::new("'a'");
        assert_eq!(parse_char_literal(&mut stream), Ok(Some('a')));
        let mut stream = TextSourceStream::new("'ab'");
        assert!(parse_char_literal(&mut stream).is_err());
    }

    #[test]
    fn test_boolean() {
        let mut stream = TextSourceStream::new("true)");
        assert_eq!(parse_boolean(&mut stream), Some(true));
        let mut stream = TextSourceStream::new("falsehood");
        assert_eq!(parse_boolean(&mut stream), None);
        assert_eq!(stream.pointer(), 0);
    }
}
