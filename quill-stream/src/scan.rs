//! Scanning helpers built on the [`SourceStream`] primitives.
//!
//! Every helper that can fail is atomic: either it consumes exactly what it
//! matched or it leaves the pointer where it was.

use crate::chars;
use crate::stream::SourceStream;

pub trait StreamExt: SourceStream {
    /// Consumes `ch` if it is the current character.
    fn increment(&mut self, ch: char) -> bool {
        if self.current_char() == Some(ch) {
            self.increment_pointer()
        } else {
            false
        }
    }

    /// Consumes `literal` if the input continues with it; otherwise the
    /// pointer is restored and nothing is consumed.
    fn increment_str(&mut self, literal: &str) -> bool {
        let checkpoint = self.checkpoint();
        for expected in literal.chars() {
            if !self.increment(expected) {
                self.restore(checkpoint);
                return false;
            }
        }
        true
    }

    /// Returns true if the input continues with `literal`, without consuming it.
    fn matches_str(&mut self, literal: &str) -> bool {
        let checkpoint = self.checkpoint();
        let matched = self.increment_str(literal);
        self.restore(checkpoint);
        matched
    }

    /// Like [`matches_str`](StreamExt::matches_str) for a directive keyword.
    /// A keyword ending in a name character only matches when no name
    /// character follows, so `@else` does not match `@elsewhere`.
    fn matches_directive(&mut self, directive: &str) -> bool {
        let checkpoint = self.checkpoint();
        let matched = self.increment_str(directive)
            && !(directive.chars().next_back().is_some_and(chars::is_name_char)
                && self.current_char().is_some_and(chars::is_name_char));
        self.restore(checkpoint);
        matched
    }

    /// Advances until `literal` has been consumed. Restores the pointer and
    /// returns false when the stream ends first.
    fn increment_until_consumed(&mut self, literal: &str) -> bool {
        let checkpoint = self.checkpoint();
        while !self.has_ended() {
            if self.increment_str(literal) {
                return true;
            }
            self.increment_pointer();
        }
        self.restore(checkpoint);
        false
    }

    /// Advances until the input continues with `literal`, leaving it unconsumed.
    fn increment_until(&mut self, literal: &str) -> bool {
        let checkpoint = self.checkpoint();
        while !self.has_ended() {
            if self.matches_str(literal) {
                return true;
            }
            self.increment_pointer();
        }
        self.restore(checkpoint);
        false
    }

    /// Skips inline spaces. Returns true if at least one was skipped.
    fn escape_spaces(&mut self) -> bool {
        let mut escaped = false;
        while self.current_char().is_some_and(chars::is_space) {
            self.increment_pointer();
            escaped = true;
        }
        escaped
    }

    /// Consumes a single space or newline if one is next.
    fn increment_directive_break(&mut self) -> bool {
        match self.current_char() {
            Some(ch) if chars::is_directive_break(ch) => self.increment_pointer(),
            _ => false,
        }
    }

    /// Collects characters while `predicate` holds.
    fn parse_text_while<F>(&mut self, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if !predicate(ch) {
                break;
            }
            text.push(ch);
            self.increment_pointer();
        }
        text
    }

    /// Runs `parse` and rolls the stream back if it produced nothing.
    fn reset_if_none<T, F>(&mut self, parse: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> Option<T>,
    {
        let checkpoint = self.checkpoint();
        let result = parse(self);
        if result.is_none() {
            self.restore(checkpoint);
        }
        result
    }

    /// Fallible variant of [`reset_if_none`](StreamExt::reset_if_none): the
    /// stream is rolled back on `Ok(None)` and left where the error occurred
    /// on `Err`.
    fn attempt<T, E, F>(&mut self, parse: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut Self) -> Result<Option<T>, E>,
    {
        let checkpoint = self.checkpoint();
        let result = parse(self)?;
        if result.is_none() {
            self.restore(checkpoint);
        }
        Ok(result)
    }

    /// Returns true if the character right before the pointer is `ch`.
    fn preceded_by(&mut self, ch: char) -> bool {
        let pointer = self.pointer();
        let width = ch.len_utf8();
        if pointer < width {
            return false;
        }
        let checkpoint = self.checkpoint();
        let found = self.set_pointer_at(pointer - width) && self.current_char() == Some(ch);
        self.restore(checkpoint);
        found
    }

    /// Scans for the directive that closes the block the pointer is in.
    ///
    /// `skip` is the opening directive of the block kind: every occurrence
    /// opens a nested block whose terminator (the last entry of `candidates`)
    /// is skipped as well. The first candidate found outside nested blocks
    /// wins; the pointer is left in front of it and its index is returned.
    /// Earlier candidates act as separators (`@elseif(`, `@else`) and are
    /// ignored inside nested blocks. Candidates are matched with
    /// [`matches_directive`](StreamExt::matches_directive) and those sharing a
    /// prefix must be listed longest first. Returns `None` and restores the pointer if the stream
    /// ends before a match.
    fn increment_until_directive_with_skip(
        &mut self,
        skip: &str,
        candidates: &[&str],
    ) -> Option<usize> {
        let terminator = candidates.len().checked_sub(1)?;
        let checkpoint = self.checkpoint();
        let mut skips = 0usize;
        while !self.has_ended() {
            if self.current_char() == Some('@') {
                if self.increment_str(skip) {
                    skips += 1;
                    continue;
                }
                let found = candidates.iter().position(|c| self.matches_directive(c));
                match found {
                    Some(index) if skips == 0 => return Some(index),
                    Some(index) if index == terminator => {
                        skips -= 1;
                        self.increment_str(candidates[index]);
                        continue;
                    }
                    _ => {}
                }
            }
            self.increment_pointer();
        }
        self.restore(checkpoint);
        None
    }
}

impl<S: SourceStream + ?Sized> StreamExt for S {}
