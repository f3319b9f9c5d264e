//! Char classes used to find words and phrases.

/// Whitespace that separates words. Line endings count too.
#[inline]
pub fn char_is_whitespace(ch: char) -> bool {
  match ch {
      '\u{0009}' | // Character Tabulation
      '\u{0020}' | // Space
      '\u{00A0}' | // No-break Space
      '\u{180E}' | // Mongolian Vowel Separator
      '\u{202F}' | // Narrow No-break Space
      '\u{205F}' | // Medium Mathematical Space
      '\u{3000}' | // Ideographic Space
      '\u{FEFF}'   // Zero Width No-break Space
      => true,

      // En Quad through Zero Width Space.
      ch if ('\u{2000}' ..= '\u{200B}').contains(&ch) => true,

      ch => ch.is_whitespace(),
    }
}

#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_alphanumeric() || ch == '_'
}

/// True when `s` has whitespace somewhere between its first and last
/// non-whitespace chars.
pub fn has_interior_whitespace(s: &str) -> bool {
  s.trim_matches(char_is_whitespace)
    .chars()
    .any(char_is_whitespace)
}
