//! Text normalization and tokenization for recitation comparison.
//!
//! Normalization lower-cases the text and strips a fixed punctuation set.
//! Word mode splits on whitespace; char mode keeps every remaining Unicode
//! scalar, whitespace included.

use serde::{Deserialize, Serialize};

use crate::domain::Token;

/// Punctuation removed before comparison
const STRIPPED_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '(', ')', '[', ']', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenMode {
  Word,
  #[default]
  Char,
}

fn is_stripped(c: char) -> bool {
  STRIPPED_PUNCTUATION.contains(&c)
}

/// Lower-case and strip punctuation
pub fn normalize(text: &str) -> String {
  text.to_lowercase().chars().filter(|c| !is_stripped(*c)).collect()
}

pub fn tokenize(text: &str, mode: TokenMode) -> Vec<Token> {
  match mode {
    TokenMode::Word => tokenize_words(text),
    TokenMode::Char => tokenize_chars(text),
  }
}

fn tokenize_words(text: &str) -> Vec<Token> {
  text
    .split_whitespace()
    .filter_map(|fragment| {
      let normalized = normalize(fragment);
      if normalized.is_empty() {
        None
      } else {
        Some(Token::new(normalized, fragment))
      }
    })
    .collect()
}

fn tokenize_chars(text: &str) -> Vec<Token> {
  let mut tokens = Vec::with_capacity(text.len());
  for c in text.chars() {
    let surface = c.to_string();
    // Lower-casing can expand one scalar into several
    for lower in c.to_lowercase().filter(|l| !is_stripped(*l)) {
      tokens.push(Token::new(lower.to_string(), surface.clone()));
    }
  }
  tokens
}

#[cfg(test)]
mod tests {
  use super::*;

  fn normalized(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.normalized.as_str()).collect()
  }

  #[test]
  fn test_normalize_strips_punctuation_and_case() {
    assert_eq!(normalize("The LORD is my shepherd; I shall not want."), "the lord is my shepherd i shall not want");
    assert_eq!(normalize("(\"Yes\") [no]!?"), "yes no");
  }

  #[test]
  fn test_normalize_keeps_other_symbols() {
    assert_eq!(normalize("a-b / c"), "a-b / c");
  }

  #[test]
  fn test_word_mode() {
    let tokens = tokenize("The Lord,  is\nmy\tshepherd.", TokenMode::Word);
    assert_eq!(normalized(&tokens), vec!["the", "lord", "is", "my", "shepherd"]);
    assert_eq!(tokens[1].surface, "Lord,");
  }

  #[test]
  fn test_word_mode_discards_punctuation_only_fragments() {
    let tokens = tokenize("amen . ; amen", TokenMode::Word);
    assert_eq!(normalized(&tokens), vec!["amen", "amen"]);
  }

  #[test]
  fn test_word_mode_empty() {
    assert!(tokenize("", TokenMode::Word).is_empty());
    assert!(tokenize("   \n ", TokenMode::Word).is_empty());
  }

  #[test]
  fn test_char_mode_keeps_whitespace() {
    let tokens = tokenize("A b.", TokenMode::Char);
    assert_eq!(normalized(&tokens), vec!["a", " ", "b"]);
    assert_eq!(tokens[0].surface, "A");
  }

  #[test]
  fn test_char_mode_unicode_scalars() {
    let tokens = tokenize("여호와는", TokenMode::Char);
    assert_eq!(normalized(&tokens), vec!["여", "호", "와", "는"]);
  }

  #[test]
  fn test_deterministic() {
    let text = "He restores my soul.";
    assert_eq!(tokenize(text, TokenMode::Char), tokenize(text, TokenMode::Char));
  }
}
