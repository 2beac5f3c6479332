pub mod alignment;
pub mod scorer;
pub mod tokenizer;

pub use alignment::{align, diff, merge_substitutions};
pub use scorer::{score, score_attempts, split_attempt, PassageVerdict, ScoreResult, ScoringInput};
pub use tokenizer::{normalize, tokenize, TokenMode};
