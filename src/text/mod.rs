//! Text normalization and tokenization

pub mod sanitize;
pub mod stopwords;
pub mod tokenizer;

pub use sanitize::normalize;
pub use stopwords::StopwordList;
pub use tokenizer::{tokenize, tokens_to_text, TokenPolicy};
