//! Text processing - link detection for message bodies

mod tokenizer;

pub use tokenizer::{links, tokenize, Segment};
