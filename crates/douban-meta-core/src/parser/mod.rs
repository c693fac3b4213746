pub mod heuristic;
pub mod tokenizer;

pub use heuristic::FileNameParser;
pub use tokenizer::{Token, Tokenizer};
