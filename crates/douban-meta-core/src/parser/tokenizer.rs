//! # Folder and file name tokenizer
//!
//! Splits media folder and file names into lowercase word tokens so that
//! fixed vocabularies (specials markers such as `SP`, `OVA`, `NCOP`) can be
//! matched per word instead of per substring. Unlike a pure ASCII
//! normalizer, CJK text survives tokenization.

/// A token extracted from a name with positional information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized token text
    pub text: String,
    /// Start byte offset in the original string
    pub start: usize,
    /// End byte offset in the original string
    pub end: usize,
}

/// Delimiter characters used for tokenization.
const DELIMITERS: &[char] = &[
    '[', ']', '(', ')', '【', '】', '（', '）', '_', '.', '-', ' ', ',', '+', '&', '/', '·',
];

#[derive(Debug, Clone, Default)]
pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize a name into a sequence of normalized tokens.
    ///
    /// # Examples
    /// ```
    /// use douban_meta_core::parser::Tokenizer;
    ///
    /// let tokens = Tokenizer::new().tokenize("[VCB-Studio] 进击的巨人 SPs");
    /// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    /// assert_eq!(texts, ["vcb", "studio", "进击的巨人", "sps"]);
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current_start = 0;

        for (idx, c) in input.char_indices() {
            if DELIMITERS.contains(&c) || c.is_whitespace() {
                self.push_token(&mut tokens, input, current_start, idx);
                current_start = idx + c.len_utf8();
            }
        }
        self.push_token(&mut tokens, input, current_start, input.len());

        tokens
    }

    /// Returns true when any token equals one of the vocabulary words.
    /// Vocabulary entries are compared in lowercase.
    pub fn contains_word(&self, input: &str, vocabulary: &[&str]) -> bool {
        self.tokenize(input)
            .iter()
            .any(|t| vocabulary.iter().any(|word| t.text == word.to_lowercase()))
    }

    fn push_token(&self, tokens: &mut Vec<Token>, input: &str, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let text = self.normalize(&input[start..end]);
        if !text.is_empty() {
            tokens.push(Token { text, start, end });
        }
    }

    /// Lowercases and drops punctuation, keeping letters and digits of any
    /// script.
    fn normalize(&self, text: &str) -> String {
        text.chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    }
}
