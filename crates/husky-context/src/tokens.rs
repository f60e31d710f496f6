use anyhow::Result;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Token counting with the cl100k encoding
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    pub fn new() -> Result<Self> {
        let bpe = cl100k_base().map_err(|e| anyhow::anyhow!("Tokenizer error: {}", e))?;
        Ok(Self { bpe })
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    pub fn fits(&self, text: &str, budget: usize) -> bool {
        self.count(text) <= budget
    }
}
