use std::collections::HashMap;

pub const PAD_INDEX: usize = 0;
pub const UNK_INDEX: usize = 1;

const RESERVED: [&str; 2] = ["<pad>", "<unk>"];

/// Token-to-index mapping built from a training split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocab {
    index: HashMap<String, usize>,
    lowercase: bool,
}

impl Vocab {
    /// Build a vocabulary of at most `limit` entries (reserved included).
    ///
    /// Tokens are ranked by frequency, ties broken lexicographically so the
    /// result does not depend on hash order.
    pub fn build<'a, I>(tokens: I, limit: usize, lowercase: bool) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for token in tokens {
            *counts.entry(normalize(token, lowercase)).or_default() += 1;
        }

        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .filter(|(token, _)| !RESERVED.contains(&token.as_str()))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut index: HashMap<String, usize> = RESERVED
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        let room = limit.saturating_sub(RESERVED.len());
        for (token, _) in ranked.into_iter().take(room) {
            let next = index.len();
            index.insert(token, next);
        }

        Vocab { index, lowercase }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn lookup(&self, token: &str) -> usize {
        self.index
            .get(&normalize(token, self.lowercase))
            .copied()
            .unwrap_or(UNK_INDEX)
    }

    /// Map sentence-segmented tokens to indices
    pub fn encode(&self, sentences: &[Vec<String>]) -> Vec<Vec<usize>> {
        sentences
            .iter()
            .map(|sentence| sentence.iter().map(|t| self.lookup(t)).collect())
            .collect()
    }
}

fn normalize(token: &str, lowercase: bool) -> String {
    if lowercase {
        token.to_lowercase()
    } else {
        token.to_string()
    }
}
