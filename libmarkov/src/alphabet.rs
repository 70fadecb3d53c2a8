use indexmap::IndexSet;

/// An insertion-ordered set of symbols that maps each symbol to a stable index.
///
/// Both the hidden states and the emitted outputs of a model are stored as an
/// `Alphabet`: the index of a symbol is the position at which it was first
/// inserted, and it never changes after that.
#[derive(Default, Clone, Debug)]
pub struct Alphabet {
    symbols: IndexSet<String>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, returning its index. Symbols that are
    /// already present keep the index they were first given.
    pub fn insert(&mut self, symbol: &str) -> usize {
        match self.symbols.get_index_of(symbol) {
            Some(idx) => idx,
            None => self.symbols.insert_full(symbol.to_string()).0,
        }
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.get_index_of(symbol)
    }

    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn symbol(&self, idx: usize) -> &str {
        &self.symbols[idx]
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|s| s.as_str())
    }
}

impl<S: AsRef<str>> FromIterator<S> for Alphabet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut alphabet = Alphabet::new();
        iter.into_iter().for_each(|s| {
            alphabet.insert(s.as_ref());
        });
        alphabet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_first_insertion_wins() {
        let mut alphabet = Alphabet::new();
        assert_eq!(alphabet.insert("happy"), 0);
        assert_eq!(alphabet.insert("grumpy"), 1);
        assert_eq!(alphabet.insert("happy"), 0);
        assert_eq!(alphabet.insert("hungry"), 2);

        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.symbol(1), "grumpy");
        assert_eq!(alphabet.index_of("hungry"), Some(2));
        assert_eq!(alphabet.index_of("sleepy"), None);
        assert_eq!(
            alphabet.iter().collect::<Vec<_>>(),
            vec!["happy", "grumpy", "hungry"]
        );
    }

    #[test]
    fn test_alphabet_from_iter() {
        let alphabet: Alphabet = ["b", "a", "b", "c"].into_iter().collect();
        assert_eq!(alphabet.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert!(alphabet.contains("c"));
        assert!(!alphabet.is_empty());
    }
}
