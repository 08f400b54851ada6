use std::collections::BTreeMap;

/// One pronunciation: a sequence of ARPAbet phones.
pub type Pronunciation = Vec<String>;

/// Word to pronunciations mapping.
///
/// Keys are upper-cased on insertion and lookup, and each word keeps its
/// pronunciations in insertion order without duplicates. Entries are
/// stored sorted so iteration (and therefore serialisation) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PronunciationDictionary {
    entries: BTreeMap<String, Vec<Pronunciation>>,
}

impl PronunciationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a pronunciation for `word`. Returns `false` if it was already
    /// present.
    pub fn add(&mut self, word: &str, pronunciation: Pronunciation) -> bool {
        let prons = self.entries.entry(normalize_key(word)).or_default();
        if prons.contains(&pronunciation) {
            return false;
        }
        prons.push(pronunciation);
        true
    }

    pub fn lookup(&self, word: &str) -> Option<&[Pronunciation]> {
        self.entries
            .get(&normalize_key(word))
            .map(|p| p.as_slice())
            .filter(|p| !p.is_empty())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    /// Copy every entry of `other` into `self`. Returns the number of
    /// pronunciations that were new.
    pub fn merge(&mut self, other: &PronunciationDictionary) -> usize {
        let mut added = 0;
        for (word, prons) in other.iter() {
            for pron in prons {
                if self.add(word, pron.clone()) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Pronunciation])> {
        self.entries.iter().map(|(w, p)| (w.as_str(), p.as_slice()))
    }

    /// Derive pronunciations for colloquial `-IN'` forms from their `-ING`
    /// counterparts: `WALKIN'` gets `W AO1 K AH0 N` from `W AO1 K IH0 NG`.
    ///
    /// Only words that are not already in the dictionary are touched.
    /// Returns the words that received a derived entry.
    pub fn derive_in_forms<'a, I>(&mut self, words: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut derived = Vec::new();
        for word in words {
            let word = normalize_key(word);
            let Some(stem) = word.strip_suffix("IN'") else {
                continue;
            };
            if self.contains(&word) {
                continue;
            }
            let ing_form = format!("{stem}ING");
            let Some(ing_prons) = self.lookup(&ing_form) else {
                continue;
            };

            let new_prons: Vec<Pronunciation> = ing_prons
                .iter()
                .filter_map(|pron| {
                    let base = pron.strip_suffix(&["IH0".to_string(), "NG".to_string()])?;
                    let mut pron = base.to_vec();
                    pron.push("AH0".to_string());
                    pron.push("N".to_string());
                    Some(pron)
                })
                .collect();

            let mut any = false;
            for pron in new_prons {
                any |= self.add(&word, pron);
            }
            if any {
                log::debug!("Derived pronunciation for {word} from {ing_form}");
                derived.push(word);
            }
        }
        derived
    }
}

fn normalize_key(word: &str) -> String {
    word.trim().to_uppercase()
}
