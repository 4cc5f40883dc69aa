use std::collections::{BTreeSet, HashMap, HashSet};

use jieba_rs::Jieba;
use tracing::debug;

use crate::config::Vocabulary;

/// What a query asks about. `subjects` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub subjects: BTreeSet<String>,
    pub descriptors: BTreeSet<String>,
}

impl ParsedQuery {
    pub fn subjects_joined(&self) -> String {
        join(&self.subjects, "、")
    }

    pub fn descriptors_joined(&self) -> String {
        join(&self.descriptors, ", ")
    }
}

fn join(set: &BTreeSet<String>, sep: &str) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(sep)
}

/// Rule-based split of a free-text query into subject and descriptor terms.
pub struct KeywordExtractor {
    jieba: Jieba,
    stop_words: HashSet<String>,
    /// lowercased form -> configured spelling
    descriptors: HashMap<String, String>,
}

impl KeywordExtractor {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let mut jieba = Jieba::new();
        let mut descriptors = HashMap::new();
        for term in &vocabulary.descriptors {
            // keep descriptor phrases whole during segmentation
            jieba.add_word(term, None, None);
            let lower = term.to_lowercase();
            if lower != *term {
                jieba.add_word(&lower, None, None);
            }
            descriptors.insert(lower, term.clone());
        }

        Self {
            jieba,
            stop_words: vocabulary.stop_words.clone(),
            descriptors,
        }
    }

    /// Returns `None` when no subject term survives filtering.
    pub fn parse(&self, query: &str) -> Option<ParsedQuery> {
        let normalized = query.trim().to_lowercase();

        let mut subjects = BTreeSet::new();
        let mut descriptors = BTreeSet::new();

        for piece in normalized.split_whitespace() {
            for token in self.jieba.cut_for_search(piece, true) {
                let token = token.trim();
                if token.is_empty() || self.stop_words.contains(token) {
                    continue;
                }
                if let Some(term) = self.descriptors.get(token) {
                    descriptors.insert(term.clone());
                } else if !is_numeral(token) {
                    subjects.insert(token.to_string());
                }
            }
        }

        debug!(query, ?subjects, ?descriptors, "Query parsed");

        if subjects.is_empty() {
            return None;
        }
        Some(ParsedQuery {
            subjects,
            descriptors,
        })
    }
}

/// Chinese numeral ideographs, including the financial forms.
const CJK_NUMERALS: &str = "〇零一二兩三四五六七八九十百千萬億兆壹貳參肆伍陸柒捌玖拾佰仟";

/// Digits in any script, or numbers written out in Chinese ("十二").
fn is_numeral(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_numeric() || CJK_NUMERALS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(&Vocabulary::new(
            ["的", "和", "了", "呢", "please"],
            ["結塊", "過篩", "Caking"],
        ))
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn subject_and_descriptor() {
        let parsed = extractor().parse("鹽 結塊").unwrap();
        assert_eq!(parsed.subjects, set(&["鹽"]));
        assert_eq!(parsed.descriptors, set(&["結塊"]));
    }

    #[test]
    fn descriptor_match_ignores_case_and_keeps_configured_spelling() {
        let parsed = extractor().parse("  SALT caking ").unwrap();
        assert_eq!(parsed.subjects, set(&["salt"]));
        assert_eq!(parsed.descriptors, set(&["Caking"]));
    }

    #[test]
    fn stop_words_and_numbers_only_is_unparseable() {
        let ex = extractor();
        assert!(ex.parse("的 和 了").is_none());
        assert!(ex.parse("123 4 的").is_none());
        assert!(ex.parse("   ").is_none());
        assert!(ex.parse("please 42").is_none());
    }

    #[test]
    fn chinese_numerals_count_as_numbers() {
        let ex = extractor();
        assert!(ex.parse("三 九").is_none());
        assert!(ex.parse("十二 的").is_none());
        assert!(ex.parse("壹 ４").is_none());

        let parsed = ex.parse("鹽 十").unwrap();
        assert_eq!(parsed.subjects, set(&["鹽"]));
    }

    #[test]
    fn numerals_inside_words_are_kept() {
        assert!(is_numeral("十二"));
        assert!(is_numeral("２０"));
        assert!(!is_numeral("一起"));
        assert!(!is_numeral("9號"));
    }

    #[test]
    fn descriptors_alone_are_unparseable() {
        assert!(extractor().parse("結塊 過篩").is_none());
    }

    #[test]
    fn subjects_are_sorted_and_deduplicated() {
        let parsed = extractor().parse("sugar salt sugar 的").unwrap();
        assert_eq!(
            parsed.subjects.iter().collect::<Vec<_>>(),
            vec!["salt", "sugar"]
        );
        assert_eq!(parsed.subjects_joined(), "salt、sugar");
        assert_eq!(parsed.descriptors_joined(), "");
    }
}
