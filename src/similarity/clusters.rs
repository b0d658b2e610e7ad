// Group similar pairs into clusters of near-duplicate questions.
//
// Clusters are the connected components of the pair graph: if A~B and B~C
// then A, B and C land in one cluster even when A and C fell under the
// threshold. Questions with no retained pair belong to no cluster.
//
// Labels reuse the keyword TF-IDF from `keyword_extraction` over the member
// texts, with English stop words removed, so "What is gravity?" and
// "What is gravity force?" come out as something like "gravity / force".

use std::collections::{BTreeMap, HashMap, HashSet};

use keyword_extraction::tf_idf::{TfIdf, TfIdfParams};
use stop_words::{get, LANGUAGE};

use crate::analysis::models::{DuplicateCluster, Question, SimilarityPair};
use crate::output::truncate_chars;
use crate::text::normalize::tokenize;

/// How many keywords go into a cluster label.
const LABEL_KEYWORDS: usize = 3;

/// Fallback label length when no keyword survives stop-word removal.
const LABEL_FALLBACK_CHARS: usize = 60;

/// Disjoint-set forest over question positions.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            // Smaller root wins so cluster ids follow question order
            let (keep, merge) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            self.parent[merge] = keep;
        }
    }
}

/// Build duplicate clusters from one result's questions and pairs.
///
/// Clusters come back ordered by their smallest member ordinal, with member
/// ordinals ascending inside each cluster.
pub fn find_clusters(questions: &[Question], pairs: &[SimilarityPair]) -> Vec<DuplicateCluster> {
    if pairs.is_empty() {
        return Vec::new();
    }

    let position: HashMap<usize, usize> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| (q.ordinal, i))
        .collect();

    let mut forest = UnionFind::new(questions.len());
    let mut paired = vec![false; questions.len()];
    for pair in pairs {
        let (Some(&a), Some(&b)) = (
            position.get(&pair.question_a.ordinal),
            position.get(&pair.question_b.ordinal),
        ) else {
            continue;
        };
        forest.union(a, b);
        paired[a] = true;
        paired[b] = true;
    }

    // BTreeMap keyed by root keeps clusters in first-member order
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in (0..questions.len()).filter(|&i| paired[i]) {
        let root = forest.find(i);
        groups.entry(root).or_default().push(i);
    }

    let stop_words: Vec<String> = get(LANGUAGE::English);

    groups
        .into_values()
        .map(|members| {
            let texts: Vec<String> = members.iter().map(|&i| questions[i].text.clone()).collect();

            let mut document_ids: Vec<String> = Vec::new();
            for &i in &members {
                if !document_ids.contains(&questions[i].document_id) {
                    document_ids.push(questions[i].document_id.clone());
                }
            }

            let mut ordinals: Vec<usize> = members.iter().map(|&i| questions[i].ordinal).collect();
            ordinals.sort_unstable();

            DuplicateCluster {
                label: cluster_label(&texts, &stop_words),
                ordinals,
                document_ids,
            }
        })
        .collect()
}

/// Label a cluster from its top keywords, joined with " / ".
///
/// Texts made only of stop words are left out of the keyword pass; if none
/// remain, the first member's text stands in as the label.
fn cluster_label(texts: &[String], stop_words: &[String]) -> String {
    let stop_set: HashSet<&str> = stop_words.iter().map(String::as_str).collect();
    let content: Vec<String> = texts
        .iter()
        .filter(|text| tokenize(text).iter().any(|w| !stop_set.contains(w.as_str())))
        .cloned()
        .collect();

    let mut ranked: Vec<(String, f32)> = if content.is_empty() {
        Vec::new()
    } else {
        // No text holds more words than bytes, so this asks for every word
        let all_words: usize = content.iter().map(String::len).sum();
        let params = TfIdfParams::UnprocessedDocuments(&content, stop_words, None);
        TfIdf::new(params).get_ranked_word_scores(all_words)
    };

    // Ranking ties come back in hash order; break them alphabetically
    ranked.sort_by_cached_key(|(word, score)| (-(score * 1e4).round() as i64, word.clone()));
    ranked.truncate(LABEL_KEYWORDS);

    if ranked.is_empty() {
        return texts
            .first()
            .map(|t| truncate_chars(t, LABEL_FALLBACK_CHARS))
            .unwrap_or_default();
    }

    ranked
        .iter()
        .map(|(word, _)| word.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::Marker;

    fn question(ordinal: usize, text: &str, document_id: &str) -> Question {
        Question {
            text: text.to_string(),
            document_id: document_id.to_string(),
            ordinal,
            marker: Marker::Numbered((ordinal + 1).to_string()),
            sub_parts: Vec::new(),
        }
    }

    fn pair(a: &Question, b: &Question) -> SimilarityPair {
        SimilarityPair {
            question_a: a.clone(),
            question_b: b.clone(),
            score: 0.9,
        }
    }

    #[test]
    fn test_no_pairs_no_clusters() {
        let qs = vec![question(0, "Define work", "a")];
        assert!(find_clusters(&qs, &[]).is_empty());
    }

    #[test]
    fn test_transitive_grouping() {
        let qs = vec![
            question(0, "State Newton's first law of motion", "a"),
            question(1, "Define momentum", "a"),
            question(2, "State Newton's first law", "a"),
            question(3, "Newton's first law of motion explained", "b"),
        ];
        let pairs = vec![pair(&qs[0], &qs[2]), pair(&qs[2], &qs[3])];
        let clusters = find_clusters(&qs, &pairs);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].ordinals, vec![0, 2, 3]);
        assert_eq!(clusters[0].document_ids, vec!["a".to_string(), "b".to_string()]);
        assert!(!clusters[0].label.is_empty());
    }

    #[test]
    fn test_stop_word_only_label_falls_back() {
        let stop_words: Vec<String> = get(LANGUAGE::English);
        let texts = vec!["What is it?".to_string(), "What is it".to_string()];
        assert_eq!(cluster_label(&texts, &stop_words), "What is it?");
    }

    #[test]
    fn test_label_stable_across_runs() {
        let stop_words: Vec<String> = get(LANGUAGE::English);
        let texts = vec![
            "Question about topic 0".to_string(),
            "Question about topic 0 again".to_string(),
        ];
        let first = cluster_label(&texts, &stop_words);
        for _ in 0..20 {
            assert_eq!(cluster_label(&texts, &stop_words), first);
        }
    }

    #[test]
    fn test_clusters_ordered_by_first_member() {
        let qs = vec![
            question(0, "Define kinetic energy", "a"),
            question(1, "Define potential energy", "a"),
            question(2, "Define kinetic energy of a body", "a"),
            question(3, "Define potential energy of a body", "a"),
        ];
        let pairs = vec![pair(&qs[1], &qs[3]), pair(&qs[0], &qs[2])];
        let clusters = find_clusters(&qs, &pairs);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].ordinals, vec![0, 2]);
        assert_eq!(clusters[1].ordinals, vec![1, 3]);
    }

    #[test]
    fn test_union_find_merges_chains() {
        let mut forest = UnionFind::new(5);
        forest.union(3, 4);
        forest.union(1, 3);
        assert_eq!(forest.find(4), 1);
        assert_ne!(forest.find(0), forest.find(4));
    }
}
