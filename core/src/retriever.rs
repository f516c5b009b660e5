use crate::index::InvertedIndex;
use crate::tokenizer::Tokenizer;
use crate::variant::{Bm25Params, Variant};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub doc_id: DocId,
    pub text: String,
    pub score: f32,
}

/// Descending score, then ascending doc id.
fn rank_order(a: &(DocId, f32), b: &(DocId, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Top `k` documents for already tokenized query terms.
///
/// Only positive scores are ranked. Every document scoring 0, whether it shares
/// no term with the query or only terms with zero idf, is a single tie class
/// used to fill the result in ascending id order.
pub fn top_k(index: &InvertedIndex, query_terms: &[String], k: usize) -> Vec<(DocId, f32)> {
    let k = k.min(index.num_docs());
    if k == 0 {
        return Vec::new();
    }
    let mut ranked: Vec<(DocId, f32)> = index
        .score_matching(query_terms)
        .into_iter()
        .filter(|&(_, s)| s > 0.0)
        .collect();
    if ranked.len() > k {
        ranked.select_nth_unstable_by(k - 1, rank_order);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(rank_order);
    if ranked.len() < k {
        let positive: HashSet<DocId> = ranked.iter().map(|&(d, _)| d).collect();
        let padding = (0..index.num_docs() as DocId)
            .filter(|d| !positive.contains(d))
            .take(k - ranked.len())
            .map(|d| (d, 0.0));
        ranked.extend(padding);
    }
    ranked
}

/// A corpus bound to the index built over it.
///
/// Holds everything a query needs, so a solver can publish it behind an `Arc`
/// and swap it for a fresh one on reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retriever {
    documents: Vec<String>,
    index: InvertedIndex,
    tokenizer: Tokenizer,
    lang: String,
}

impl Retriever {
    pub fn build(documents: Vec<String>, tokenizer: Tokenizer, lang: &str, variant: Variant, params: Bm25Params) -> Self {
        let tokens = tokenizer.tokenize_many(&documents, lang);
        let index = InvertedIndex::build(&tokens, variant, params);
        Self { documents, index, tokenizer, lang: lang.to_string() }
    }

    pub fn documents(&self) -> &[String] { &self.documents }
    pub fn index(&self) -> &InvertedIndex { &self.index }
    pub fn tokenizer(&self) -> Tokenizer { self.tokenizer }
    pub fn lang(&self) -> &str { &self.lang }
    pub fn len(&self) -> usize { self.documents.len() }
    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    /// Rank the corpus against `query`. `lang` overrides the indexing language for
    /// query tokenization.
    pub fn retrieve(&self, query: &str, lang: Option<&str>, k: usize) -> Vec<Hit> {
        let terms = self.tokenizer.tokenize(query, lang.unwrap_or(&self.lang));
        top_k(&self.index, &terms, k)
            .into_iter()
            .map(|(doc_id, score)| Hit { doc_id, text: self.documents[doc_id as usize].clone(), score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retriever(docs: &[&str]) -> Retriever {
        Retriever::build(docs.iter().map(|s| s.to_string()).collect(), Tokenizer::default(), "en-us", Variant::default(), Bm25Params::default())
    }

    #[test]
    fn ties_resolve_by_id() {
        let r = retriever(&["blue whale", "red fox", "blue whale", "blue whale"]);
        let ids: Vec<DocId> = r.retrieve("blue whale", None, 3).iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 2, 3]);
    }

    #[test]
    fn pads_with_unmatched_docs_in_id_order() {
        let r = retriever(&["alpha", "beta", "gamma", "delta"]);
        let hits = r.retrieve("gamma", None, 3);
        let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![2, 0, 1]);
        assert!(hits[0].score > 0.0);
        assert_eq!(hits[1].score, 0.0);
    }

    #[test]
    fn empty_query_returns_zero_scores_in_order() {
        let r = retriever(&["alpha", "beta", "gamma"]);
        let hits = r.retrieve("the of and", None, 10);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.score == 0.0));
        assert_eq!(hits.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn k_bounds() {
        let r = retriever(&["one two", "two three", "three four", "four five"]);
        assert_eq!(r.retrieve("two three four", None, 2).len(), 2);
        assert_eq!(r.retrieve("two", None, 100).len(), 4);
        assert!(r.retrieve("two", None, 0).is_empty());
    }

    #[test]
    fn zero_scores_tie_by_id_whether_matched_or_not() {
        // robertson idf clamps "xx" (df 3 of 4) to 0, so all four documents score 0
        let docs: Vec<String> = ["yy", "xx", "xx", "xx"].iter().map(|s| s.to_string()).collect();
        let variant = Variant::resolve(Some("rank-bm25"), None);
        let r = Retriever::build(docs, Tokenizer::default(), "en-us", variant, Bm25Params::default());
        let hits: Vec<(DocId, f32)> = r.retrieve("xx", None, 2).iter().map(|h| (h.doc_id, h.score)).collect();
        assert_eq!(hits, vec![(0, 0.0), (1, 0.0)]);
    }

    #[test]
    fn positive_scores_precede_zero_tie_class() {
        // "xx" clamps to 0 while "zz" keeps a positive idf
        let docs: Vec<String> = ["yy", "xx", "xx", "xx zz", "xx"].iter().map(|s| s.to_string()).collect();
        let variant = Variant::resolve(Some("rank-bm25"), None);
        let r = Retriever::build(docs, Tokenizer::default(), "en-us", variant, Bm25Params::default());
        let hits = r.retrieve("xx zz", None, 3);
        let ids: Vec<DocId> = hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![3, 0, 1]);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn query_language_override_changes_stopwords() {
        let r = retriever(&["the the the", "cat"]);
        // indexed as english, so "the" never made it into the vocabulary
        let hits = r.retrieve("the", Some("pt-pt"), 1);
        assert_eq!(hits[0].score, 0.0);
    }
}
