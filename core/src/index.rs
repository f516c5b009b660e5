use crate::scorer::{idf, score_posting};
use crate::variant::{Bm25Params, Variant};
use crate::{DocId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// Immutable inverted index with the document statistics BM25 needs.
///
/// Built in one pass by [`InvertedIndex::build`]; there is no update path.
/// Reloading a corpus means building a new index and dropping the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    variant: Variant,
    params: Bm25Params,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    idf: Vec<f32>,
    postings: Vec<Vec<Posting>>, // per term, sorted by doc_id
    doc_lengths: Vec<u32>,
    avg_doc_len: f32,
}

impl InvertedIndex {
    pub fn build(docs: &[Vec<String>], variant: Variant, params: Bm25Params) -> Self {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut postings: Vec<Vec<Posting>> = Vec::new();
        let mut doc_lengths = Vec::with_capacity(docs.len());
        let mut total_len: u64 = 0;

        for (doc_id, terms) in docs.iter().enumerate() {
            let doc_id = doc_id as DocId;
            doc_lengths.push(terms.len() as u32);
            total_len += terms.len() as u64;

            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in terms {
                let next = dictionary.len() as TermId;
                let tid = *dictionary.entry(term.clone()).or_insert_with(|| {
                    postings.push(Vec::new());
                    next
                });
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            // doc ids are visited in ascending order, so each list stays sorted
            for (tid, tf) in tf_counts {
                postings[tid as usize].push(Posting { doc_id, tf });
            }
        }

        let n = docs.len() as f32;
        let df: Vec<u32> = postings.iter().map(|p| p.len() as u32).collect();
        let idf = df.iter().map(|&d| idf(variant.idf, n, d as f32)).collect();
        let avg_doc_len = if docs.is_empty() { 0.0 } else { total_len as f32 / n };

        tracing::debug!(docs = docs.len(), terms = dictionary.len(), %variant, "built inverted index");
        Self { variant, params, dictionary, df, idf, postings, doc_lengths, avg_doc_len }
    }

    pub fn num_docs(&self) -> usize { self.doc_lengths.len() }
    pub fn num_terms(&self) -> usize { self.dictionary.len() }
    pub fn is_empty(&self) -> bool { self.doc_lengths.is_empty() }
    pub fn variant(&self) -> Variant { self.variant }
    pub fn params(&self) -> &Bm25Params { &self.params }
    pub fn avg_doc_len(&self) -> f32 { self.avg_doc_len }

    pub fn doc_len(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(doc_id as usize).copied()
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    pub fn doc_freq(&self, term: &str) -> u32 {
        self.term_id(term).map_or(0, |t| self.df[t as usize])
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|t| self.idf[t as usize])
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        match self.term_id(term) {
            Some(t) => &self.postings[t as usize],
            None => &[],
        }
    }

    /// Score of one document. Unknown terms contribute nothing.
    pub fn score(&self, query_terms: &[String], doc_id: DocId) -> f32 {
        let Some(dl) = self.doc_len(doc_id) else { return 0.0 };
        let mut total = 0.0;
        for term in query_terms {
            let Some(tid) = self.term_id(term) else { continue };
            let plist = &self.postings[tid as usize];
            if let Ok(i) = plist.binary_search_by_key(&doc_id, |p| p.doc_id) {
                total += score_posting(self.variant, self.idf[tid as usize], plist[i].tf, dl, self.avg_doc_len, &self.params);
            }
        }
        total
    }

    /// Accumulate scores for every document sharing at least one term with the query.
    pub fn score_matching(&self, query_terms: &[String]) -> HashMap<DocId, f32> {
        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for term in query_terms {
            let Some(tid) = self.term_id(term) else { continue };
            let term_idf = self.idf[tid as usize];
            for p in &self.postings[tid as usize] {
                let dl = self.doc_lengths[p.doc_id as usize];
                *scores.entry(p.doc_id).or_insert(0.0) += score_posting(self.variant, term_idf, p.tf, dl, self.avg_doc_len, &self.params);
            }
        }
        scores
    }
}
