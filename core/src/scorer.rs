//! BM25-family formulas.
//!
//! `idf` is evaluated once per term when an index is built; `term_weight` is
//! evaluated per posting at query time. Both are non-negative for every
//! variant as long as `1 <= df <= n`.

use crate::variant::{Bm25Params, IdfMethod, Variant, Weighting};

pub fn idf(method: IdfMethod, n: f32, df: f32) -> f32 {
    match method {
        // Clamped so that terms present in over half the corpus do not go negative.
        IdfMethod::Robertson => ((n - df + 0.5) / (df + 0.5)).max(1.0).ln(),
        IdfMethod::Lucene => (1.0 + (n - df + 0.5) / (df + 0.5)).ln(),
        IdfMethod::Atire => (n / df).ln(),
        IdfMethod::Bm25L => ((n + 1.0) / (df + 0.5)).ln(),
        IdfMethod::Bm25Plus => ((n + 1.0) / df).ln(),
    }
}

pub fn term_weight(weighting: Weighting, tf: f32, dl: f32, avgdl: f32, p: &Bm25Params) -> f32 {
    let norm = 1.0 - p.b + p.b * dl / avgdl;
    match weighting {
        Weighting::Robertson | Weighting::Lucene => tf / (p.k1 * norm + tf),
        Weighting::Atire => tf * (p.k1 + 1.0) / (tf + p.k1 * norm),
        Weighting::Bm25L => {
            let c = tf / norm;
            (p.k1 + 1.0) * (c + p.delta) / (p.k1 + c + p.delta)
        }
        Weighting::Bm25Plus => (p.k1 + 1.0) * tf / (p.k1 * norm + tf) + p.delta,
    }
}

/// Contribution of one (term, document) posting.
pub fn score_posting(variant: Variant, idf: f32, tf: u32, dl: u32, avgdl: f32, p: &Bm25Params) -> f32 {
    idf * term_weight(variant.weighting, tf as f32, dl as f32, avgdl, p)
}
