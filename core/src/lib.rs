//! BM25 retrieval over small in-memory corpora, and the solvers built on it:
//! plain corpus answers, question/answer lookup, option reranking and
//! evidence sentence selection.

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod rerank;
pub mod retriever;
pub mod scorer;
pub mod snapshot;
pub mod solver;
pub mod tokenizer;
pub mod variant;

pub type TermId = u32;
pub type DocId = u32;

pub use config::SolverConfig;
pub use error::{Result, SolverError};
pub use index::{InvertedIndex, Posting};
pub use rerank::{EvidenceExtractor, OptionReranker, SentenceSplitter, UnicodeSentenceSplitter};
pub use retriever::{Hit, Retriever};
pub use solver::{CorpusSolver, QaCorpus, QaCorpusSolver};
pub use tokenizer::Tokenizer;
pub use variant::{Bm25Params, IdfMethod, Method, Variant, Weighting};
