use crate::config::SolverConfig;
use crate::solver::Engine;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Ranks a caller-supplied list of options against a query.
///
/// Every call indexes its own options from scratch; nothing is kept between
/// calls and `min_conf` is not applied.
#[derive(Debug, Clone)]
pub struct OptionReranker {
    engine: Engine,
}

impl OptionReranker {
    pub fn new(config: SolverConfig) -> Self {
        Self { engine: Engine::new(config) }
    }

    /// All unique options as `(score, option)`, best first. Options that are
    /// identical after trimming collapse onto their first occurrence.
    pub fn rerank<S: AsRef<str>>(&self, query: &str, options: &[S], lang: Option<&str>) -> Vec<(f32, String)> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = options
            .iter()
            .map(|o| o.as_ref().trim())
            .filter(|o| seen.insert(*o))
            .map(String::from)
            .collect();
        if unique.is_empty() {
            return Vec::new();
        }
        let k = unique.len();
        let retriever = self.engine.index(unique, lang);
        retriever
            .retrieve(query, lang, k)
            .into_iter()
            .map(|h| (h.score, h.text))
            .collect()
    }

    pub fn select_best<S: AsRef<str>>(&self, query: &str, options: &[S], lang: Option<&str>) -> Option<String> {
        self.rerank(query, options, lang).into_iter().next().map(|(_, option)| option)
    }
}

/// Splits a passage into sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// UAX #29 sentence boundaries, applied line by line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        text.lines()
            .flat_map(|line| line.unicode_sentences())
            .map(str::to_string)
            .collect()
    }
}

/// Picks the sentence of a passage that best answers a question.
pub struct EvidenceExtractor {
    reranker: OptionReranker,
    splitter: Box<dyn SentenceSplitter>,
}

impl EvidenceExtractor {
    pub fn new(config: SolverConfig) -> Self {
        Self::with_splitter(config, UnicodeSentenceSplitter)
    }

    pub fn with_splitter<S: SentenceSplitter + 'static>(config: SolverConfig, splitter: S) -> Self {
        Self { reranker: OptionReranker::new(config), splitter: Box::new(splitter) }
    }

    pub fn sentences(&self, evidence: &str) -> Vec<String> {
        self.splitter
            .split(evidence)
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn best_passage(&self, evidence: &str, question: &str, lang: Option<&str>) -> Option<String> {
        let sentences = self.sentences(evidence);
        if sentences.is_empty() {
            return None;
        }
        self.reranker.select_best(question, &sentences, lang)
    }
}
