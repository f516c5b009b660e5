//! Corpus-backed question solvers.
//!
//! Each solver publishes its loaded corpus as an `Arc` behind a lock. Loading
//! builds the replacement without holding the lock and then swaps the pointer,
//! so a query sees either the old corpus or the new one, never a mix.

use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::retriever::{Hit, Retriever};
use crate::tokenizer::Tokenizer;
use crate::variant::{Bm25Params, Variant};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Settings shared by every solver flavour, resolved once at construction.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
    pub(crate) config: SolverConfig,
    pub(crate) variant: Variant,
    pub(crate) params: Bm25Params,
    pub(crate) tokenizer: Tokenizer,
}

impl Engine {
    pub(crate) fn new(config: SolverConfig) -> Self {
        let variant = Variant::resolve(config.method.as_deref(), config.idf_method.as_deref());
        let params = config.params();
        let tokenizer = Tokenizer::new(config.stem);
        Self { config, variant, params, tokenizer }
    }

    pub(crate) fn index(&self, documents: Vec<String>, lang: Option<&str>) -> Retriever {
        let lang = lang.unwrap_or(&self.config.lang);
        Retriever::build(documents, self.tokenizer, lang, self.variant, self.params)
    }

    pub(crate) fn passes(&self, score: f32) -> bool {
        self.config.min_conf.map_or(true, |min| score >= min)
    }
}

fn join_answers<I: IntoIterator<Item = String>>(answers: I) -> Option<String> {
    let answers: Vec<String> = answers.into_iter().collect();
    if answers.is_empty() { None } else { Some(answers.join(". ")) }
}

pub struct CorpusSolver {
    engine: Engine,
    active: RwLock<Option<Arc<Retriever>>>,
}

impl CorpusSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { engine: Engine::new(config), active: RwLock::new(None) }
    }

    pub fn config(&self) -> &SolverConfig { &self.engine.config }
    pub fn variant(&self) -> Variant { self.engine.variant }

    /// Index `documents`, replacing any corpus loaded before.
    pub fn load_corpus<I, S>(&self, documents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let documents: Vec<String> = documents.into_iter().map(Into::into).collect();
        let retriever = self.engine.index(documents, None);
        tracing::debug!(docs = retriever.len(), "indexed corpus");
        self.install(retriever);
    }

    /// Publish an already built retriever, e.g. one restored from a snapshot.
    pub fn install(&self, retriever: Retriever) {
        *self.active.write() = Some(Arc::new(retriever));
    }

    /// The corpus currently serving queries. Stays valid across later reloads.
    pub fn snapshot(&self) -> Option<Arc<Retriever>> {
        self.active.read().clone()
    }

    pub fn is_loaded(&self) -> bool { self.active.read().is_some() }

    /// Raw top-`k` ranking with no confidence filtering.
    pub fn query(&self, query: &str, lang: Option<&str>, k: usize) -> Result<Vec<Hit>> {
        let retriever = self.snapshot().ok_or(SolverError::CorpusNotLoaded)?;
        let hits = retriever.retrieve(query, lang, k);
        for (rank, hit) in hits.iter().enumerate() {
            tracing::debug!(rank = rank + 1, score = hit.score, doc = %hit.text, "ranked");
        }
        Ok(hits)
    }

    /// Top-`k` hits scoring at least `min_conf`.
    pub fn retrieve_from_corpus(&self, query: &str, lang: Option<&str>, k: usize) -> Result<Vec<Hit>> {
        let hits = self.query(query, lang, k)?;
        Ok(hits.into_iter().filter(|h| self.engine.passes(h.score)).collect())
    }

    /// Up to `n_answer` surviving documents joined into one answer.
    pub fn get_answer(&self, query: &str, lang: Option<&str>) -> Option<String> {
        let hits = self.retrieve_from_corpus(query, lang, self.engine.config.n_answer()).ok()?;
        join_answers(hits.into_iter().map(|h| h.text))
    }
}

/// Questions are indexed; answers are stored by the same doc id and never indexed.
#[derive(Debug)]
pub struct QaCorpus {
    questions: Retriever,
    answers: Vec<String>,
}

impl QaCorpus {
    pub fn questions(&self) -> &Retriever { &self.questions }

    pub fn answer(&self, doc_id: crate::DocId) -> &str {
        &self.answers[doc_id as usize]
    }
}

pub struct QaCorpusSolver {
    engine: Engine,
    active: RwLock<Option<Arc<QaCorpus>>>,
}

impl QaCorpusSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { engine: Engine::new(config), active: RwLock::new(None) }
    }

    pub fn config(&self) -> &SolverConfig { &self.engine.config }

    /// Index the questions of `pairs`. A repeated question keeps its first
    /// position and its last answer.
    pub fn load_corpus<I, Q, A>(&self, pairs: I)
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: Into<String>,
    {
        let mut questions: Vec<String> = Vec::new();
        let mut answers: Vec<String> = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (q, a) in pairs {
            let (q, a) = (q.into(), a.into());
            match seen.get(&q) {
                Some(&i) => answers[i] = a,
                None => {
                    seen.insert(q.clone(), questions.len());
                    questions.push(q);
                    answers.push(a);
                }
            }
        }
        let corpus = QaCorpus { questions: self.engine.index(questions, None), answers };
        tracing::debug!(pairs = corpus.answers.len(), "indexed question-answer corpus");
        *self.active.write() = Some(Arc::new(corpus));
    }

    pub fn snapshot(&self) -> Option<Arc<QaCorpus>> {
        self.active.read().clone()
    }

    /// Hits whose `text` is the answer of the matched question.
    pub fn retrieve_from_corpus(&self, query: &str, lang: Option<&str>, k: usize) -> Result<Vec<Hit>> {
        let corpus = self.snapshot().ok_or(SolverError::CorpusNotLoaded)?;
        let hits = corpus
            .questions
            .retrieve(query, lang, k)
            .into_iter()
            .filter(|h| self.engine.passes(h.score))
            .map(|h| {
                tracing::debug!(score = h.score, question = %h.text, "closest question in corpus");
                Hit { doc_id: h.doc_id, text: corpus.answer(h.doc_id).to_string(), score: h.score }
            })
            .collect();
        Ok(hits)
    }

    pub fn get_answer(&self, query: &str, lang: Option<&str>) -> Option<String> {
        let hits = self.retrieve_from_corpus(query, lang, self.engine.config.n_answer()).ok()?;
        join_answers(hits.into_iter().map(|h| h.text))
    }
}
