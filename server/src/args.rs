use anyhow::{Context, Result};
use clap::{Args, Parser};
use solver_core::SolverConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "solver-server", about = "HTTP API over a BM25 corpus")]
pub struct ServeArgs {
    /// Corpus file to serve at startup (.json, .jsonl, .txt)
    #[arg(long, env = "BM25_CORPUS")]
    pub corpus: Option<String>,
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

/// Solver settings. Flags win over `--config`, which wins over defaults.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// JSON file with solver settings
    #[arg(long, env = "BM25_CONFIG")]
    pub config: Option<PathBuf>,
    /// Language tag, e.g. en-us; only the prefix matters
    #[arg(long, env = "BM25_LANG")]
    pub lang: Option<String>,
    /// Drop results scoring below this
    #[arg(long, env = "BM25_MIN_CONF")]
    pub min_conf: Option<f32>,
    /// Keep every result regardless of score
    #[arg(long, conflicts_with = "min_conf")]
    pub no_min_conf: bool,
    /// Number of documents joined into an answer
    #[arg(long, env = "BM25_N_ANSWER")]
    pub n_answer: Option<usize>,
    /// robertson, lucene, bm25l, bm25+, atire, rank-bm25 or bm25-pt
    #[arg(long, env = "BM25_METHOD")]
    pub method: Option<String>,
    /// robertson, lucene, atire, bm25l or bm25+
    #[arg(long, env = "BM25_IDF_METHOD")]
    pub idf_method: Option<String>,
    #[arg(long, env = "BM25_K1")]
    pub k1: Option<f32>,
    #[arg(long, env = "BM25_B")]
    pub b: Option<f32>,
    #[arg(long, env = "BM25_DELTA")]
    pub delta: Option<f32>,
    /// Stem terms with the Snowball stemmer for the language
    #[arg(long, env = "BM25_STEM")]
    pub stem: bool,
    /// Keep terms unstemmed even if the config file enables stemming
    #[arg(long, conflicts_with = "stem")]
    pub no_stem: bool,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_json_file(path).with_context(|| format!("reading {}", path.display()))?,
            None => SolverConfig::default(),
        };
        if let Some(lang) = &self.lang { config.lang = lang.clone(); }
        if let Some(min_conf) = self.min_conf { config.min_conf = Some(min_conf); }
        if self.no_min_conf { config.min_conf = None; }
        if let Some(n) = self.n_answer { config.n_answer = n; }
        if self.method.is_some() { config.method = self.method.clone(); }
        if self.idf_method.is_some() { config.idf_method = self.idf_method.clone(); }
        if let Some(k1) = self.k1 { config.k1 = k1; }
        if let Some(b) = self.b { config.b = b; }
        if let Some(delta) = self.delta { config.delta = delta; }
        if self.stem { config.stem = true; }
        if self.no_stem { config.stem = false; }
        config.validate()?;
        Ok(config)
    }
}
