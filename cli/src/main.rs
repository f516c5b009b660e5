use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use solver_core::corpus::{load_documents, load_qa_pairs};
use solver_core::snapshot::{self, SnapshotPaths};
use solver_core::{CorpusSolver, EvidenceExtractor, Hit, OptionReranker, QaCorpusSolver, SolverConfig};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bm25")]
#[command(about = "Answer questions from a text corpus with BM25 ranking", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Solver settings. Flags win over `--config`, which wins over defaults.
#[derive(Args)]
struct ConfigArgs {
    /// JSON file with solver settings
    #[arg(long, global = true, env = "BM25_CONFIG")]
    config: Option<PathBuf>,
    /// Language tag, e.g. en-us; only the prefix matters
    #[arg(long, global = true, env = "BM25_LANG")]
    lang: Option<String>,
    /// Drop results scoring below this
    #[arg(long, global = true, env = "BM25_MIN_CONF")]
    min_conf: Option<f32>,
    /// Keep every result regardless of score
    #[arg(long, global = true, conflicts_with = "min_conf")]
    no_min_conf: bool,
    /// Number of documents joined into an answer
    #[arg(long, global = true, env = "BM25_N_ANSWER")]
    n_answer: Option<usize>,
    /// robertson, lucene, bm25l, bm25+, atire, rank-bm25 or bm25-pt
    #[arg(long, global = true, env = "BM25_METHOD")]
    method: Option<String>,
    /// robertson, lucene, atire, bm25l or bm25+
    #[arg(long, global = true, env = "BM25_IDF_METHOD")]
    idf_method: Option<String>,
    #[arg(long, global = true, env = "BM25_K1")]
    k1: Option<f32>,
    #[arg(long, global = true, env = "BM25_B")]
    b: Option<f32>,
    #[arg(long, global = true, env = "BM25_DELTA")]
    delta: Option<f32>,
    /// Stem terms with the Snowball stemmer for the language
    #[arg(long, global = true, env = "BM25_STEM")]
    stem: bool,
    /// Keep terms unstemmed even if the config file enables stemming
    #[arg(long, global = true, conflicts_with = "stem")]
    no_stem: bool,
}

impl ConfigArgs {
    fn resolve(&self) -> Result<SolverConfig> {
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

#[derive(Args)]
struct Source {
    /// Corpus file (.json, .jsonl, .txt) or a directory of them
    #[arg(long, conflicts_with = "snapshot", required_unless_present = "snapshot")]
    corpus: Option<String>,
    /// Snapshot directory written by `build`
    #[arg(long)]
    snapshot: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus and write a snapshot
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output snapshot directory
        #[arg(long)]
        output: String,
    },
    /// Rank corpus documents against a query
    Query {
        #[command(flatten)]
        source: Source,
        /// Query text
        #[arg(short, long)]
        query: String,
        #[arg(short, default_value_t = 3)]
        k: usize,
        /// Apply min_conf to the ranking
        #[arg(long)]
        filter: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Answer a question from a document or question/answer corpus
    Answer {
        #[command(flatten)]
        source: Source,
        /// Treat the corpus as question/answer pairs
        #[arg(long)]
        qa: bool,
        #[arg(short, long)]
        query: String,
    },
    /// Rank a list of candidate answers against a query
    Rerank {
        #[arg(short, long)]
        query: String,
        /// Candidate answers
        #[arg(required = true)]
        options: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Pick the sentence of a passage that best answers a question
    Evidence {
        #[arg(short, long)]
        question: String,
        /// File holding the passage
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct RankedOption<'a> {
    score: f32,
    option: &'a str,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = cli.config.resolve()?;

    match cli.command {
        Commands::Build { input, output } => build_snapshot(config, &input, &output),
        Commands::Query { source, query, k, filter, json } => {
            let solver = open_corpus(config, &source)?;
            let hits = if filter {
                solver.retrieve_from_corpus(&query, None, k)?
            } else {
                solver.query(&query, None, k)?
            };
            print_hits(&hits, json)
        }
        Commands::Answer { source, qa, query } => {
            let answer = if qa {
                let Some(path) = &source.corpus else { bail!("--qa needs --corpus") };
                let solver = QaCorpusSolver::new(config);
                solver.load_corpus(load_qa_pairs(path)?);
                solver.get_answer(&query, None)
            } else {
                open_corpus(config, &source)?.get_answer(&query, None)
            };
            match answer {
                Some(a) => println!("{a}"),
                None => tracing::info!("no answer"),
            }
            Ok(())
        }
        Commands::Rerank { query, options, json } => {
            let ranked = OptionReranker::new(config).rerank(&query, &options, None);
            if json {
                let out: Vec<RankedOption> = ranked.iter().map(|(score, option)| RankedOption { score: *score, option }).collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (score, option) in &ranked {
                    println!("{score:>8.4}  {option}");
                }
            }
            Ok(())
        }
        Commands::Evidence { question, file } => {
            let passage = fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
            if let Some(best) = EvidenceExtractor::new(config).best_passage(&passage, &question, None) {
                println!("{best}");
            }
            Ok(())
        }
    }
}

fn collect_documents(input: &str) -> Result<Vec<String>> {
    let input_path = Path::new(input);
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl" | "txt") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("{input} does not exist");
    }

    let mut docs = Vec::new();
    for file in files {
        docs.extend(load_documents(&file)?);
    }
    Ok(docs)
}

fn open_corpus(config: SolverConfig, source: &Source) -> Result<CorpusSolver> {
    let solver = CorpusSolver::new(config);
    match (&source.corpus, &source.snapshot) {
        (Some(path), _) => solver.load_corpus(collect_documents(path)?),
        (None, Some(dir)) => {
            let (retriever, meta) = snapshot::load(&SnapshotPaths::new(dir))?;
            tracing::info!(docs = meta.num_docs, variant = %meta.variant, created_at = %meta.created_at, "restored snapshot");
            solver.install(retriever);
        }
        (None, None) => bail!("either --corpus or --snapshot is required"),
    }
    Ok(solver)
}

fn build_snapshot(config: SolverConfig, input: &str, output: &str) -> Result<()> {
    let docs = collect_documents(input)?;
    let solver = CorpusSolver::new(config);
    solver.load_corpus(docs);
    let Some(retriever) = solver.snapshot() else { bail!("corpus failed to load") };
    let meta = snapshot::save(&SnapshotPaths::new(output), &retriever)?;
    tracing::info!(output, docs = meta.num_docs, terms = meta.num_terms, variant = %meta.variant, "snapshot build complete");
    Ok(())
}

fn print_hits(hits: &[Hit], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hits)?);
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>3}. [{:>8.4}] ({}) {}", rank + 1, hit.score, hit.doc_id, hit.text);
    }
    Ok(())
}
