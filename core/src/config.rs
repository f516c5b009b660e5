use crate::error::{Result, SolverError};
use crate::variant::Bm25Params;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn default_lang() -> String { "en-us".to_string() }
fn default_min_conf() -> Option<f32> { Some(0.0) }
fn default_n_answer() -> usize { 1 }
fn default_k1() -> f32 { 1.5 }
fn default_b() -> f32 { 0.75 }
fn default_delta() -> f32 { 0.5 }

/// Solver settings. Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// `xx-yy` tag; only the `xx` prefix affects tokenization.
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Results scoring below this are dropped. `None` keeps everything.
    #[serde(default = "default_min_conf")]
    pub min_conf: Option<f32>,
    #[serde(default = "default_n_answer")]
    pub n_answer: usize,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub idf_method: Option<String>,
    #[serde(default = "default_k1")]
    pub k1: f32,
    #[serde(default = "default_b")]
    pub b: f32,
    #[serde(default = "default_delta")]
    pub delta: f32,
    #[serde(default)]
    pub stem: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            min_conf: default_min_conf(),
            n_answer: default_n_answer(),
            method: None,
            idf_method: None,
            k1: default_k1(),
            b: default_b(),
            delta: default_delta(),
            stem: false,
        }
    }
}

impl SolverConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config: SolverConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.k1 >= 0.0) {
            return Err(SolverError::InvalidConfig(format!("k1 must be >= 0, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SolverError::InvalidConfig(format!("b must be in [0, 1], got {}", self.b)));
        }
        if !(self.delta >= 0.0) {
            return Err(SolverError::InvalidConfig(format!("delta must be >= 0, got {}", self.delta)));
        }
        Ok(())
    }

    pub fn params(&self) -> Bm25Params {
        Bm25Params { k1: self.k1, b: self.b, delta: self.delta }
    }

    pub fn n_answer(&self) -> usize { self.n_answer.max(1) }
}
