//! On-disk snapshots of a built retriever.
//!
//! The core has no persistence of its own; this is the format the command
//! line tool uses so large corpora are tokenized and indexed once.

use crate::error::{Result, SolverError};
use crate::retriever::Retriever;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: usize,
    pub num_terms: usize,
    pub variant: String,
    pub lang: String,
    pub stem: bool,
    pub created_at: String,
    pub version: u32,
}

pub struct SnapshotPaths {
    pub root: PathBuf,
}

impl SnapshotPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn retriever(&self) -> PathBuf { self.root.join("retriever.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save(paths: &SnapshotPaths, retriever: &Retriever) -> Result<MetaFile> {
    create_dir_all(&paths.root)?;
    let mut f = BufWriter::new(File::create(paths.retriever())?);
    bincode::serialize_into(&mut f, retriever)?;
    f.flush()?;

    let meta = MetaFile {
        num_docs: retriever.len(),
        num_terms: retriever.index().num_terms(),
        variant: retriever.index().variant().to_string(),
        lang: retriever.lang().to_string(),
        stem: retriever.tokenizer().stem,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: SNAPSHOT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), docs = meta.num_docs, "snapshot saved");
    Ok(meta)
}

pub fn save_meta(paths: &SnapshotPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &SnapshotPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn load(paths: &SnapshotPaths) -> Result<(Retriever, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        return Err(SolverError::InvalidConfig(format!(
            "snapshot version {} is not supported (expected {SNAPSHOT_VERSION})",
            meta.version
        )));
    }
    let f = BufReader::new(File::open(paths.retriever())?);
    let retriever: Retriever = bincode::deserialize_from(f)?;
    Ok((retriever, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use crate::variant::{Bm25Params, Variant};
    use tempfile::tempdir;

    #[test]
    fn restores_identical_rankings() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::new(dir.path().join("snap"));
        let docs = vec!["rust is fast".to_string(), "python is slow".to_string(), "rust and python".to_string()];
        let original = Retriever::build(docs, Tokenizer::new(true), "en-us", Variant::resolve(Some("bm25+"), None), Bm25Params::default());
        let meta = save(&paths, &original).unwrap();
        assert_eq!(meta.variant, "bm25+/lucene");

        let (restored, meta) = load(&paths).unwrap();
        assert_eq!(meta.num_docs, 3);
        assert!(meta.stem);
        assert_eq!(restored.retrieve("rust", None, 3), original.retrieve("rust", None, 3));
    }
}
