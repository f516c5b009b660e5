//! Corpus files: `.json`, `.jsonl` and plain `.txt`.

use crate::error::{Result, SolverError};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct QaRecord {
    question: String,
    answer: String,
}

enum Format {
    Json,
    Jsonl,
    Text,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("jsonl") | Some("ndjson") => Ok(Format::Jsonl),
        Some("txt") => Ok(Format::Text),
        _ => Err(SolverError::UnsupportedFormat(path.display().to_string())),
    }
}

/// A document is either a bare string or an object with a `text` (or `body`) field.
fn document_from_value(v: Value) -> Result<String> {
    match v {
        Value::String(s) => Ok(s),
        Value::Object(mut map) => match map.remove("text").or_else(|| map.remove("body")) {
            Some(Value::String(s)) => Ok(s),
            _ => Err(SolverError::UnsupportedFormat("document object without a text field".into())),
        },
        other => Err(SolverError::UnsupportedFormat(format!("unexpected document value: {other}"))),
    }
}

fn non_empty_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        lines.push(line);
    }
    Ok(lines)
}

pub fn load_documents<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let docs = match format_of(path)? {
        Format::Text => non_empty_lines(path)?.into_iter().map(|l| l.trim().to_string()).collect(),
        Format::Jsonl => non_empty_lines(path)?
            .into_iter()
            .map(|l| document_from_value(serde_json::from_str(&l)?))
            .collect::<Result<Vec<_>>>()?,
        Format::Json => {
            let json: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            match json {
                Value::Array(arr) => arr.into_iter().map(document_from_value).collect::<Result<Vec<_>>>()?,
                other => vec![document_from_value(other)?],
            }
        }
    };
    tracing::info!(path = %path.display(), docs = docs.len(), "loaded documents");
    Ok(docs)
}

/// Question/answer pairs: records with `question` and `answer`, or a single
/// JSON object mapping questions to answers.
pub fn load_qa_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let pairs = match format_of(path)? {
        Format::Text => return Err(SolverError::UnsupportedFormat(format!("{} (qa corpora must be json or jsonl)", path.display()))),
        Format::Jsonl => non_empty_lines(path)?
            .into_iter()
            .map(|l| serde_json::from_str::<QaRecord>(&l).map(|r| (r.question, r.answer)).map_err(SolverError::from))
            .collect::<Result<Vec<_>>>()?,
        Format::Json => {
            let json: Value = serde_json::from_reader(BufReader::new(File::open(path)?))?;
            match json {
                Value::Object(map) if !map.contains_key("question") => map
                    .into_iter()
                    .map(|(q, a)| match a {
                        Value::String(a) => Ok((q, a)),
                        other => Err(SolverError::UnsupportedFormat(format!("answer for {q:?} is not a string: {other}"))),
                    })
                    .collect::<Result<Vec<_>>>()?,
                Value::Array(arr) => arr
                    .into_iter()
                    .map(|v| serde_json::from_value::<QaRecord>(v).map(|r| (r.question, r.answer)).map_err(SolverError::from))
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    let r: QaRecord = serde_json::from_value(other)?;
                    vec![(r.question, r.answer)]
                }
            }
        }
    };
    tracing::info!(path = %path.display(), pairs = pairs.len(), "loaded question-answer pairs");
    Ok(pairs)
}
