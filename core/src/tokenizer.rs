use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\b\w\w+\b").expect("valid regex");
    static ref STOPWORDS_EN: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","an","and","are","as","at","be","but","by","for","if","in","into","is","it",
            "no","not","of","on","or","such","that","the","their","then","there","these",
            "they","this","to","was","will","with",
        ];
        words.iter().copied().collect()
    };
}

/// Primary subtag of a `xx-yy` language tag, lowercased.
pub fn lang_prefix(lang: &str) -> String {
    lang.split(['-', '_']).next().unwrap_or("").trim().to_lowercase()
}

/// Stopwords apply to English only. Every other language keeps all of its tokens.
fn stopwords_for(lang: &str) -> Option<&'static HashSet<&'static str>> {
    if lang_prefix(lang) == "en" { Some(&*STOPWORDS_EN) } else { None }
}

fn stemmer_for(lang: &str) -> Option<Stemmer> {
    let algorithm = match lang_prefix(lang).as_str() {
        "ar" => Algorithm::Arabic,
        "da" => Algorithm::Danish,
        "nl" => Algorithm::Dutch,
        "en" => Algorithm::English,
        "fi" => Algorithm::Finnish,
        "fr" => Algorithm::French,
        "de" => Algorithm::German,
        "el" => Algorithm::Greek,
        "hu" => Algorithm::Hungarian,
        "it" => Algorithm::Italian,
        "no" | "nb" | "nn" => Algorithm::Norwegian,
        "pt" => Algorithm::Portuguese,
        "ro" => Algorithm::Romanian,
        "ru" => Algorithm::Russian,
        "es" => Algorithm::Spanish,
        "sv" => Algorithm::Swedish,
        "ta" => Algorithm::Tamil,
        "tr" => Algorithm::Turkish,
        _ => return None,
    };
    Some(Stemmer::create(algorithm))
}

/// Text to term sequence: NFKC normalization, lowercasing, `\w\w+` extraction,
/// English stopword removal and optional Snowball stemming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenizer {
    pub stem: bool,
}

impl Tokenizer {
    pub fn new(stem: bool) -> Self { Self { stem } }

    pub fn tokenize(&self, text: &str, lang: &str) -> Vec<String> {
        let stopwords = stopwords_for(lang);
        let stemmer = if self.stem { stemmer_for(lang) } else { None };
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut terms = Vec::new();
        for mat in RE.find_iter(&normalized) {
            let token = mat.as_str();
            if stopwords.is_some_and(|s| s.contains(token)) { continue; }
            let term = match &stemmer {
                Some(st) => st.stem(token).into_owned(),
                None => token.to_string(),
            };
            terms.push(term);
        }
        terms
    }

    pub fn tokenize_many<S: AsRef<str>>(&self, texts: &[S], lang: &str) -> Vec<Vec<String>> {
        texts.iter().map(|t| self.tokenize(t.as_ref(), lang)).collect()
    }
}
