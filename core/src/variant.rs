//! Scoring variants: which term-weighting and IDF formulas an index uses.
//!
//! Variants are resolved once, from the free-text `method`/`idf_method`
//! configuration values, when a solver is constructed. Unknown strings never
//! fail; they fall back to defaults and log a warning.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Term-frequency saturation formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weighting {
    Robertson,
    Lucene,
    Bm25L,
    Bm25Plus,
    Atire,
}

/// Inverse document frequency formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdfMethod {
    Robertson,
    Lucene,
    Atire,
    Bm25L,
    Bm25Plus,
}

/// A `method` value as configured. `RankBm25` and `Bm25Pt` are aliases
/// for fixed (weighting, idf) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Weighting(Weighting),
    RankBm25,
    Bm25Pt,
}

pub const METHODS: &[&str] = &["robertson", "lucene", "bm25l", "bm25+", "atire", "rank-bm25", "bm25-pt"];
pub const IDF_METHODS: &[&str] = &["robertson", "lucene", "atire", "bm25l", "bm25+"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown method {:?}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Weighting {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "robertson" => Ok(Self::Robertson),
            "lucene" => Ok(Self::Lucene),
            "bm25l" => Ok(Self::Bm25L),
            "bm25+" => Ok(Self::Bm25Plus),
            "atire" => Ok(Self::Atire),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

impl FromStr for IdfMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "robertson" => Ok(Self::Robertson),
            "lucene" => Ok(Self::Lucene),
            "atire" => Ok(Self::Atire),
            "bm25l" => Ok(Self::Bm25L),
            "bm25+" => Ok(Self::Bm25Plus),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rank-bm25" => Ok(Self::RankBm25),
            "bm25-pt" => Ok(Self::Bm25Pt),
            other => other.parse().map(Self::Weighting),
        }
    }
}

impl Weighting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Robertson => "robertson",
            Self::Lucene => "lucene",
            Self::Bm25L => "bm25l",
            Self::Bm25Plus => "bm25+",
            Self::Atire => "atire",
        }
    }
}

impl IdfMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Robertson => "robertson",
            Self::Lucene => "lucene",
            Self::Atire => "atire",
            Self::Bm25L => "bm25l",
            Self::Bm25Plus => "bm25+",
        }
    }
}

/// Resolved (weighting, idf) pair, fixed for the lifetime of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub weighting: Weighting,
    pub idf: IdfMethod,
}

impl Default for Variant {
    fn default() -> Self {
        Self { weighting: Weighting::Lucene, idf: IdfMethod::Lucene }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.weighting.as_str(), self.idf.as_str())
    }
}

impl Method {
    /// Aliases ignore `idf`; a plain weighting without an idf uses lucene.
    pub fn resolve(self, idf: Option<IdfMethod>) -> Variant {
        match self {
            Method::RankBm25 => Variant { weighting: Weighting::Atire, idf: IdfMethod::Robertson },
            Method::Bm25Pt => Variant { weighting: Weighting::Atire, idf: IdfMethod::Lucene },
            Method::Weighting(weighting) => Variant { weighting, idf: idf.unwrap_or(IdfMethod::Lucene) },
        }
    }
}

impl Variant {
    pub fn new(weighting: Weighting, idf: IdfMethod) -> Self {
        Self { weighting, idf }
    }

    /// Resolve configuration strings into a variant.
    ///
    /// An unknown `method` behaves as if none was given. An unknown
    /// `idf_method` becomes lucene. Both cases log a warning.
    pub fn resolve(method: Option<&str>, idf_method: Option<&str>) -> Variant {
        let method = match method.map(str::parse::<Method>) {
            None => return Variant::default(),
            Some(Ok(m)) => m,
            Some(Err(e)) => {
                tracing::warn!(method = %e.0, valid = ?METHODS, "invalid method, using default variant");
                return Variant::default();
            }
        };
        if let Method::Weighting(_) = method {
            let idf = match idf_method.map(str::parse::<IdfMethod>) {
                None => None,
                Some(Ok(idf)) => Some(idf),
                Some(Err(e)) => {
                    tracing::warn!(idf_method = %e.0, valid = ?IDF_METHODS, "invalid idf method, using lucene");
                    Some(IdfMethod::Lucene)
                }
            };
            return method.resolve(idf);
        }
        method.resolve(None)
    }
}

/// Free parameters of the BM25 family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub delta: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, delta: 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_table() {
        assert_eq!(Variant::resolve(Some("rank-bm25"), None), Variant::new(Weighting::Atire, IdfMethod::Robertson));
        assert_eq!(Variant::resolve(Some("bm25-pt"), Some("bm25l")), Variant::new(Weighting::Atire, IdfMethod::Lucene));
        assert_eq!(Variant::resolve(Some("bm25l"), None), Variant::new(Weighting::Bm25L, IdfMethod::Lucene));
        assert_eq!(Variant::resolve(Some("robertson"), Some("atire")), Variant::new(Weighting::Robertson, IdfMethod::Atire));
        assert_eq!(Variant::resolve(None, Some("atire")), Variant::default());
    }

    #[test]
    fn unknown_values_fall_back() {
        assert_eq!(Variant::resolve(Some("okapi"), Some("atire")), Variant::default());
        assert_eq!(Variant::resolve(Some("bm25+"), Some("nope")), Variant::new(Weighting::Bm25Plus, IdfMethod::Lucene));
    }

    #[test]
    fn every_listed_name_parses() {
        for m in METHODS {
            assert!(m.parse::<Method>().is_ok(), "{m}");
        }
        for m in IDF_METHODS {
            assert!(m.parse::<IdfMethod>().is_ok(), "{m}");
        }
    }
}
