use solver_core::{
    Bm25Params, CorpusSolver, IdfMethod, OptionReranker, QaCorpusSolver, Retriever, SolverConfig, Tokenizer, Variant,
    Weighting,
};

const CORPUS: [&str; 6] = [
    "rust is a systems programming language",
    "python is a scripting language loved by data scientists",
    "the rust compiler checks memory safety at compile time",
    "garbage collected languages trade memory for convenience",
    "systems programming needs predictable memory layouts",
    "cats sleep most of the day",
];

fn build(variant: Variant) -> Retriever {
    Retriever::build(CORPUS.iter().map(|s| s.to_string()).collect(), Tokenizer::default(), "en-us", variant, Bm25Params::default())
}

fn all_variants() -> Vec<Variant> {
    let weightings = [Weighting::Robertson, Weighting::Lucene, Weighting::Bm25L, Weighting::Bm25Plus, Weighting::Atire];
    let idfs = [IdfMethod::Robertson, IdfMethod::Lucene, IdfMethod::Atire, IdfMethod::Bm25L, IdfMethod::Bm25Plus];
    weightings.iter().flat_map(|&w| idfs.iter().map(move |&i| Variant::new(w, i))).collect()
}

#[test]
fn retrieval_is_deterministic() {
    let r = build(Variant::default());
    let first = r.retrieve("rust memory systems", None, 5);
    for _ in 0..10 {
        assert_eq!(r.retrieve("rust memory systems", None, 5), first);
    }
}

#[test]
fn results_are_sorted_bounded_and_non_negative() {
    for variant in all_variants() {
        let r = build(variant);
        for k in 1..=8 {
            let hits = r.retrieve("rust memory programming language", None, k);
            assert!(hits.len() <= k && hits.len() <= CORPUS.len(), "{variant}");
            for pair in hits.windows(2) {
                assert!(pair[0].score > pair[1].score || (pair[0].score == pair[1].score && pair[0].doc_id < pair[1].doc_id));
            }
            assert!(hits.iter().all(|h| h.score >= 0.0), "{variant}");
        }
    }
}

#[test]
fn aliases_match_explicit_variants() {
    let pairs = [
        ("rank-bm25", Variant::new(Weighting::Atire, IdfMethod::Robertson)),
        ("bm25-pt", Variant::new(Weighting::Atire, IdfMethod::Lucene)),
    ];
    for (alias, explicit) in pairs {
        let a = build(Variant::resolve(Some(alias), None)).retrieve("rust memory safety", None, 6);
        let b = build(explicit).retrieve("rust memory safety", None, 6);
        assert_eq!(a, b, "{alias}");

        let options = ["memory safety in rust", "python notebooks", "rust belt"];
        let ra = OptionReranker::new(SolverConfig { method: Some(alias.into()), ..Default::default() });
        let rb = OptionReranker::new(SolverConfig {
            method: Some(explicit.weighting.as_str().into()),
            idf_method: Some(explicit.idf.as_str().into()),
            ..Default::default()
        });
        assert_eq!(ra.rerank("rust memory", &options, None), rb.rerank("rust memory", &options, None));
    }
}

#[test]
fn raising_min_conf_only_removes_results() {
    let thresholds = [None, Some(0.0), Some(0.2), Some(0.5), Some(1.0), Some(3.0)];
    let mut previous: Option<Vec<u32>> = None;
    for min_conf in thresholds {
        let solver = CorpusSolver::new(SolverConfig { min_conf, ..Default::default() });
        solver.load_corpus(CORPUS);
        let ids: Vec<u32> = solver.retrieve_from_corpus("rust memory", None, 6).unwrap().iter().map(|h| h.doc_id).collect();
        if let Some(prev) = &previous {
            assert!(ids.iter().all(|id| prev.contains(id)), "{min_conf:?}");
        }
        previous = Some(ids);
    }
}

#[test]
fn empty_corpus_returns_nothing() {
    let solver = CorpusSolver::new(SolverConfig::default());
    solver.load_corpus(Vec::<String>::new());
    assert!(solver.query("anything at all", None, 3).unwrap().is_empty());
    assert!(solver.get_answer("anything at all", None).is_none());
}

#[test]
fn qa_results_are_always_answers() {
    let pairs = [
        ("how fast is light", "299,792 km/s"),
        ("how fast is sound", "343 m/s"),
        ("how tall is everest", "8,849 m"),
    ];
    let solver = QaCorpusSolver::new(SolverConfig { min_conf: None, ..Default::default() });
    solver.load_corpus(pairs);
    for hit in solver.retrieve_from_corpus("how fast does light travel", None, 3).unwrap() {
        let (question, answer) = pairs[hit.doc_id as usize];
        assert_eq!(hit.text, answer);
        assert_ne!(hit.text, question);
    }
}

#[test]
fn unknown_method_behaves_as_default() {
    let fallback = CorpusSolver::new(SolverConfig { method: Some("okapi".into()), ..Default::default() });
    let default = CorpusSolver::new(SolverConfig::default());
    assert_eq!(fallback.variant(), default.variant());
}
