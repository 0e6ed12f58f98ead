use domain_clusters::{
    data::store::EmbeddingSet,
    error::PipelineError,
    nlp::aggregate::compute_doc_reps,
};
use indexmap::IndexMap;
use proptest::prelude::*;

fn ids(domain: &str, values: &[&str]) -> IndexMap<String, Vec<String>> {
    let mut map = IndexMap::new();
    map.insert(
        domain.to_string(),
        values.iter().map(|v| v.to_string()).collect(),
    );
    map
}

#[test]
fn averages_sentences_in_first_seen_order() {
    let mut sentences = EmbeddingSet::default();
    sentences.insert(
        "EMEA",
        vec!["b".into(), "a".into(), "b".into()],
        vec![vec![1.0, 0.0], vec![5.0, 5.0], vec![3.0, 2.0]],
    );
    let docs = compute_doc_reps(&sentences, &ids("EMEA", &["b", "a", "b"])).unwrap();
    let emea = &docs.domains["EMEA"];
    assert_eq!(emea.ids, vec!["b", "a"]);
    assert_eq!(emea.vectors, vec![vec![2.0, 1.0], vec![5.0, 5.0]]);
}

#[test]
fn document_ids_are_scoped_per_domain() {
    let mut sentences = EmbeddingSet::default();
    sentences.insert("Europarl", vec!["d1".into()], vec![vec![1.0]]);
    sentences.insert("EMEA", vec!["d1".into()], vec![vec![9.0]]);
    let mut doc_ids = ids("Europarl", &["d1"]);
    doc_ids.insert("EMEA".into(), vec!["d1".into()]);

    let docs = compute_doc_reps(&sentences, &doc_ids).unwrap();
    assert_eq!(docs.domains["Europarl"].vectors, vec![vec![1.0]]);
    assert_eq!(docs.domains["EMEA"].vectors, vec![vec![9.0]]);
    assert_eq!(docs.len(), 2);
}

#[test]
fn misaligned_ids_are_rejected() {
    let mut sentences = EmbeddingSet::default();
    sentences.insert("EMEA", vec!["d1".into()], vec![vec![1.0]]);
    assert!(compute_doc_reps(&sentences, &ids("EMEA", &["d1", "d2"])).is_err());
    assert!(compute_doc_reps(&sentences, &ids("Europarl", &["d1"])).is_err());
}

#[test]
fn ragged_sentences_within_a_document_are_rejected() {
    let mut sentences = EmbeddingSet::default();
    sentences.insert(
        "EMEA",
        vec!["d1".into(), "d1".into()],
        vec![vec![1.0, 2.0], vec![1.0]],
    );
    let err = compute_doc_reps(&sentences, &ids("EMEA", &["d1", "d1"])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::DimensionMismatch { expected: 2, found: 1 })
    ));
}

#[test]
fn empty_domains_survive_aggregation() {
    let mut sentences = EmbeddingSet::default();
    sentences.insert("Europarl", Vec::new(), Vec::new());
    sentences.insert("EMEA", vec!["d1".into()], vec![vec![4.0]]);
    let mut doc_ids = ids("Europarl", &[]);
    doc_ids.insert("EMEA".into(), vec!["d1".into()]);

    let docs = compute_doc_reps(&sentences, &doc_ids).unwrap();
    assert_eq!(docs.domains.keys().collect::<Vec<_>>(), vec!["Europarl", "EMEA"]);
    assert!(docs.domains["Europarl"].is_empty());
}

proptest! {
    #[test]
    fn identical_sentences_average_to_themselves(
        vector in prop::collection::vec(-5.0f32..5.0, 1..6),
        copies in 1usize..6,
    ) {
        let mut sentences = EmbeddingSet::default();
        sentences.insert(
            "JRC-Acquis",
            vec!["doc".to_string(); copies],
            vec![vector.clone(); copies],
        );
        let doc_ids = ids("JRC-Acquis", &vec!["doc"; copies]);
        let docs = compute_doc_reps(&sentences, &doc_ids).unwrap();
        let pooled = &docs.domains["JRC-Acquis"].vectors[0];
        for (a, b) in pooled.iter().zip(&vector) {
            prop_assert!((a - b).abs() < 1e-4);
        }
    }
}
