use domain_clusters::{
    clustering::{contingency_frame, cramers::crosstab, render_labels},
    data::store::EmbeddingSet,
};
use polars::prelude::{CsvWriter, SerWriter};

#[test]
fn rows_are_named_after_domains() {
    let mut set = EmbeddingSet::default();
    set.insert("Europarl", vec!["a".into(); 3], vec![vec![0.0]; 3]);
    set.insert("EMEA", vec!["b".into(); 2], vec![vec![1.0]; 2]);

    let table = crosstab(&[0, 0, 0, 1, 1], &[2, 2, 0, 0, 0]).unwrap();
    let mut frame = contingency_frame(&table, &set).unwrap();

    let mut csv = Vec::new();
    CsvWriter::new(&mut csv).finish(&mut frame).unwrap();
    let rendered = String::from_utf8(csv).unwrap();
    insta::assert_snapshot!(rendered.trim_end(), @r"
    domain,0,2
    Europarl,1,2
    EMEA,2,0
    ");
}

#[test]
fn labels_render_one_per_line() {
    assert_eq!(render_labels(&[3, 0, 1]), "3\n0\n1\n");
    assert_eq!(render_labels(&[]), "");
}
