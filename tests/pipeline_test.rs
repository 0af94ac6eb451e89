use graphscape::{
    cluster, cross_tab, embed, encode, AnalysisConfig, AnalysisError, ClusterParams, ColorMap,
    CrossTab, EmbeddingParams, FeatureTable, Marker, MarkerMap, Pipeline, Row,
};

/// 6 graphs, A/B split 3/3, 4 features, group B offset by +10
fn offset_table() -> FeatureTable {
    let base = [
        [0.10, 0.20, 0.00, 0.30],
        [0.00, 0.10, 0.20, 0.10],
        [0.20, 0.00, 0.10, 0.20],
    ];
    let mut rows = Vec::new();
    for (i, features) in base.iter().enumerate() {
        rows.push(Row::new(format!("a{}", i), "A", features.to_vec()));
    }
    for (i, features) in base.iter().enumerate() {
        rows.push(Row::new(
            format!("b{}", i),
            "B",
            features.iter().map(|f| f + 10.0).collect(),
        ));
    }
    FeatureTable::from_rows(rows).unwrap()
}

fn embedding_params() -> EmbeddingParams {
    EmbeddingParams {
        perplexity: 1.5,
        learning_rate: 50.0,
        ..EmbeddingParams::default()
    }
}

/// Counts after relabeling clusters to maximize agreement with [A, B]
fn matched_counts(ct: &CrossTab) -> [[usize; 2]; 2] {
    let identity = ct.get("A", 0) + ct.get("B", 1);
    let swapped = ct.get("A", 1) + ct.get("B", 0);
    let (a, b) = if identity >= swapped { (0, 1) } else { (1, 0) };
    [
        [ct.get("A", a), ct.get("A", b)],
        [ct.get("B", a), ct.get("B", b)],
    ]
}

#[test]
fn test_offset_groups_recovered_by_stages() {
    let table = offset_table();
    let points = embed(&table, &embedding_params()).unwrap();
    assert_eq!(points.len(), 6);
    assert_eq!(
        points.iter().map(|p| p.graph_id.as_str()).collect::<Vec<_>>(),
        table.graph_ids()
    );

    let clustering = cluster(&points, &ClusterParams::default().with_k(2)).unwrap();
    let ct = cross_tab(&table.categories(), &clustering.assignments).unwrap();

    assert_eq!(ct.total(), 6);
    assert_eq!(matched_counts(&ct), [[3, 0], [0, 3]]);
}

#[test]
fn test_offset_groups_recovered_by_pipeline() {
    let mut config = AnalysisConfig::default();
    config.embedding = embedding_params();
    config.clustering.k = 2;

    let report = Pipeline::new(config).run(&offset_table()).unwrap();
    assert_eq!(matched_counts(&report.crosstab), [[3, 0], [0, 3]]);
    assert!((report.crosstab.purity() - 1.0).abs() < 1e-12);
    assert_eq!(report.inertia.as_ref().map(Vec::len), Some(6));
    assert!(report.html.contains(">Centroid</div>"));
}

#[test]
fn test_every_k_labels_in_range() {
    let table = offset_table();
    let points = embed(&table, &embedding_params()).unwrap();
    for k in 1..=table.len() {
        let clustering = cluster(&points, &ClusterParams::default().with_k(k)).unwrap();
        assert_eq!(clustering.assignments.len(), table.len());
        assert!(clustering.labels().iter().all(|&l| l < k));
    }
}

#[test]
fn test_missing_color_yields_no_records() {
    let table = offset_table();
    let points = embed(&table, &embedding_params()).unwrap();
    let clustering = cluster(&points, &ClusterParams::default().with_k(2)).unwrap();

    let mut colors = ColorMap::new();
    colors.insert("A", "#1f77b4");
    let result = encode(
        &points,
        &table.categories(),
        &clustering.assignments,
        &colors,
        &MarkerMap::default_for(2),
    );
    assert!(matches!(result, Err(AnalysisError::UnmappedCategory(c)) if c == "B"));
}

#[test]
fn test_short_marker_list_fails_at_encode() {
    let mut config = AnalysisConfig::default();
    config.embedding = embedding_params();
    config.clustering.k = 3;
    config.selection.enabled = false;
    config.encoding.markers = Some(vec![Marker::Circle, Marker::Square]);
    assert!(config.validate(6).is_ok());

    match Pipeline::new(config).run(&offset_table()) {
        Err(AnalysisError::UnmappedCluster(label)) => assert_eq!(label, 2),
        other => panic!("expected UnmappedCluster, got {:?}", other.map(|r| r.records.len())),
    }
}

#[test]
fn test_failed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("plot.html");

    let mut config = AnalysisConfig::default();
    config.embedding = embedding_params();
    config.clustering.k = 2;
    let mut colors = ColorMap::new();
    colors.insert("A", "#1f77b4");
    config.encoding.colors = Some(colors);

    let pipeline = Pipeline::new(config);
    let result = pipeline
        .run(&offset_table())
        .and_then(|report| report.write_html(&out));
    assert!(matches!(result, Err(AnalysisError::UnmappedCategory(_))));
    assert!(!out.exists());
}

#[test]
fn test_same_seed_same_report() {
    let mut config = AnalysisConfig::default();
    config.embedding = embedding_params();
    config.clustering.k = 2;
    config.selection.enabled = false;
    let pipeline = Pipeline::new(config);

    let first = pipeline.run(&offset_table()).unwrap();
    let second = pipeline.run(&offset_table()).unwrap();
    assert_eq!(first.records, second.records);
    assert_eq!(first.html, second.html);
}

#[test]
fn test_records_serialize_to_json() {
    let mut config = AnalysisConfig::default();
    config.embedding = embedding_params();
    config.clustering.k = 2;
    config.selection.enabled = false;
    let report = Pipeline::new(config).run(&offset_table()).unwrap();

    let json = serde_json::to_value(&report.records).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(6));
    assert_eq!(json[0]["graph_id"], "a0");
    assert_eq!(json[0]["category"], "A");
    assert!(json[0]["marker"].is_string());
}
