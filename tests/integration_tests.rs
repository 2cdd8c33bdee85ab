use kmeanslab::{
    elbow_curve, evaluate, knee, make_blobs, silhouette_score, EmptyClusterPolicy, Error,
    InitMethod, KMeans, LabelMapping, PerformancePage,
};
use ndarray::{arr1, arr2, Array2};
use std::collections::HashSet;

fn two_blobs() -> Array2<f64> {
    arr2(&[[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]])
}

#[test]
fn test_kmeans_blob_data() {
    let blobs = make_blobs(150, 3, 2, 0.5, 7).unwrap();

    let kmeans = KMeans::new(3).random_state(42).n_init(5).max_iter(100);
    let result = kmeans.fit(blobs.features.view()).unwrap();

    // Check basic properties
    assert_eq!(result.labels.len(), 150);
    assert_eq!(result.centroids.nrows(), 3);
    assert_eq!(result.centroids.ncols(), 2);
    assert!(result.converged);
    assert!(result.inertia >= 0.0);

    let unique_labels: HashSet<_> = result.labels.iter().collect();
    assert_eq!(unique_labels.len(), 3);
}

#[test]
fn test_two_blobs_centers_and_scores() {
    let data = two_blobs();

    for init in [InitMethod::Random, InitMethod::KMeansPlusPlus] {
        let result = KMeans::new(2)
            .init_method(init)
            .random_state(0)
            .fit(data.view())
            .unwrap();

        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[2], result.labels[3]);
        assert_ne!(result.labels[0], result.labels[2]);

        let low = result.centroids.row(result.labels[0]);
        let high = result.centroids.row(result.labels[2]);
        assert!((low[0] - 0.0).abs() < 1e-12 && (low[1] - 0.5).abs() < 1e-12);
        assert!((high[0] - 10.0).abs() < 1e-12 && (high[1] - 10.5).abs() < 1e-12);

        let eval = evaluate(data.view(), result.centroids.view(), result.labels.view()).unwrap();
        assert!((eval.wcss - 1.0).abs() < 1e-12);
        assert!(eval.silhouette > 0.9);
    }
}

#[test]
fn test_one_cluster_per_point() {
    let data = arr2(&[[0.0, 0.0], [3.0, 0.0], [0.0, 4.0]]);

    let result = KMeans::new(3).random_state(1).fit(data.view()).unwrap();

    let unique_labels: HashSet<_> = result.labels.iter().collect();
    assert_eq!(unique_labels.len(), 3);
    assert_eq!(result.inertia, 0.0);

    let err = silhouette_score(data.view(), result.labels.view()).unwrap_err();
    assert!(matches!(err, Error::DegenerateClusters { .. }));
}

#[test]
fn test_single_cluster_silhouette_is_degenerate() {
    let data = two_blobs();
    let result = KMeans::new(1).random_state(3).fit(data.view()).unwrap();

    assert!(result.labels.iter().all(|&l| l == 0));
    assert!(silhouette_score(data.view(), result.labels.view()).is_err());
}

#[test]
fn test_invalid_inputs() {
    let data = two_blobs();

    assert!(KMeans::new(0).fit(data.view()).is_err());
    assert!(KMeans::new(5).fit(data.view()).is_err());
    assert!(KMeans::new(2).max_iter(0).fit(data.view()).is_err());
    assert!(KMeans::new(2).n_init(0).fit(data.view()).is_err());
    assert!(KMeans::new(2).tolerance(-1.0).fit(data.view()).is_err());

    let empty = Array2::<f64>::zeros((0, 2));
    assert!(KMeans::new(1).fit(empty.view()).is_err());

    let with_nan = arr2(&[[0.0, f64::NAN], [1.0, 1.0]]);
    assert!(KMeans::new(1).fit(with_nan.view()).is_err());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let blobs = make_blobs(80, 4, 3, 1.0, 9).unwrap();
    let model = KMeans::new(4).random_state(123).n_init(4);

    let a = model.fit(blobs.features.view()).unwrap();
    let b = model.fit(blobs.features.view()).unwrap();

    assert_eq!(a.labels, b.labels);
    assert_eq!(a.centroids, b.centroids);
    assert_eq!(a.inertia, b.inertia);
}

#[test]
fn test_serial_and_parallel_restarts_agree() {
    let blobs = make_blobs(60, 3, 2, 1.5, 5).unwrap();

    let serial = KMeans::new(3)
        .random_state(8)
        .n_init(6)
        .n_jobs(1)
        .fit(blobs.features.view())
        .unwrap();
    let parallel = KMeans::new(3)
        .random_state(8)
        .n_init(6)
        .fit(blobs.features.view())
        .unwrap();

    assert_eq!(serial.inertia, parallel.inertia);
    assert_eq!(serial.labels, parallel.labels);
}

#[test]
fn test_empty_cluster_policies_on_duplicates() {
    // Random init may pick two identical rows, leaving one center without points
    let data = arr2(&[[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [5.0, 5.0]]);

    for policy in [EmptyClusterPolicy::KeepPrevious, EmptyClusterPolicy::Reseed] {
        let result = KMeans::new(2)
            .init_method(InitMethod::Random)
            .random_state(0)
            .n_init(1)
            .empty_cluster(policy)
            .fit(data.view())
            .unwrap();
        assert_eq!(result.centroids.nrows(), 2);
        assert_eq!(result.labels.len(), 5);
    }
}

#[test]
fn test_metrics_are_idempotent() {
    let blobs = make_blobs(50, 2, 2, 1.0, 21).unwrap();
    let result = KMeans::new(2).random_state(2).fit(blobs.features.view()).unwrap();

    let first = evaluate(
        blobs.features.view(),
        result.centroids.view(),
        result.labels.view(),
    )
    .unwrap();
    let second = evaluate(
        blobs.features.view(),
        result.centroids.view(),
        result.labels.view(),
    )
    .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fixed_mapping_is_constant() {
    let mapping = LabelMapping::mushrooms();
    for _ in 0..3 {
        assert_eq!(mapping.label(0).unwrap(), "edible");
        assert_eq!(mapping.label(1).unwrap(), "poisonous");
    }
    let names = mapping.apply(arr1(&[0, 1, 1, 0]).view()).unwrap();
    assert_eq!(names, ["edible", "poisonous", "poisonous", "edible"]);
}

#[test]
fn test_performance_page_on_blobs() {
    let blobs = make_blobs(200, 4, 2, 0.8, 42).unwrap();

    let report = PerformancePage::new(4)
        .seed(42)
        .run(blobs.features.view(), blobs.targets.view())
        .unwrap();

    assert_eq!(report.walkthrough.centroids.nrows(), 4);
    assert_eq!(report.predicted.len(), 200);
    assert!(report.wcss <= report.initial_wcss + 1e-9);
    assert!((-1.0..=1.0).contains(&report.silhouette));
    assert_eq!(report.targets, blobs.targets);
    assert!(report.plot.to_svg().starts_with("<svg"));
}

#[test]
fn test_elbow_on_blobs() {
    let blobs = make_blobs(120, 3, 2, 0.3, 4).unwrap();
    let template = KMeans::new(1).random_state(0).n_init(5);

    let curve = elbow_curve(blobs.features.view(), 1..=6, &template).unwrap();
    assert_eq!(curve.len(), 6);
    assert!(curve.first().unwrap().wcss > curve.last().unwrap().wcss);
    assert!(knee(&curve).is_some());
}
