//! Basic k-means clustering example
//!
//! Clusters synthetic Gaussian blobs with both initialization methods and
//! scores each result with WCSS and the silhouette coefficient.

use kmeanslab::{evaluate, make_blobs, InitMethod, KMeans};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let blobs = make_blobs(300, 3, 2, 1.0, 42)?;
    println!("Sample data shape: {:?}", blobs.features.dim());
    println!("True centers:");
    for center in blobs.centers.rows() {
        println!("  [{:.3}, {:.3}]", center[0], center[1]);
    }
    println!();

    for (name, method) in [
        ("random", InitMethod::Random),
        ("k-means++", InitMethod::KMeansPlusPlus),
    ] {
        println!("=== {name} initialization ===");
        let result = KMeans::new(3)
            .init_method(method)
            .random_state(42)
            .n_init(10)
            .fit(blobs.features.view())?;

        let eval = evaluate(
            blobs.features.view(),
            result.centroids.view(),
            result.labels.view(),
        )?;
        println!("Iterations: {} (converged: {})", result.n_iter, result.converged);
        println!("Cluster sizes: {:?}", result.cluster_sizes());
        println!("WCSS: {:.4}", eval.wcss);
        println!("Silhouette: {:.4}", eval.silhouette);
        println!();
    }

    // A single Lloyd's run from random rows, printing WCSS per iteration
    let walkthrough = KMeans::new(3)
        .init_method(InitMethod::Random)
        .n_init(1)
        .tolerance(0.0)
        .random_state(7)
        .fit(blobs.features.view())?;
    println!("=== Lloyd's iterations ===");
    for (i, inertia) in walkthrough.inertia_history.iter().enumerate() {
        println!("  iteration {:>2}: WCSS {inertia:.4}", i + 1);
    }

    let new_points = ndarray::array![[0.0, 0.0], [5.0, -5.0]];
    println!("Predicted clusters for new points: {}", walkthrough.predict(new_points.view())?);

    Ok(())
}
