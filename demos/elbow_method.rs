//! Elbow method example
//!
//! Fits k-means for k = 1..=8 on blobs drawn from four centers and prints
//! the WCSS curve together with the suggested knee.

use kmeanslab::{elbow_curve, knee, make_blobs, KMeans};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let blobs = make_blobs(400, 4, 2, 0.8, 11)?;
    let template = KMeans::new(1).random_state(0).n_init(5);

    let curve = elbow_curve(blobs.features.view(), 1..=8, &template)?;
    let max = curve.first().map_or(1.0, |p| p.wcss);

    for point in &curve {
        let bar = "#".repeat((point.wcss / max * 50.0).round() as usize);
        println!("k={:>2}  {:>12.2}  {bar}", point.k, point.wcss);
    }

    match knee(&curve) {
        Some(k) => println!("Suggested number of clusters: {k}"),
        None => println!("No clear elbow"),
    }

    Ok(())
}
