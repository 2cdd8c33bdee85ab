//! Mushroom edibility clustering example
//!
//! Runs the two-cluster mushroom page on a CSV file (default: the bundled
//! sample), once with the fixed cluster names and once naming clusters by
//! majority vote, and writes the scatter plot next to the input.
//!
//! Usage: cargo run --example mushroom_edibility [path/to/mushroom.csv]

use kmeanslab::labels::MappingStrategy;
use kmeanslab::MushroomPage;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let csv = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/mushroom_sample.csv"));

    println!("=== Fixed names (0 = edible, 1 = poisonous) ===");
    let fixed = MushroomPage::new(&csv).run()?;
    print!("{fixed}");
    println!();

    println!("=== Names by majority vote ===");
    let voted = MushroomPage::new(&csv)
        .mapping(MappingStrategy::MajorityVote)
        .run()?;
    print!("{voted}");

    let svg = csv.with_extension("svg");
    voted.plot.save(&svg)?;
    println!("\nScatter plot written to {}", svg.display());

    Ok(())
}
