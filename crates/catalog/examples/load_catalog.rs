use catalog::CatalogIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/catalog");

    println!("Loading activity catalog...\n");

    let start = Instant::now();
    let index = CatalogIndex::load_from_dir(data_dir)
        .expect("Failed to load catalog");
    let elapsed = start.elapsed();

    let (activities, preferences, personal) = index.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Activities: {}", activities);
    println!("Preferences: {}", preferences);
    println!("Personal activities: {}", personal);
    println!("Cities: {}", index.city_count());
}
