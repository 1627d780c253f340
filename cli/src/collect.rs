use std::path::Path;

use job_collector::serpapi::SerpApiClient;

pub const POSTINGS_CACHE_FILENAME: &str = "job_postings_cache.json";

pub async fn collect(titles: &[String], country: &str, total_num_posts: usize, output_dir: &Path) {
    let client = SerpApiClient::from_env().expect("SERPAPI_API_KEY not set");
    log::info!(
        "collecting up to {} postings for {:?} in {}",
        total_num_posts,
        titles,
        country
    );
    let postings = client.collect(titles, country, total_num_posts).await;
    if postings.len() < total_num_posts {
        log::warn!(
            "only found {} postings (requested {})",
            postings.len(),
            total_num_posts
        );
    }
    std::fs::create_dir_all(output_dir).expect("Failed to create output directory");
    let path = output_dir.join(POSTINGS_CACHE_FILENAME);
    let data = serde_json::to_string_pretty(&postings).expect("Failed to serialize postings");
    std::fs::write(&path, data).expect("Failed to write postings cache");
    println!("Cached {} postings at {}", postings.len(), path.display());
}
