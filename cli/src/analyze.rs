use std::path::Path;

use ai_extractor::api::DataExtractor;
use ai_extractor::openai::{
    truncate_chars, OpenAiExtractor, POSTING_TEXT_LIMIT, RESUME_TEXT_LIMIT,
};
use analysis::aggregate::aggregate;
use analysis::compare::{recommend, TOP_RECOMMENDATIONS};
use analysis::report::{render_markdown, PipelineRun, ReportWriter};
use job_collector::serpapi::SerpApiClient;
use job_collector::Posting;

fn posting_text(posting: &Posting) -> String {
    format!(
        "Title: {}\nCompany: {}\nLocation: {}\nDescription:\n{}",
        posting.title, posting.company, posting.location, posting.description
    )
}

async fn load_postings(
    titles: &[String],
    country: &str,
    total_num_posts: usize,
    cache: Option<&Path>,
) -> Vec<Posting> {
    match cache {
        Some(path) => {
            log::info!("loading postings from {}", path.display());
            let data = std::fs::read_to_string(path).expect("Failed to read postings file");
            let mut postings: Vec<Posting> =
                serde_json::from_str(&data).expect("Failed to parse postings file");
            postings.truncate(total_num_posts);
            postings
        }
        None => {
            let client = SerpApiClient::from_env().expect("SERPAPI_API_KEY not set");
            log::info!(
                "collecting up to {} postings for {:?} in {}",
                total_num_posts,
                titles,
                country
            );
            client.collect(titles, country, total_num_posts).await
        }
    }
}

pub async fn analyze(
    titles: &[String],
    country: &str,
    total_num_posts: usize,
    resume_path: &Path,
    output_dir: &Path,
    postings_file: Option<&Path>,
) {
    // fail on missing credentials before any work is started
    let extractor = OpenAiExtractor::from_env().expect("OPENAI_API_KEY not set");
    let postings = load_postings(titles, country, total_num_posts, postings_file).await;
    if postings.is_empty() {
        log::error!("no postings found, nothing to analyze");
        return;
    }
    if postings.len() < total_num_posts {
        log::warn!(
            "only found {} postings (requested {})",
            postings.len(),
            total_num_posts
        );
    }

    log::info!("extracting requirements from {} postings", postings.len());
    let mut analyzed_postings = Vec::with_capacity(postings.len());
    let mut extractions = Vec::with_capacity(postings.len());
    for (index, posting) in postings.into_iter().enumerate() {
        let text = posting_text(&posting);
        match extractor
            .extract(truncate_chars(&text, POSTING_TEXT_LIMIT))
            .await
        {
            Ok(requirements) => {
                log::debug!("extracted from '{}': {:?}", posting.title, requirements);
                analyzed_postings.push(posting);
                extractions.push(requirements);
            }
            Err(e) => log::error!(
                "extraction failed for posting #{} '{}': {}",
                index + 1,
                posting.title,
                e
            ),
        }
    }

    let resume_text =
        ai_extractor::resume::extract_text(resume_path).expect("Failed to read resume");
    log::info!("extracting skills from the resume");
    let resume = extractor
        .extract(truncate_chars(&resume_text, RESUME_TEXT_LIMIT))
        .await
        .expect("Failed to extract resume skills");

    let summary = aggregate(&extractions);
    let recommendations = recommend(&summary, &resume, TOP_RECOMMENDATIONS);
    let run = PipelineRun {
        job_titles: titles.to_vec(),
        country: country.to_owned(),
        postings: analyzed_postings,
        extractions,
        resume,
        summary,
        recommendations,
    };
    let written = ReportWriter::new(output_dir)
        .write_all(&run)
        .expect("Failed to write report artifacts");
    println!("{}", render_markdown(&run));
    println!("Report saved at {}", written.html.display());
}
