use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::filter::{dedup_key, title_is_similar};
use crate::{Error, Posting, Result};

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Pause between listing-detail requests to stay polite with the API
const LISTING_FETCH_DELAY: Duration = Duration::from_millis(200);

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    jobs_results: Vec<JobResult>,
    serpapi_pagination: Option<Pagination>,
}

#[derive(Deserialize, Debug)]
struct Pagination {
    next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct JobResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    company_name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    description: String,
    job_id: Option<String>,
    share_link: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ListingResponse {
    job_description: Option<String>,
    description: Option<String>,
}

pub struct SerpApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    /// Reads `SERPAPI_API_KEY`. Fails before any request is made so a
    /// missing credential aborts the run up front.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SERPAPI_API_KEY").map_err(|_| Error::MissingApiKey)?;
        if api_key.is_empty() {
            return Err(Error::MissingApiKey);
        }
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, SERPAPI_URL.to_owned())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    async fn search_page(&self, query: &str, page_token: Option<&str>) -> Result<SearchResponse> {
        let mut params = vec![
            ("engine", "google_jobs"),
            ("q", query),
            ("hl", "en"),
            ("api_key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("next_page_token", token));
        }
        log::debug!(
            "requesting jobs from serpapi, query: {}, page token: {:?}",
            query,
            page_token
        );
        let resp = self.client.get(&self.base_url).query(&params).send().await?;
        if !resp.status().is_success() {
            let error_body = resp.text().await;
            log::error!(
                "failed to retrieve results for query: {}, error resp body: {:?}",
                query,
                error_body,
            );
            return Err(Error::RequestNotOk(format!("google_jobs search '{}'", query)));
        }
        let search: SearchResponse = resp.json().await?;
        Ok(search)
    }

    /// Fetch the full job description from the listing endpoint.
    /// Returns None when the listing has no usable description.
    async fn fetch_listing_description(&self, job_id: &str) -> Result<Option<String>> {
        let params = [
            ("engine", "google_jobs_listing"),
            ("q", job_id),
            ("hl", "en"),
            ("api_key", self.api_key.as_str()),
        ];
        log::debug!("requesting listing details for job id: {}", job_id);
        let resp = self.client.get(&self.base_url).query(&params).send().await?;
        if !resp.status().is_success() {
            let error_body = resp.text().await;
            log::error!(
                "failed to retrieve listing for job id: {}, error resp body: {:?}",
                job_id,
                error_body,
            );
            return Err(Error::RequestNotOk(format!(
                "google_jobs_listing '{}'",
                job_id
            )));
        }
        let listing: ListingResponse = resp.json().await?;
        let description = listing
            .job_description
            .or(listing.description)
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        Ok(description)
    }

    async fn convert_job(&self, job: JobResult) -> Posting {
        let mut description = None;
        if let Some(job_id) = &job.job_id {
            match self.fetch_listing_description(job_id).await {
                Ok(detail) => description = detail,
                Err(e) => {
                    log::error!(
                        "failed to fetch listing for job id: {}, error: {}, keeping search snippet",
                        job_id,
                        e
                    );
                }
            }
            tokio::time::sleep(LISTING_FETCH_DELAY).await;
        }
        Posting {
            description: description.unwrap_or_else(|| job.description.trim().to_owned()),
            title: job.title,
            company: job.company_name,
            location: job.location,
            link: job.share_link,
            job_id: job.job_id,
        }
    }

    /// Collect postings for the given titles until `total_num_posts` are
    /// gathered or the API runs out of pages. Request failures mid-run are
    /// logged and whatever was fetched so far is returned.
    pub async fn collect(
        &self,
        titles: &[String],
        country: &str,
        total_num_posts: usize,
    ) -> Vec<Posting> {
        let mut collected = Vec::with_capacity(total_num_posts);
        let mut seen = HashSet::new();
        'titles: for title in titles {
            if collected.len() >= total_num_posts {
                break;
            }
            let query = format!("{} jobs in {}", title, country);
            let mut page_token: Option<String> = None;
            loop {
                let page = match self.search_page(&query, page_token.as_deref()).await {
                    Ok(page) => page,
                    Err(e) => {
                        log::error!(
                            "search failed for query: {}, error: {}, stopping this query",
                            query,
                            e
                        );
                        continue 'titles;
                    }
                };
                if page.jobs_results.is_empty() {
                    break;
                }
                for job in page.jobs_results {
                    if !title_is_similar(&job.title, titles) {
                        log::debug!("discarding '{}', not close to the target titles", job.title);
                        continue;
                    }
                    let key = dedup_key(&job.title, &job.company_name, &job.location);
                    if !seen.insert(key) {
                        continue;
                    }
                    collected.push(self.convert_job(job).await);
                    if collected.len() >= total_num_posts {
                        return collected;
                    }
                }
                page_token = page
                    .serpapi_pagination
                    .and_then(|pagination| pagination.next_page_token);
                if page_token.is_none() {
                    break;
                }
            }
        }
        collected
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn job(title: &str, company: &str, id: Option<&str>) -> serde_json::Value {
        json!({
            "title": title,
            "company_name": company,
            "location": "Cairo, Egypt",
            "description": "snippet text",
            "job_id": id,
            "share_link": "https://www.google.com/search?q=jobs"
        })
    }

    #[test]
    fn test_from_env_fails_without_key() {
        std::env::remove_var("SERPAPI_API_KEY");
        let result = SerpApiClient::from_env();
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_deserialize_search_response() {
        let body = json!({
            "jobs_results": [job("AI Engineer", "Acme", Some("abc123"))],
            "serpapi_pagination": { "next_page_token": "tok" }
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.jobs_results.len(), 1);
        assert_eq!(parsed.jobs_results[0].title, "AI Engineer");
        assert_eq!(
            parsed
                .serpapi_pagination
                .unwrap()
                .next_page_token
                .as_deref(),
            Some("tok")
        );
    }

    #[tokio::test]
    async fn test_collect_filters_dedups_and_caps() {
        env_logger::init();
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_jobs");
            then.status(200).json_body(json!({
                "jobs_results": [
                    job("Senior AI Engineer", "Acme", None),
                    job("senior ai engineer", "ACME", None),
                    job("Accountant", "Ledger Ltd", None),
                    job("AI Engineer", "Globex", None),
                    job("AI Engineer", "Initech", None),
                ]
            }));
        });

        let client =
            SerpApiClient::with_base_url("test-key".to_owned(), server.url("/search.json"));
        let titles = vec!["AI Engineer".to_owned()];
        let postings = client.collect(&titles, "Egypt", 2).await;
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title, "Senior AI Engineer");
        // duplicate and unrelated results were discarded before the cap hit
        assert_eq!(postings[1].company, "Globex");
    }

    #[tokio::test]
    async fn test_collect_prefers_listing_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_jobs");
            then.status(200).json_body(json!({
                "jobs_results": [job("AI Engineer", "Acme", Some("abc123"))]
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_jobs_listing")
                .query_param("q", "abc123");
            then.status(200)
                .json_body(json!({ "job_description": "  full description text  " }));
        });

        let client =
            SerpApiClient::with_base_url("test-key".to_owned(), server.url("/search.json"));
        let titles = vec!["AI Engineer".to_owned()];
        let postings = client.collect(&titles, "Egypt", 5).await;
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].description, "full description text");
    }

    #[tokio::test]
    async fn test_collect_returns_partial_results_on_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search.json");
            then.status(500).body("upstream exploded");
        });

        let client =
            SerpApiClient::with_base_url("test-key".to_owned(), server.url("/search.json"));
        let titles = vec!["AI Engineer".to_owned()];
        let postings = client.collect(&titles, "Egypt", 5).await;
        assert!(postings.is_empty());
    }
}
