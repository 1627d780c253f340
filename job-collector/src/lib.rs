pub mod filter;
pub mod serpapi;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("SERPAPI_API_KEY is not set, cannot query the Google Jobs API")]
    MissingApiKey,
    #[error("Request error: '{0}'")]
    Request(#[from] reqwest::Error),
    #[error("Failed to fetch data from: '{0}'")]
    RequestNotOk(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One job listing fetched from the Google Jobs search API
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Posting {
    pub title: String,
    pub company: String,
    pub location: String,
    /// Full job description when the listing endpoint had one,
    /// otherwise the snippet returned by the search endpoint
    pub description: String,
    pub link: Option<String>,
    pub job_id: Option<String>,
}
