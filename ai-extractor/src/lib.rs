pub mod api;
pub mod openai;
pub mod resume;
pub mod types;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("OPENAI_API_KEY is not set, cannot run extraction")]
    MissingApiKey,
    #[error("OpenAI error: '{0}'")]
    OpenAi(#[from] async_openai::error::OpenAIError),
    #[error("Model response is not valid JSON: '{0}'")]
    MalformedResponse(String),
    #[error("Model returned no choices")]
    EmptyResponse,
    #[error("Resume file not found: '{0}'")]
    ResumeNotFound(String),
    #[error("No text could be extracted from the PDF, the resume might be scanned images (needs OCR)")]
    NoTextInPdf,
    #[error("Failed to read PDF: '{0}'")]
    Pdf(#[from] pdf_extract::OutputError),
    #[error("File error: '{0}'")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
