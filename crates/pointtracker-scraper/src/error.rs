use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("headless render failed for {url}: {reason}")]
    Render { url: String, reason: String },

    #[error("AI extraction failed: {0}")]
    Ai(String),

    #[error("headless rendering requested but this build has no renderer (enable the `headless` feature)")]
    RendererUnavailable,
}
