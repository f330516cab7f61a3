use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("page unreachable: both HTTP and browser fetch failed for {0}")]
    FetchUnreachable(String),

    #[error("browser render failed: {0}")]
    BrowserError(String),

    #[error("no review-like content detected on page")]
    NoCandidatesFound,

    #[error("review candidates found but none yielded usable text")]
    NoReviewsExtracted,

    #[error("invalid platform profile: {0}")]
    MalformedProfile(String),

    #[error("domain is blocked: {0}")]
    BlockedDomain(String),

    #[error("summarization failed: {0}")]
    SummaryError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ScrapeError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ScrapeError::HttpError(_) => Some(
                "Check your internet connection, or retry with --timeout to allow a slower fetch"
            ),
            ScrapeError::FetchUnreachable(_) => Some(
                "The site may block automated clients. Run `reviewlens doctor` to verify the browser runtime is installed"
            ),
            ScrapeError::BrowserError(_) => Some(
                "Run `reviewlens doctor` for browser runtime setup instructions"
            ),
            ScrapeError::NoCandidatesFound => Some(
                "The page may render reviews client-side. A profile for this site (see `reviewlens platforms`) usually helps"
            ),
            ScrapeError::NoReviewsExtracted => Some(
                "Review blocks were found but contained no usable text. Check the profile's reviewText selectors"
            ),
            ScrapeError::MalformedProfile(_) => Some(
                "Every profile needs at least one reviewBlock or reviewText selector, and all selectors must parse as CSS"
            ),
            ScrapeError::BlockedDomain(_) => Some(
                "Remove the domain from blocked_domains in your platforms.toml to scrape it anyway"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
