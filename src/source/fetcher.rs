use crate::model::{RawReading, SourceError};
use crate::parser::{FeedParser, Parser};
use crate::source::traits::ReadingSource;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Polls a ThingSpeak-style channel feed (`.../feeds.json`).
pub struct FeedFetcher {
    client: Client,
    feed_url: String,
    results: u32,
    field_map: HashMap<String, String>,
}

impl FeedFetcher {
    pub fn new(
        feed_url: impl Into<String>,
        results: u32,
        field_map: HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent("flow-tracker/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            feed_url: feed_url.into(),
            results,
            field_map,
        })
    }

    fn build_url(&self) -> String {
        let separator = if self.feed_url.contains('?') { '&' } else { '?' };
        format!("{}{}results={}", self.feed_url, separator, self.results)
    }
}

fn map_request_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::HttpError(e.to_string())
    }
}

#[async_trait::async_trait]
impl ReadingSource for FeedFetcher {
    async fn fetch(&self, user_id: &str) -> Result<Vec<RawReading>, SourceError> {
        let url = self.build_url();
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(map_request_error)?;
        if !response.status().is_success() {
            return Err(SourceError::InvalidResponse(response.status().as_u16()));
        }

        let body = response.text().await.map_err(map_request_error)?;
        let raws = FeedParser::new(user_id, self.field_map.clone()).parse(&body)?;
        info!("Fetched {} feed entries for {}", raws.len(), user_id);
        Ok(raws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(url: &str) -> FeedFetcher {
        FeedFetcher::new(url, 50, HashMap::new(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn appends_results_parameter() {
        assert_eq!(
            fetcher("https://api.thingspeak.com/channels/1/feeds.json").build_url(),
            "https://api.thingspeak.com/channels/1/feeds.json?results=50"
        );
        assert_eq!(
            fetcher("https://api.thingspeak.com/channels/1/feeds.json?api_key=abc").build_url(),
            "https://api.thingspeak.com/channels/1/feeds.json?api_key=abc&results=50"
        );
    }
}
