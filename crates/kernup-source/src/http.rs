use std::io::Write;
use std::time::Duration;

use kernup_core::UpgradeError;
use reqwest::blocking::Client;
use tracing::debug;

/// Blocking page and artifact retrieval.
pub trait PageSource {
    fn fetch_text(&self, url: &str) -> Result<String, UpgradeError>;

    /// Streams the body at `url` into `sink`, returning the byte count.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, UpgradeError>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn fetch_text(&self, url: &str) -> Result<String, UpgradeError> {
        (**self).fetch_text(url)
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, UpgradeError> {
        (**self).download(url, sink)
    }
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, UpgradeError> {
        let client = Client::builder()
            .user_agent(concat!("kernup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|err| UpgradeError::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {err}"),
            })?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, UpgradeError> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| transport_error(url, err))
    }
}

impl PageSource for HttpSource {
    fn fetch_text(&self, url: &str) -> Result<String, UpgradeError> {
        self.get(url)?
            .text()
            .map_err(|err| transport_error(url, err))
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, UpgradeError> {
        let mut response = self.get(url)?;
        response
            .copy_to(sink)
            .map_err(|err| transport_error(url, err))
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> UpgradeError {
    UpgradeError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}
