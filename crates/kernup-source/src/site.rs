use kernup_core::KernelVersion;

pub const DEFAULT_INDEX_URL: &str = "https://www.kernel.org/";
pub const DEFAULT_MAINLINE_URL: &str = "https://kernel.ubuntu.com/mainline";

/// URL layout of the upstream version index and the mainline build archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainlineSite {
    index_url: String,
    mainline_url: String,
}

impl Default for MainlineSite {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX_URL, DEFAULT_MAINLINE_URL)
    }
}

impl MainlineSite {
    pub fn new(index_url: impl Into<String>, mainline_url: impl Into<String>) -> Self {
        Self {
            index_url: index_url.into(),
            mainline_url: mainline_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    pub fn mainline_url(&self) -> &str {
        &self.mainline_url
    }

    pub fn listing_url(&self, version: &KernelVersion) -> String {
        format!("{}/{}/", self.mainline_url, version.mainline_tag())
    }

    pub fn artifact_url(&self, version: &KernelVersion, filename: &str) -> String {
        format!(
            "{}{}",
            self.listing_url(version),
            filename.trim_start_matches('/')
        )
    }
}
