use kernup_core::{KernelVersion, UpgradeError};
use kernup_source::{element_text_by_id, MainlineSite, PageSource};
use tracing::info;

/// Element on the index page whose text is the latest stable version.
pub const LATEST_VERSION_MARKER: &str = "latest_link";

pub trait VersionLookup {
    fn latest(&self) -> Result<KernelVersion, UpgradeError>;
}

impl<T: VersionLookup + ?Sized> VersionLookup for &T {
    fn latest(&self) -> Result<KernelVersion, UpgradeError> {
        (**self).latest()
    }
}

impl<T: VersionLookup + ?Sized> VersionLookup for Box<T> {
    fn latest(&self) -> Result<KernelVersion, UpgradeError> {
        (**self).latest()
    }
}

#[derive(Debug, Clone)]
pub struct VersionResolver<S> {
    source: S,
    site: MainlineSite,
}

impl<S: PageSource> VersionResolver<S> {
    pub fn new(source: S, site: MainlineSite) -> Self {
        Self { source, site }
    }
}

impl<S: PageSource> VersionLookup for VersionResolver<S> {
    fn latest(&self) -> Result<KernelVersion, UpgradeError> {
        let url = self.site.index_url();
        let page = self.source.fetch_text(url)?;
        let version = parse_latest_version(&page)?;
        info!("latest stable kernel version is v{version}");
        Ok(version)
    }
}

pub fn parse_latest_version(page: &str) -> Result<KernelVersion, UpgradeError> {
    let text = element_text_by_id(page, LATEST_VERSION_MARKER).ok_or_else(|| {
        UpgradeError::VersionParse(format!(
            "marker element '{LATEST_VERSION_MARKER}' not found on index page"
        ))
    })?;
    KernelVersion::parse(&text)
}

/// A fixed version supplied by the user instead of the upstream index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedVersion(pub KernelVersion);

impl VersionLookup for PinnedVersion {
    fn latest(&self) -> Result<KernelVersion, UpgradeError> {
        info!("using pinned kernel version v{}", self.0);
        Ok(self.0.clone())
    }
}
