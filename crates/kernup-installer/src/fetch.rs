use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use kernup_core::{display_name, KernelVersion, UpgradeError};
use kernup_source::{MainlineSite, PageSource};
use tracing::debug;

use crate::fs_utils::{local_file_name, remove_file_if_exists};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub bytes: u64,
}

pub trait ArtifactFetch {
    fn fetch(&self, version: &KernelVersion, filename: &str)
        -> Result<FetchedArtifact, UpgradeError>;
}

impl<T: ArtifactFetch + ?Sized> ArtifactFetch for &T {
    fn fetch(
        &self,
        version: &KernelVersion,
        filename: &str,
    ) -> Result<FetchedArtifact, UpgradeError> {
        (**self).fetch(version, filename)
    }
}

/// Downloads artifacts into the work directory, always replacing local copies.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher<S> {
    source: S,
    site: MainlineSite,
    work_dir: PathBuf,
}

impl<S: PageSource> ArtifactFetcher<S> {
    pub fn new(source: S, site: MainlineSite, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            site,
            work_dir: work_dir.into(),
        }
    }

    fn download_into(&self, url: &str, path: &Path, filename: &str) -> Result<u64, UpgradeError> {
        let file = File::create(path)
            .map_err(|err| UpgradeError::io("failed to create artifact file", path, err))?;
        let mut writer = BufWriter::new(file);
        let bytes = self
            .source
            .download(url, &mut writer)
            .map_err(|err| UpgradeError::Fetch {
                filename: filename.to_string(),
                message: err.to_string(),
            })?;
        let file = writer
            .into_inner()
            .map_err(|err| UpgradeError::io("failed to flush artifact file", path, err.into_error()))?;
        file.sync_all()
            .map_err(|err| UpgradeError::io("failed to sync artifact file", path, err))?;
        Ok(bytes)
    }
}

impl<S: PageSource> ArtifactFetch for ArtifactFetcher<S> {
    fn fetch(
        &self,
        version: &KernelVersion,
        filename: &str,
    ) -> Result<FetchedArtifact, UpgradeError> {
        let local_name = local_file_name(filename).ok_or_else(|| UpgradeError::Fetch {
            filename: filename.to_string(),
            message: "listing entry is not a plain file name".to_string(),
        })?;
        let path = self.work_dir.join(local_name);

        if remove_file_if_exists(&path)
            .map_err(|err| UpgradeError::io("failed to remove stale artifact", &path, err))?
        {
            debug!("deleted existing file {}", display_name(filename));
        }

        let url = self.site.artifact_url(version, filename);
        debug!("download start: {}", display_name(filename));
        let started = Instant::now();

        let bytes = match self.download_into(&url, &path, filename) {
            Ok(bytes) => bytes,
            Err(err) => {
                let _ = remove_file_if_exists(&path);
                return Err(err);
            }
        };

        debug!(
            bytes,
            "download end: {} in {:.2}s",
            display_name(filename),
            started.elapsed().as_secs_f64()
        );
        Ok(FetchedArtifact { path, bytes })
    }
}
