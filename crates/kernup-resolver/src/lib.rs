mod classify;
mod resolve;
mod version;

pub use classify::{
    classify, filter_candidates, CandidateArtifact, ARCH_INDEPENDENT_MARKER, BUILD_LOG_MARKER,
    DEFAULT_FLAVOR, LOW_LATENCY_MARKER,
};
pub use resolve::{resolve_plan, PackageSetResolver, PlanLookup};
pub use version::{
    parse_latest_version, PinnedVersion, VersionLookup, VersionResolver, LATEST_VERSION_MARKER,
};

#[cfg(test)]
mod tests;
