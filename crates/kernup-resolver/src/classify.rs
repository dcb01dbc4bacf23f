use kernup_core::PackageRole;

pub const BUILD_LOG_MARKER: &str = "BUILD.LOG";
pub const LOW_LATENCY_MARKER: &str = "lowlatency";
pub const ARCH_INDEPENDENT_MARKER: &str = "all";
pub const DEFAULT_FLAVOR: &str = "generic";

const HEADERS_MARKER: &str = "headers";
const MODULES_MARKER: &str = "modules";
const IMAGE_MARKER: &str = "image";

/// A listing entry that passed the inclusion filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArtifact {
    pub name: String,
    pub arch: String,
}

/// Listing inclusion filter.
///
/// An entry is kept when it names the target architecture and is not a build
/// log, or when it carries the architecture-independent marker and directly
/// follows an entry naming the target architecture. Low-latency builds are
/// never kept. The first entry has no predecessor.
pub fn filter_candidates<S: AsRef<str>>(links: &[S], arch: &str) -> Vec<CandidateArtifact> {
    links
        .iter()
        .enumerate()
        .filter_map(|(position, link)| {
            let link = link.as_ref();
            if link.contains(LOW_LATENCY_MARKER) {
                return None;
            }

            if link.contains(arch) && !link.contains(BUILD_LOG_MARKER) {
                return Some(CandidateArtifact {
                    name: link.to_string(),
                    arch: arch.to_string(),
                });
            }

            let follows_arch_entry = position
                .checked_sub(1)
                .and_then(|previous| links.get(previous))
                .is_some_and(|previous| previous.as_ref().contains(arch));
            (link.contains(ARCH_INDEPENDENT_MARKER) && follows_arch_entry).then(|| {
                CandidateArtifact {
                    name: link.to_string(),
                    arch: ARCH_INDEPENDENT_MARKER.to_string(),
                }
            })
        })
        .collect()
}

/// Architecture-independent headers entry that carries no architecture token.
pub(crate) fn is_unclaimed_common_headers(link: &str, arch: &str) -> bool {
    !link.contains(arch)
        && !link.contains(BUILD_LOG_MARKER)
        && !link.contains(LOW_LATENCY_MARKER)
        && link.contains(ARCH_INDEPENDENT_MARKER)
        && link.contains(HEADERS_MARKER)
}

/// Role of a candidate by name; the first matching rule wins.
pub fn classify(name: &str, flavor: &str) -> Option<PackageRole> {
    let headers = name.contains(HEADERS_MARKER);
    if headers && name.contains(ARCH_INDEPENDENT_MARKER) {
        Some(PackageRole::HeadersCommon)
    } else if headers && name.contains(flavor) {
        Some(PackageRole::HeadersArch)
    } else if name.contains(MODULES_MARKER) && name.contains(flavor) {
        Some(PackageRole::Modules)
    } else if name.contains(IMAGE_MARKER) && name.contains(flavor) {
        Some(PackageRole::Image)
    } else {
        None
    }
}
