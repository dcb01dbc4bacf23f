use std::collections::BTreeSet;

use kernup_core::{display_name, InstallationPlan, KernelVersion, PackageRole, UpgradeError};
use kernup_source::{link_texts, MainlineSite, PageSource};
use tracing::{debug, warn};

use crate::classify::{
    classify, filter_candidates, is_unclaimed_common_headers, DEFAULT_FLAVOR,
};

pub trait PlanLookup {
    fn resolve(&self, version: &KernelVersion, arch: &str)
        -> Result<InstallationPlan, UpgradeError>;
}

impl<T: PlanLookup + ?Sized> PlanLookup for &T {
    fn resolve(
        &self,
        version: &KernelVersion,
        arch: &str,
    ) -> Result<InstallationPlan, UpgradeError> {
        (**self).resolve(version, arch)
    }
}

#[derive(Debug, Clone)]
pub struct PackageSetResolver<S> {
    source: S,
    site: MainlineSite,
    flavor: String,
}

impl<S: PageSource> PackageSetResolver<S> {
    pub fn new(source: S, site: MainlineSite) -> Self {
        Self {
            source,
            site,
            flavor: DEFAULT_FLAVOR.to_string(),
        }
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = flavor.into();
        self
    }
}

impl<S: PageSource> PlanLookup for PackageSetResolver<S> {
    fn resolve(
        &self,
        version: &KernelVersion,
        arch: &str,
    ) -> Result<InstallationPlan, UpgradeError> {
        let url = self.site.listing_url(version);
        let page = self.source.fetch_text(&url)?;
        let links = link_texts(&page);
        debug!(url = %url, links = links.len(), "fetched package listing");
        resolve_plan(&links, arch, &self.flavor)
    }
}

/// Builds an installation plan from listing link texts.
///
/// Candidates the inclusion filter tags with `arch` are classified first. If that leaves the common
/// headers slot open, the listing is searched for architecture-independent
/// headers entries anywhere in it; one distinct name fills the slot, several
/// distinct names are rejected as ambiguous. Completeness is not checked.
pub fn resolve_plan<S: AsRef<str>>(
    links: &[S],
    arch: &str,
    flavor: &str,
) -> Result<InstallationPlan, UpgradeError> {
    let mut plan = InstallationPlan::new();

    let arch_candidates = filter_candidates(links, arch)
        .into_iter()
        .filter(|candidate| candidate.arch == arch);
    for candidate in arch_candidates {
        let link = candidate.name.as_str();
        let Some(role) = classify(link, flavor) else {
            debug!("ignoring listing entry {link}");
            continue;
        };
        if let Some(previous) = plan.assign(role, link) {
            if previous != link {
                warn!(
                    "listing has more than one {role} package; using {} over {}",
                    display_name(link),
                    display_name(&previous)
                );
            }
        }
    }

    if plan.get(PackageRole::HeadersCommon).is_none() {
        let common = links
            .iter()
            .map(AsRef::as_ref)
            .filter(|link| is_unclaimed_common_headers(link, arch))
            .collect::<BTreeSet<_>>();

        match common.len() {
            0 => {}
            1 => {
                if let Some(name) = common.into_iter().next() {
                    plan.assign(PackageRole::HeadersCommon, name);
                }
            }
            _ => {
                return Err(UpgradeError::IncompletePlan {
                    missing: vec![PackageRole::HeadersCommon],
                    ambiguous: common.into_iter().map(str::to_string).collect(),
                });
            }
        }
    }

    debug!("files queued for installation:");
    for (role, filename) in plan.slots() {
        match filename {
            Some(filename) => debug!("{role}: {}", display_name(filename)),
            None => debug!("{role}: unresolved"),
        }
    }

    Ok(plan)
}
