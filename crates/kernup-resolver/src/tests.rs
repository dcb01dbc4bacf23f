use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Write;

use kernup_core::{InstallationPlan, KernelVersion, PackageRole, UpgradeError};
use kernup_source::{MainlineSite, PageSource};

use super::*;

const HEADERS_ALL: &str = "linux-headers-6.2.1-060201_6.2.1-060201.202302140432_all.deb";
const HEADERS_ARCH: &str =
    "linux-headers-6.2.1-060201-generic_6.2.1-060201.202302140432_amd64.deb";
const MODULES: &str = "linux-modules-6.2.1-060201-generic_6.2.1-060201.202302140432_amd64.deb";
const IMAGE: &str =
    "linux-image-unsigned-6.2.1-060201-generic_6.2.1-060201.202302140432_amd64.deb";
const BUILD_LOG: &str = "amd64/BUILD.LOG.amd64";
const LOWLATENCY_IMAGE: &str =
    "linux-image-unsigned-6.2.1-060201-lowlatency_6.2.1-060201.202302140432_amd64.deb";

#[derive(Default)]
struct FakeSource {
    pages: BTreeMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl FakeSource {
    fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

impl PageSource for FakeSource {
    fn fetch_text(&self, url: &str) -> Result<String, UpgradeError> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| UpgradeError::Transport {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
    }

    fn download(&self, url: &str, _sink: &mut dyn Write) -> Result<u64, UpgradeError> {
        Err(UpgradeError::Transport {
            url: url.to_string(),
            message: "downloads are not served by this fake".to_string(),
        })
    }
}

fn test_site() -> MainlineSite {
    MainlineSite::new("https://index.test/", "https://mainline.test/mainline")
}

fn listing_html(links: &[&str]) -> String {
    let anchors = links
        .iter()
        .map(|link| format!("<a href=\"{link}\">{link}</a>"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<html><body><code>\n{anchors}\n</code></body></html>")
}

fn example_listing() -> Vec<&'static str> {
    vec![
        HEADERS_ARCH,
        HEADERS_ALL,
        MODULES,
        IMAGE,
        BUILD_LOG,
        LOWLATENCY_IMAGE,
    ]
}

fn assert_complete_example_plan(plan: &InstallationPlan) {
    assert!(plan.is_complete(), "plan must be complete: {plan:?}");
    assert_eq!(plan.get(PackageRole::HeadersCommon), Some(HEADERS_ALL));
    assert_eq!(plan.get(PackageRole::HeadersArch), Some(HEADERS_ARCH));
    assert_eq!(plan.get(PackageRole::Modules), Some(MODULES));
    assert_eq!(plan.get(PackageRole::Image), Some(IMAGE));
}

#[test]
fn filter_excludes_build_log_and_lowlatency_entries() {
    let candidates = filter_candidates(&example_listing(), "amd64");
    let names = candidates
        .iter()
        .map(|candidate| candidate.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec![HEADERS_ARCH, HEADERS_ALL, MODULES, IMAGE]);
    assert_eq!(candidates[0].arch, "amd64");
    assert_eq!(candidates[1].arch, ARCH_INDEPENDENT_MARKER);
}

#[test]
fn filter_includes_all_entry_only_after_arch_entry() {
    let after_other_arch = [
        "linux-headers-6.2.1-060201-generic_6.2.1_arm64.deb",
        HEADERS_ALL,
        MODULES,
    ];
    let names = filter_candidates(&after_other_arch, "amd64")
        .into_iter()
        .map(|candidate| candidate.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![MODULES.to_string()]);

    let after_build_log = [BUILD_LOG, HEADERS_ALL];
    let names = filter_candidates(&after_build_log, "amd64")
        .into_iter()
        .map(|candidate| candidate.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![HEADERS_ALL.to_string()]);
}

#[test]
fn filter_first_entry_has_no_predecessor() {
    let listing = [HEADERS_ALL, HEADERS_ARCH];
    let names = filter_candidates(&listing, "amd64")
        .into_iter()
        .map(|candidate| candidate.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec![HEADERS_ARCH.to_string()]);
}

#[test]
fn filter_drops_lowlatency_all_entry_even_after_arch_entry() {
    let listing = [
        HEADERS_ARCH,
        "linux-headers-6.2.1-060201-lowlatency_6.2.1_all.deb",
    ];
    assert_eq!(filter_candidates(&listing, "amd64").len(), 1);
}

#[test]
fn classify_applies_rules_in_priority_order() {
    assert_eq!(classify(HEADERS_ALL, "generic"), Some(PackageRole::HeadersCommon));
    assert_eq!(classify(HEADERS_ARCH, "generic"), Some(PackageRole::HeadersArch));
    assert_eq!(classify(MODULES, "generic"), Some(PackageRole::Modules));
    assert_eq!(classify(IMAGE, "generic"), Some(PackageRole::Image));
    assert_eq!(classify("CHECKSUMS", "generic"), None);
    assert_eq!(
        classify("linux-image-6.2.1-060201-virtual_6.2.1_amd64.deb", "generic"),
        None
    );
}

#[test]
fn resolves_example_listing_in_canonical_order() {
    let plan = resolve_plan(&example_listing(), "amd64", "generic").expect("must resolve");
    assert_complete_example_plan(&plan);

    let resolved = plan.into_resolved().expect("must be complete");
    let order = resolved
        .entries()
        .map(|(_, filename)| filename)
        .collect::<Vec<_>>();
    assert_eq!(order, vec![HEADERS_ALL, HEADERS_ARCH, MODULES, IMAGE]);
}

#[test]
fn resolution_is_independent_of_listing_order() {
    let listing = example_listing();
    let mut orders = Vec::new();
    for shift in 0..listing.len() {
        let mut rotated = listing.clone();
        rotated.rotate_left(shift);
        orders.push(rotated.clone());
        rotated.reverse();
        orders.push(rotated);
    }

    for order in orders {
        let plan = resolve_plan(&order, "amd64", "generic").expect("must resolve");
        assert_complete_example_plan(&plan);
    }
}

#[test]
fn missing_role_leaves_slot_unresolved() {
    for missing in [HEADERS_ALL, HEADERS_ARCH, MODULES, IMAGE] {
        let listing = example_listing()
            .into_iter()
            .filter(|link| *link != missing)
            .collect::<Vec<_>>();
        let plan = resolve_plan(&listing, "amd64", "generic").expect("must resolve");
        let missing_roles = plan.missing_roles();
        assert_eq!(missing_roles.len(), 1, "listing without {missing}");

        let err = plan.into_resolved().expect_err("must be incomplete");
        assert!(
            err.to_string().contains(missing_roles[0].as_str()),
            "error must name the missing role: {err}"
        );
    }
}

#[test]
fn ambiguous_common_headers_are_rejected() {
    let mut listing = example_listing();
    listing.push("linux-headers-6.2.0-060200_6.2.0-060200.202302060000_all.deb");

    let err = resolve_plan(&listing, "amd64", "generic").expect_err("must be ambiguous");
    match err {
        UpgradeError::IncompletePlan { missing, ambiguous } => {
            assert_eq!(missing, vec![PackageRole::HeadersCommon]);
            assert_eq!(ambiguous.len(), 2);
            assert!(ambiguous.contains(&HEADERS_ALL.to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repeated_common_headers_entry_counts_once() {
    let listing = vec![
        HEADERS_ARCH,
        HEADERS_ALL,
        "linux-headers-6.2.1-060201-generic_6.2.1_arm64.deb",
        HEADERS_ALL,
        MODULES,
        IMAGE,
    ];
    let plan = resolve_plan(&listing, "amd64", "generic").expect("must resolve");
    assert_complete_example_plan(&plan);
}

#[test]
fn arch_directory_prefixed_common_headers_resolve_in_first_pass() {
    let prefixed = format!("amd64/{HEADERS_ALL}");
    let listing = vec![
        prefixed.clone(),
        format!("arm64/{HEADERS_ALL}"),
        format!("amd64/{HEADERS_ARCH}"),
        format!("amd64/{MODULES}"),
        format!("amd64/{IMAGE}"),
    ];
    let plan = resolve_plan(&listing, "amd64", "generic").expect("must resolve");
    assert!(plan.is_complete());
    assert_eq!(plan.get(PackageRole::HeadersCommon), Some(prefixed.as_str()));
}

#[test]
fn later_duplicate_role_entry_wins() {
    let replacement = "linux-modules-6.2.1-060201-generic_6.2.1-060201.202303010000_amd64.deb";
    let mut listing = example_listing();
    listing.push(replacement);
    let plan = resolve_plan(&listing, "amd64", "generic").expect("must resolve");
    assert_eq!(plan.get(PackageRole::Modules), Some(replacement));
}

#[test]
fn other_architectures_do_not_fill_slots() {
    let listing = example_listing()
        .into_iter()
        .map(|link| link.replace("amd64", "arm64"))
        .collect::<Vec<_>>();
    let plan = resolve_plan(&listing, "amd64", "generic").expect("must resolve");
    assert_eq!(
        plan.missing_roles(),
        vec![
            PackageRole::HeadersArch,
            PackageRole::Modules,
            PackageRole::Image
        ]
    );
}

#[test]
fn package_set_resolver_fetches_version_listing() {
    let version = KernelVersion::new(6, 2, 1);
    let source = FakeSource::default().with_page(
        "https://mainline.test/mainline/v6.2.1/",
        &listing_html(&example_listing()),
    );
    let resolver = PackageSetResolver::new(&source, test_site());

    let plan = resolver.resolve(&version, "amd64").expect("must resolve");
    assert_complete_example_plan(&plan);
    assert_eq!(
        source.requested.borrow().as_slice(),
        ["https://mainline.test/mainline/v6.2.1/"]
    );
}

#[test]
fn package_set_resolver_honours_flavor() {
    let version = KernelVersion::new(6, 2, 1);
    let listing = example_listing()
        .into_iter()
        .map(|link| link.replace("generic", "virtual"))
        .collect::<Vec<_>>();
    let links = listing.iter().map(String::as_str).collect::<Vec<_>>();
    let source = FakeSource::default().with_page(
        "https://mainline.test/mainline/v6.2.1/",
        &listing_html(&links),
    );

    let generic = PackageSetResolver::new(&source, test_site());
    assert!(!generic.resolve(&version, "amd64").expect("resolve").is_complete());

    let virtual_flavor = PackageSetResolver::new(&source, test_site()).with_flavor("virtual");
    assert!(virtual_flavor
        .resolve(&version, "amd64")
        .expect("resolve")
        .is_complete());
}

#[test]
fn package_set_resolver_propagates_transport_errors() {
    let source = FakeSource::default();
    let resolver = PackageSetResolver::new(&source, test_site());
    let err = resolver
        .resolve(&KernelVersion::new(6, 2, 1), "amd64")
        .expect_err("missing page must fail");
    assert!(matches!(err, UpgradeError::Transport { .. }));
}

#[test]
fn version_resolver_reads_latest_marker() {
    let source = FakeSource::default().with_page(
        "https://index.test/",
        r#"<table id="releases"><tr><td id="latest_link"><a href="/pub/linux-6.2.1.tar.xz">6.2.1</a></td></tr></table>"#,
    );
    let resolver = VersionResolver::new(&source, test_site());
    assert_eq!(
        resolver.latest().expect("must resolve"),
        KernelVersion::new(6, 2, 1)
    );
}

#[test]
fn version_resolver_rejects_missing_marker() {
    let source =
        FakeSource::default().with_page("https://index.test/", "<td id=\"latest\">6.2.1</td>");
    let err = VersionResolver::new(&source, test_site())
        .latest()
        .expect_err("must fail");
    assert!(matches!(err, UpgradeError::VersionParse(_)));
}

#[test]
fn version_resolver_rejects_two_component_version() {
    let err = parse_latest_version("<td id=\"latest_link\"><a href=\"x\">6.3</a></td>")
        .expect_err("must fail");
    assert!(matches!(err, UpgradeError::VersionParse(_)));
}

#[test]
fn pinned_version_skips_index() {
    let pinned = PinnedVersion(KernelVersion::new(5, 19, 7));
    assert_eq!(pinned.latest().expect("pinned"), KernelVersion::new(5, 19, 7));
}

#[test]
fn plan_only_classifies_entries_kept_by_inclusion_filter() {
    let build_log_image = "amd64/BUILD.LOG.linux-image-unsigned-6.2.1-060201-generic_amd64";
    let listing = vec![HEADERS_ARCH, HEADERS_ALL, MODULES, build_log_image];

    let kept = filter_candidates(&listing, "amd64");
    assert!(!kept.iter().any(|candidate| candidate.name == build_log_image));

    let plan = resolve_plan(&listing, "amd64", "generic").expect("resolution must succeed");
    assert_eq!(plan.get(PackageRole::Image), None);
    assert_eq!(plan.missing_roles(), vec![PackageRole::Image]);
    for (_, filename) in plan.slots() {
        let Some(filename) = filename else { continue };
        assert!(
            filename == HEADERS_ALL || kept.iter().any(|candidate| candidate.name == filename),
            "{filename} bypassed the inclusion filter"
        );
    }
}
