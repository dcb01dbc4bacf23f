/// Shortens a mainline package filename for log output, e.g.
/// `linux-image-unsigned-6.2.1-060201-generic_..._amd64.deb` becomes
/// `Linux-Image-v6.2.1 (amd64)`. Names that do not follow the Debian
/// `name_version_arch.deb` shape are returned unchanged.
pub fn display_name(filename: &str) -> String {
    shorten(filename).unwrap_or_else(|| filename.to_string())
}

fn shorten(filename: &str) -> Option<String> {
    let base = filename.rsplit('/').next()?;
    let parts = base.split('-').collect::<Vec<_>>();
    if parts.len() < 4 || parts[0] != "linux" {
        return None;
    }

    let version = if parts[2] == "unsigned" {
        parts[3]
    } else {
        parts[2]
    };
    let version = version.split('_').next()?;
    let package = capitalize(parts[1]);

    let (_, arch_part) = base.rsplit_once('_')?;
    let arch = arch_part.split('.').next()?;
    if arch.is_empty() || package.is_empty() || version.is_empty() {
        return None;
    }

    Some(format!("Linux-{package}-v{version} ({arch})"))
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
