//! Installed-package version parsing.

/// Extract the installed version of `package` from `dpkg -l` output.
///
/// Only rows whose status marks the package as installed (`ii`, `hi`) are
/// considered; architecture-qualified names (`pkg:amd64`) match too.
#[must_use]
pub fn installed_version(dpkg_list: &str, package: &str) -> Option<String> {
    dpkg_list.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let status = fields.next()?;
        let name = fields.next()?;
        let version = fields.next()?;
        let installed = status.len() >= 2 && status.as_bytes()[1] == b'i';
        let same_package = name == package
            || name
                .split_once(':')
                .is_some_and(|(base, _arch)| base == package);
        (installed && same_package).then(|| version.to_owned())
    })
}
