//! Distribution codename detection from `os-release` content.

/// Read `VERSION_CODENAME`, falling back to `UBUNTU_CODENAME`.
#[must_use]
pub fn codename_from_os_release(content: &str) -> Option<String> {
    field(content, "VERSION_CODENAME").or_else(|| field(content, "UBUNTU_CODENAME"))
}

fn field(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k != key {
            return None;
        }
        let v = v.trim().trim_matches(|c| c == '"' || c == '\'');
        (!v.is_empty()).then(|| v.to_owned())
    })
}
