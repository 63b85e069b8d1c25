//! Taxonomy prefix inference for instance-document fact names

/// Checked in order against the namespace URI
const KNOWN_PREFIXES: [&str; 3] = ["us-gaap", "dei", "srt"];

/// Short prefix for a concept namespace such as
/// `http://fasb.org/us-gaap/2023` (`us-gaap`) or
/// `http://www.acme.org/acme/20231231` (`acme`).
pub fn infer_prefix(namespace: &str) -> &str {
    if let Some(known) = KNOWN_PREFIXES.iter().find(|p| namespace.contains(*p)) {
        return *known;
    }

    // text between `.org/` and the final `/`
    if let (Some(start), Some(end)) = (namespace.rfind(".org/"), namespace.rfind('/')) {
        let start = start + ".org/".len();
        if end > start {
            return &namespace[start..end];
        }
    }

    let (authority, path) = split_authority(namespace);
    match path.rfind('/') {
        Some(end) if end > 1 => &path[1..end],
        _ if !authority.is_empty() => authority,
        _ => namespace,
    }
}

/// `prefix:local`, or just `local` for elements outside any namespace.
pub fn qualified_name(namespace: Option<&str>, local_name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}:{}", infer_prefix(ns), local_name),
        _ => local_name.to_string(),
    }
}

/// Host and path (with leading `/`) of a `scheme://host/path` URI.
fn split_authority(uri: &str) -> (&str, &str) {
    let Some((_, rest)) = uri.split_once("://") else {
        return ("", "");
    };
    match rest.find('/') {
        Some(slash) => (&rest[..slash], &rest[slash..]),
        None => (rest, ""),
    }
}
