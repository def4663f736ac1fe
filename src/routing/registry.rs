//! API URL patterns handed to the resource dispatcher.

/// Built-in API patterns, in precedence order.
pub const DEFAULT_PREFIXES: [&str; 7] = [
    "/mr-api/*",
    "/saml/*",
    "/oauth/*",
    "/features",
    "/features/*",
    "/info/*",
    "/dacha2/*",
];

pub fn default_prefixes() -> Vec<String> {
    DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
}

/// Split a comma separated override, trimming entries and dropping empty ones.
pub fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// The override, when present, replaces the defaults outright. An override
/// with no usable entries yields an empty list rather than the defaults.
pub fn resolve_prefixes(override_value: Option<&str>) -> Vec<String> {
    match override_value {
        Some(raw) => parse_prefixes(raw),
        None => default_prefixes(),
    }
}
