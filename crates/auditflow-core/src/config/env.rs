#[must_use]
pub(super) fn read_non_empty_env(name: &str) -> Option<String> {
    normalize_non_empty(std::env::var(name).ok().as_deref())
}

#[must_use]
pub(super) fn read_env_u64(name: &str) -> Option<u64> {
    parse_u64(std::env::var(name).ok().as_deref())
}

#[must_use]
pub(super) fn read_env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
}

#[must_use]
pub(super) fn normalize_non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

#[must_use]
pub(super) fn parse_u64(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

#[must_use]
pub(super) fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| item.trim_end_matches('/').to_string())
            .collect()
    })
    .unwrap_or_default()
}
