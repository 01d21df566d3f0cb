use ::url::form_urlencoded;

/// Appends `query` to `url`, choosing `?` or `&` as the joiner.
///
/// A leading `?` on `query` is ignored and an empty query leaves `url` untouched.
pub fn with_query(url: &str, query: &str) -> String {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return url.to_string();
    }
    if url.ends_with('?') || url.ends_with('&') {
        return format!("{}{}", url, query);
    }
    let joiner = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, joiner, query)
}

/// Form-urlencodes a single query value.
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
