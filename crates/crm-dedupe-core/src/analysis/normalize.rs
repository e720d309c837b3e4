/// Canonical phone form used as the exact-match key.
///
/// Keeps digits and a leading `+`, then collapses a leading run of zeros into
/// `country_prefix`. Assumes a single national dialing convention. Returns an
/// empty string when no subscriber digits are left.
pub fn normalize_phone(raw: &str, country_prefix: &str) -> String {
    let mut kept = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && kept.is_empty()) {
            kept.push(c);
        }
    }

    if kept.starts_with('0') {
        let subscriber = kept.trim_start_matches('0');
        if subscriber.is_empty() {
            return String::new();
        }
        return format!("{}{}", country_prefix, subscriber);
    }

    if kept.chars().all(|c| c == '+') {
        return String::new();
    }

    kept
}

/// Lowercase letters only. Spacing and punctuation carry no signal, so
/// "Jean Paul" and "Jeanpaul" compare equal.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}
