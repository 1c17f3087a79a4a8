//! Tournament, event and team names arrive with arbitrary run-on
//! whitespace from whatever authored them; `normalize_label` is the one
//! place every name/category/avoid-group setter routes through before a
//! value is stored.

/// Collapses any run of Unicode whitespace to a single ASCII space and
/// drops leading/trailing whitespace, in one pass.
pub fn normalize_label(input: impl Into<String>) -> String {
    let raw = input.into();
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() {
                pending_space = true;
            }
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

/// Optional labels (a team's display name override, its avoid-group tag)
/// treat a blank value as "unset" rather than storing an empty string.
pub fn normalize_optional_label(input: Option<impl Into<String>>) -> Option<String> {
    input.map(normalize_label).filter(|s| !s.is_empty())
}
