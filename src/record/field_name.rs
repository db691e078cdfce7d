//! Column name sanitizing

/// Longest column name the warehouse accepts
pub const MAX_FIELD_NAME_LEN: usize = 300;

/// Rewrite a property name into a valid column name.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix and the result is cut to [`MAX_FIELD_NAME_LEN`] characters. Names
/// that are already valid come back unchanged.
pub fn make_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);

    if name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.push('_');
    }

    out.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));

    // Only ASCII remains, so byte truncation is safe
    out.truncate(MAX_FIELD_NAME_LEN);
    out
}
