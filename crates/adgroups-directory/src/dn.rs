//! Distinguished-name and filter-value helpers.

/// Escape special characters in LDAP filter values (RFC 4515).
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

/// Escape special characters in DN attribute values per RFC 4514.
///
/// DN escaping is different from filter escaping. Characters that must be escaped:
/// - Leading or trailing SPACE (escaped as \20)
/// - Leading # (escaped as \23)
/// - Characters: , + " \ < > ; = (escaped with backslash prefix)
/// - NUL character (escaped as \00)
#[must_use]
pub fn escape_dn_value(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        let is_first = i == 0;
        let is_last = i == value.len() - 1;

        match ch {
            // Characters that must always be escaped with backslash
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                result.push('\\');
                result.push(ch);
            }
            // NUL must be hex-escaped
            '\0' => {
                result.push_str("\\00");
            }
            // Space needs escaping only at start or end
            ' ' if is_first || is_last => {
                result.push_str("\\20");
            }
            // # needs escaping only at start
            '#' if is_first => {
                result.push_str("\\23");
            }
            _ => {
                result.push(ch);
            }
        }
    }

    result
}

/// Extract the CN value from the leading RDN of a DN.
///
/// Returns `None` when the first RDN is not a CN component.
#[must_use]
pub fn cn_from_dn(dn: &str) -> Option<String> {
    let first_rdn = dn.split(',').next()?;
    let (attr, value) = first_rdn.split_once('=')?;
    if attr.trim().eq_ignore_ascii_case("cn") {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    } else {
        None
    }
}

/// True when `dn` falls under `base` (case-insensitive suffix match).
///
/// Used to classify member DNs: entries under the people base are users,
/// everything else is treated as a nested group.
#[must_use]
pub fn dn_under_base(dn: &str, base: &str) -> bool {
    if base.is_empty() {
        return false;
    }
    dn.to_lowercase().ends_with(&base.to_lowercase())
}
