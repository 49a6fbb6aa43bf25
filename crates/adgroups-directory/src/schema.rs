//! Active Directory schema constants for group entries.

use std::collections::HashSet;

/// Description stamped onto groups created by this service.
pub const MANAGED_GROUP_DESCRIPTION: &str = "test group created by web service";

/// `groupType` bitfield values.
///
/// The scope flags are mutually exclusive; the security bit is combined
/// with a scope. AD stores the value as a signed 32-bit integer, so
/// security-enabled group types serialize as negative numbers.
pub mod group_type {
    /// Global scope.
    pub const SCOPE_GLOBAL: i32 = 0x0000_0002;
    /// Domain-local scope.
    pub const SCOPE_DOMAIN_LOCAL: i32 = 0x0000_0004;
    /// Universal scope.
    pub const SCOPE_UNIVERSAL: i32 = 0x0000_0008;
    /// Security-enabled bit (distribution groups lack it).
    pub const SECURITY_ENABLED: i32 = 0x8000_0000_u32 as i32;

    /// Universal security group, the type created by this service.
    pub const UNIVERSAL_SECURITY: i32 = SCOPE_UNIVERSAL | SECURITY_ENABLED;

    /// True when the value carries the security-enabled bit.
    #[must_use]
    pub fn is_security_group(value: i32) -> bool {
        value & SECURITY_ENABLED != 0
    }
}

/// Build the attribute set for a new universal security group.
///
/// `cn` is expected to already be normalized (uppercased) by the caller.
/// `category` is the optional objectCategory schema DN; when `None` the
/// attribute is omitted and the server applies its default.
#[must_use]
pub fn new_group_attributes(
    cn: &str,
    category: Option<&str>,
) -> Vec<(String, HashSet<String>)> {
    let mut attrs = vec![
        (
            "objectClass".to_string(),
            HashSet::from(["top".to_string(), "group".to_string()]),
        ),
        ("cn".to_string(), HashSet::from([cn.to_string()])),
        (
            "sAMAccountName".to_string(),
            HashSet::from([cn.to_string()]),
        ),
        (
            "description".to_string(),
            HashSet::from([MANAGED_GROUP_DESCRIPTION.to_string()]),
        ),
        (
            "groupType".to_string(),
            HashSet::from([group_type::UNIVERSAL_SECURITY.to_string()]),
        ),
    ];
    if let Some(category) = category {
        attrs.push((
            "objectCategory".to_string(),
            HashSet::from([category.to_string()]),
        ));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_values<'a>(
        attrs: &'a [(String, HashSet<String>)],
        name: &str,
    ) -> Option<&'a HashSet<String>> {
        attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[test]
    fn test_universal_security_value() {
        // 0x80000008 as a signed 32-bit integer
        assert_eq!(group_type::UNIVERSAL_SECURITY, -2_147_483_640);
        assert_eq!(group_type::UNIVERSAL_SECURITY.to_string(), "-2147483640");
    }

    #[test]
    fn test_is_security_group() {
        assert!(group_type::is_security_group(group_type::UNIVERSAL_SECURITY));
        assert!(!group_type::is_security_group(group_type::SCOPE_GLOBAL));
        assert!(!group_type::is_security_group(group_type::SCOPE_UNIVERSAL));
    }

    #[test]
    fn test_new_group_attributes() {
        let attrs = new_group_attributes("INFRA", None);

        let classes = attr_values(&attrs, "objectClass").unwrap();
        assert!(classes.contains("top"));
        assert!(classes.contains("group"));

        assert!(attr_values(&attrs, "cn").unwrap().contains("INFRA"));
        assert!(attr_values(&attrs, "sAMAccountName")
            .unwrap()
            .contains("INFRA"));
        assert!(attr_values(&attrs, "groupType")
            .unwrap()
            .contains("-2147483640"));
        assert!(attr_values(&attrs, "objectCategory").is_none());
    }

    #[test]
    fn test_new_group_attributes_with_category() {
        let attrs = new_group_attributes(
            "INFRA",
            Some("CN=Group,CN=Schema,CN=Configuration,DC=example,DC=com"),
        );
        assert!(attr_values(&attrs, "objectCategory")
            .unwrap()
            .contains("CN=Group,CN=Schema,CN=Configuration,DC=example,DC=com"));
    }
}
