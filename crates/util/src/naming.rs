use heck::ToKebabCase;

/// Normalize a package or action name into the kebab-case identifier used in
/// run URLs (`"My Package"` becomes `"my-package"`).
pub fn to_kebab_case(name: &str) -> String {
    name.trim().to_kebab_case()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_spaces_underscores_and_camel_case() {
        assert_eq!(to_kebab_case("My Package"), "my-package");
        assert_eq!(to_kebab_case("create_ticket"), "create-ticket");
        assert_eq!(to_kebab_case("sendEmail"), "send-email");
        assert_eq!(to_kebab_case("  already-kebab "), "already-kebab");
    }
}
