// src/core/commons.rs

/// Wraps a value in double quotes, escaping any quotes inside it.
pub fn wrap_value(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// The last path segment of a `std::any::type_name`, without generic arguments.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_value_escapes_quotes() {
        assert_eq!(wrap_value("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("anvil::facets::build::BuildFacet"), "BuildFacet");
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec");
        assert_eq!(short_type_name("u8"), "u8");
    }
}
