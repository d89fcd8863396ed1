/// Prefixes `https://` onto links typed without a scheme.
pub fn format_link(link: &str) -> String {
    if link.contains("http") {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_scheme_to_bare_domains() {
        assert_eq!(format_link("example.com/deck"), "https://example.com/deck");
    }

    #[test]
    fn keeps_links_with_scheme() {
        assert_eq!(format_link("http://example.com"), "http://example.com");
        assert_eq!(format_link("https://example.com"), "https://example.com");
    }
}
