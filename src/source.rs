/// Short names for the published circle datasets.
const URL_MAP: [(&str, &str); 2] = [
    (
        "tbf4",
        "https://raw.githubusercontent.com/circle-scraper/data/master/tbf4_circles.csv",
    ),
    (
        "latest",
        "https://raw.githubusercontent.com/circle-scraper/data/master/latest_circles.csv",
    ),
];

/// Where a circle dataset comes from: an optional remote URL plus the local
/// file name it is cached under. Built once per invocation, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub alias: Option<String>,
    pub url: String,
    pub file_name: String,
}

impl Source {
    /// Resolves a user-supplied source string. Pure, no I/O:
    /// anything containing "http" is a direct URL, a known alias maps to its
    /// published URL, and everything else is a bare local file name.
    pub fn new(source: &str) -> Source {
        if source.contains("http") {
            return Source {
                alias: None,
                url: source.to_string(),
                file_name: base_name(source),
            };
        }
        if let Some((alias, url)) = URL_MAP.iter().find(|(alias, _)| *alias == source) {
            return Source {
                alias: Some(alias.to_string()),
                url: url.to_string(),
                file_name: base_name(url),
            };
        }
        Source {
            alias: None,
            url: String::new(),
            file_name: source.to_string(),
        }
    }

    /// True when no remote URL is known and the file must already exist.
    pub fn is_local(&self) -> bool {
        self.url.is_empty()
    }
}

fn base_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_to_mapped_url() {
        for alias in ["tbf4", "latest"] {
            let source = Source::new(alias);
            let expected_url = URL_MAP
                .iter()
                .find(|(a, _)| *a == alias)
                .map(|(_, url)| *url)
                .unwrap();
            assert_eq!(source.alias.as_deref(), Some(alias));
            assert_eq!(source.url, expected_url);
            assert_eq!(source.file_name, format!("{alias}_circles.csv"));
            assert!(!source.is_local());
        }
    }

    #[test]
    fn raw_url_passes_through_with_base_name() {
        let source = Source::new("http://example.com/data/test_circles.csv");
        assert_eq!(source.alias, None);
        assert_eq!(source.url, "http://example.com/data/test_circles.csv");
        assert_eq!(source.file_name, "test_circles.csv");
    }

    #[test]
    fn bare_file_name_resolves_to_local_only() {
        let source = Source::new("test_circles.csv");
        assert_eq!(source.alias, None);
        assert_eq!(source.url, "");
        assert_eq!(source.file_name, "test_circles.csv");
        assert!(source.is_local());
    }
}
