//! Query-string types accepted by the page handlers.

use serde::{Deserialize, Serialize};

/// `?page=` on listing pages. Kept raw so bad values can fall back to page 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

/// `?next=` carried through the login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// The redirect target if it is a path on this site.
    pub fn local_next(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(value: &str) -> NextQuery {
        NextQuery {
            next: Some(value.to_string()),
        }
    }

    #[test]
    fn only_local_paths_are_followed() {
        assert_eq!(next("/create/").local_next(), Some("/create/"));
        assert_eq!(next("//evil.example").local_next(), None);
        assert_eq!(next("https://evil.example/").local_next(), None);
        assert_eq!(NextQuery::default().local_next(), None);
    }
}
