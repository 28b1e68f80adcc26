//! URL construction helpers for the civitai API.
//!
//! Pure functions so every request is built the same way.

use ::url::Url;

/// The two archivable resource kinds and their endpoint segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Models,
    Images,
}

impl ResourceKind {
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::Images => "images",
        }
    }

    /// Singular noun for log messages.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Models => "model",
            Self::Images => "image",
        }
    }
}

fn with_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/{segment}"));
    url.set_query(None);
    url
}

/// First listing page URL: `<base>/<kind>` plus caller-supplied `key=value`
/// parameters, passed through verbatim.
pub fn build_listing_url(base: &Url, kind: ResourceKind, params: &[String]) -> Url {
    let mut url = with_segment(base, kind.path_segment());

    let query = params
        .iter()
        .map(|p| p.trim().trim_start_matches(['?', '&']))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("&");

    if !query.is_empty() {
        url.set_query(Some(&query));
    }
    url
}

/// Detail URL of a single item: `<base>/<kind>/<id>`.
pub fn build_detail_url(base: &Url, kind: ResourceKind, id: u64) -> Url {
    with_segment(base, &format!("{}/{id}", kind.path_segment()))
}
