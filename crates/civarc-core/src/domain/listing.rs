//! Listing page envelope shared by the model and image endpoints.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Pagination block of a listing response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub current_page: u64,
    /// URL of the following page. Absent, null, empty or non-string values
    /// all mean "last page".
    #[serde(default, deserialize_with = "deserialize_next_page")]
    pub next_page: Option<String>,
}

/// One page of a listing: pagination metadata plus the raw item records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl ListingPage {
    /// Build a terminal, single-page listing around already collected items.
    pub fn single(items: Vec<Value>) -> Self {
        Self {
            metadata: PageMetadata {
                total_items: items.len() as u64,
                total_pages: 1,
                current_page: 1,
                next_page: None,
            },
            items,
        }
    }

    /// The next page URL, if pagination should continue.
    pub fn next_page(&self) -> Option<&str> {
        self.metadata.next_page.as_deref()
    }
}

fn deserialize_next_page<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_listing_with_next_page() {
        let page: ListingPage = serde_json::from_value(json!({
            "metadata": {
                "totalItems": 120,
                "totalPages": 6,
                "currentPage": 1,
                "nextPage": "https://civitai.com/api/v1/models?page=2"
            },
            "items": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(page.metadata.total_items, 120);
        assert_eq!(page.items.len(), 2);
        assert_eq!(
            page.next_page(),
            Some("https://civitai.com/api/v1/models?page=2")
        );
    }

    #[test]
    fn test_missing_or_empty_next_page_terminates() {
        let absent: ListingPage =
            serde_json::from_value(json!({"metadata": {"currentPage": 3}, "items": []})).unwrap();
        assert_eq!(absent.next_page(), None);

        let empty: ListingPage =
            serde_json::from_value(json!({"metadata": {"nextPage": ""}, "items": []})).unwrap();
        assert_eq!(empty.next_page(), None);

        let numeric: ListingPage =
            serde_json::from_value(json!({"metadata": {"nextPage": 0}, "items": []})).unwrap();
        assert_eq!(numeric.next_page(), None);
    }

    #[test]
    fn test_single_page_is_terminal() {
        let page = ListingPage::single(vec![json!({"id": 7})]);
        assert_eq!(page.metadata.total_items, 1);
        assert_eq!(page.metadata.total_pages, 1);
        assert!(page.next_page().is_none());
    }
}
