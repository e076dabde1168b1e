// Common model types

use serde_json::Value;

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::decode;
use crate::error::{ClientError, Result};

/// Generic paginated response
#[derive(Clone, Debug, Default)]
pub struct Page<T> {
    pub total_count: u64,
    /// 1-based page number, echoing the request.
    pub page_number: u64,
    pub pages_available: u64,
    pub page_items: Vec<T>,
}

impl<T> Page<T> {
    /// Decode a page from its JSON form, using `decode_item` for each entry.
    /// Field names vary across server releases, so every field carries its
    /// historical aliases.
    pub(crate) fn from_json(
        value: &Value,
        decode_item: impl Fn(&Value) -> Result<T>,
    ) -> Result<Self> {
        let total_count = decode::get_u64(value, "totalCount", &["count", "total"])?.unwrap_or(0);
        let page_number = decode::get_u64(value, "pageNumber", &["pageNo"])?.unwrap_or(1);
        let pages_available = decode::get_u64(value, "pagesAvailable", &["pages"])?.unwrap_or(0);

        let raw_items = match value.get("pageItems").or_else(|| value.get("items")) {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Null) | None => &[],
            Some(other) => {
                return Err(ClientError::decode(format!(
                    "field 'pageItems' is not an array: {other}"
                )));
            }
        };
        let page_items = raw_items.iter().map(&decode_item).collect::<Result<_>>()?;

        Ok(Self {
            total_count,
            page_number,
            pages_available,
            page_items,
        })
    }
}

/// Pagination parameters, validated client-side before any network call.
#[derive(Clone, Copy, Debug)]
pub struct PageQuery {
    /// 1-based page number
    pub page_number: u32,
    /// Entries per page, at most [`MAX_PAGE_SIZE`]
    pub page_size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageQuery {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.page_number < 1 {
            return Err(ClientError::Validation(
                "pageNo must be >= 1".to_string(),
            ));
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(ClientError::Validation(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_from_json() {
        let value = json!({
            "totalCount": 10,
            "pageNumber": 2,
            "pagesAvailable": 5,
            "pageItems": ["a", "b"]
        });
        let page = Page::from_json(&value, |v| {
            decode::get_str(&json!({"v": v.clone()}), "v", &[]).map(|s| s.unwrap())
        })
        .unwrap();
        assert_eq!(page.total_count, 10);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.pages_available, 5);
        assert_eq!(page.page_items, vec!["a", "b"]);
    }

    #[test]
    fn test_page_from_json_aliases() {
        let value = json!({
            "count": 3,
            "pageNo": 1,
            "pages": 1,
            "items": []
        });
        let page: Page<String> = Page::from_json(&value, |_| Ok(String::new())).unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.pages_available, 1);
        assert!(page.page_items.is_empty());
    }

    #[test]
    fn test_page_items_not_an_array() {
        let value = json!({"totalCount": 1, "pageItems": "oops"});
        let result: Result<Page<String>> = Page::from_json(&value, |_| Ok(String::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_page_query_default() {
        let query = PageQuery::default();
        assert_eq!(query.page_number, 1);
        assert_eq!(query.page_size, 100);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_page_query_limits() {
        assert!(PageQuery::new(1, 500).validate().is_ok());
        assert!(matches!(
            PageQuery::new(1, 501).validate(),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            PageQuery::new(1, 0).validate(),
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            PageQuery::new(0, 10).validate(),
            Err(ClientError::Validation(_))
        ));
    }
}
