//! Page-based listings and the "load more" merge.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatorInfo {
    pub current_page: u32,
    pub last_page: u32,
    pub total: u32,
}

impl PaginatorInfo {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_more_pages().then(|| self.current_page + 1)
    }
}

/// One page of a `getAll…` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub paginator_info: PaginatorInfo,
}

/// Items that can be told apart across pages
pub trait Identified {
    fn uuid(&self) -> &str;
}

/// Append `next` to `previous`, skipping items already listed.
///
/// Order is preserved: previous items first, then new items as the server
/// returned them. The paginator info is taken from `next`.
pub fn merge_page<T: Identified>(previous: Page<T>, next: Page<T>) -> Page<T> {
    let mut seen: HashSet<String> = previous.data.iter().map(|i| i.uuid().to_string()).collect();
    let mut data = previous.data;

    for item in next.data {
        if seen.insert(item.uuid().to_string()) {
            data.push(item);
        }
    }

    Page {
        data,
        paginator_info: next.paginator_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        uuid: String,
        name: String,
    }

    impl Identified for Item {
        fn uuid(&self) -> &str {
            &self.uuid
        }
    }

    fn item(uuid: &str, name: &str) -> Item {
        Item {
            uuid: uuid.to_string(),
            name: name.to_string(),
        }
    }

    fn info(current_page: u32, last_page: u32) -> PaginatorInfo {
        PaginatorInfo {
            current_page,
            last_page,
            total: 0,
        }
    }

    #[rstest]
    #[case(1, 3, Some(2))]
    #[case(3, 3, None)]
    #[case(1, 1, None)]
    #[case(0, 0, None)]
    fn test_next_page(#[case] current: u32, #[case] last: u32, #[case] expected: Option<u32>) {
        assert_eq!(info(current, last).next_page(), expected);
    }

    #[test]
    fn test_merge_skips_duplicates_and_keeps_order() {
        let first = Page {
            data: vec![item("a", "Alpha"), item("b", "Bravo")],
            paginator_info: info(1, 2),
        };
        let second = Page {
            data: vec![item("b", "Bravo (moved)"), item("c", "Charlie")],
            paginator_info: info(2, 2),
        };

        let merged = merge_page(first, second);

        assert_eq!(
            merged.data,
            vec![item("a", "Alpha"), item("b", "Bravo"), item("c", "Charlie")]
        );
        assert_eq!(merged.paginator_info, info(2, 2));
        assert!(!merged.paginator_info.has_more_pages());
    }

    #[test]
    fn test_page_deserializes_server_shape() {
        let page: Page<Item> = serde_json::from_value(json!({
            "data": [{ "uuid": "a", "name": "Alpha" }],
            "paginatorInfo": { "currentPage": 1, "lastPage": 4, "total": 31 }
        }))
        .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.paginator_info.total, 31);
        assert_eq!(page.paginator_info.next_page(), Some(2));
    }

    #[test]
    fn test_page_without_data_is_empty() {
        let page: Page<Item> = serde_json::from_value(json!({
            "data": [],
            "paginatorInfo": { "currentPage": 1, "lastPage": 1, "total": 0 }
        }))
        .unwrap();

        assert!(page.data.is_empty());
    }
}
