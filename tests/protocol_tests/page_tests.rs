//! Tests for Page
//!
//! These tests verify:
//! - 1-indexed paging with a partial last page
//! - Pages past the end are empty but keep their totals
//! - Invalid sizes are rejected and huge values never overflow

use nskv::protocol::Page;
use nskv::KvError;

#[test]
fn test_last_partial_page() {
    let page = Page::paginate((0..10).collect::<Vec<_>>(), 4, 3).unwrap();

    assert_eq!(page.items, vec![9]);
    assert_eq!(page.total, 10);
    assert_eq!(page.total_pages, 4);
}

#[test]
fn test_page_past_end_is_empty() {
    let page = Page::paginate((0..10).collect::<Vec<_>>(), 5, 3).unwrap();

    assert!(page.is_empty());
    assert_eq!(page.len(), 0);
    assert_eq!(page.total, 10);
    assert_eq!(page.total_pages, 4);
}

#[test]
fn test_page_zero_reads_as_first() {
    let page = Page::paginate(vec!["a", "b", "c"], 0, 2).unwrap();

    assert_eq!(page.items, vec!["a", "b"]);
    assert_eq!(page.page, 1);
}

#[test]
fn test_zero_page_size_rejected() {
    let result = Page::<u8>::bounds(3, 1, 0);

    assert!(matches!(result, Err(KvError::InvalidArgument(_))));
}

#[test]
fn test_huge_page_number_does_not_overflow() {
    let range = Page::<u8>::bounds(5, u64::MAX, u64::MAX).unwrap();

    assert_eq!(range, 5..5);
}

#[test]
fn test_empty_listing() {
    let page = Page::<u8>::paginate(Vec::new(), 1, 10).unwrap();

    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
}

#[test]
fn test_page_json_shape() {
    let page = Page::paginate(vec![1, 2, 3], 1, 2).unwrap();

    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["pageSize"], 2);
    assert_eq!(json["totalPages"], 2);
    assert_eq!(json["items"], serde_json::json!([1, 2]));
}
