//! Page requests, sort allow-lists and page metadata for list operations.
//!
//! A [`PageRequest`] is raw caller input. Services validate it against a
//! per-operation sort allow-list, which yields a [`Pagination`] that stores
//! receive. A store therefore never sees a sort column outside the list it
//! was validated against.

use crate::validation::Validator;
use serde::Serialize;

/// Validation key for the page number.
pub const PAGE_FIELD: &str = "page";
/// Validation key for the page size.
pub const PAGE_SIZE_FIELD: &str = "page_size";
/// Validation key for the sort parameter.
pub const SORT_FIELD: &str = "sort";

/// Smallest accepted page number.
pub const MIN_PAGE: u32 = 1;
/// Largest accepted page number.
pub const MAX_PAGE: u32 = 10_000_000;
/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort allow-list for operations that only support their default order.
pub const DEFAULT_SORT_SAFELIST: &[&str] = &[""];

const DESCENDING_SUFFIX: &str = "_desc";

/// Unvalidated pagination input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
    sort: String,
}

impl PageRequest {
    /// Creates a page request. The sort key is matched case-insensitively.
    #[must_use]
    pub fn new(page: u32, page_size: u32, sort: impl Into<String>) -> Self {
        Self {
            page,
            page_size,
            sort: sort.into().to_ascii_lowercase(),
        }
    }

    /// Requests the first page of `page_size` items in default order.
    ///
    /// The default order is the first column of the operation's allow-list.
    #[must_use]
    pub fn first(page_size: u32) -> Self {
        Self::new(MIN_PAGE, page_size, "")
    }

    /// Sets the sort key.
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into().to_ascii_lowercase();
        self
    }

    /// Records any pagination errors in `validator`.
    ///
    /// Returns the validated [`Pagination`] when the page, the page size and
    /// the sort key are all acceptable, or `None` otherwise.
    pub fn validate(&self, validator: &mut Validator, safelist: &[&str]) -> Option<Pagination> {
        let mut local = Validator::new();
        local.check_at_least(self.page, MIN_PAGE, PAGE_FIELD);
        local.check_at_most(self.page, MAX_PAGE, PAGE_FIELD);
        local.check_at_least(self.page_size, MIN_PAGE_SIZE, PAGE_SIZE_FIELD);
        local.check_at_most(self.page_size, MAX_PAGE_SIZE, PAGE_SIZE_FIELD);

        let sort = self.safe_sort(safelist);
        local.check(sort.is_some(), SORT_FIELD, "Unsupported sort.");

        for (field, message) in local.errors() {
            validator.add_error(field, message.clone());
        }
        if local.has_errors() {
            return None;
        }
        sort.map(|order| Pagination {
            page: self.page,
            page_size: self.page_size,
            sort: order,
        })
    }

    fn safe_sort(&self, safelist: &[&str]) -> Option<SortOrder> {
        if self.sort.is_empty() {
            return safelist.first().map(|column| SortOrder {
                column: column.to_ascii_lowercase(),
                descending: false,
            });
        }
        safelist.iter().find_map(|safe| {
            let column = safe.to_ascii_lowercase();
            if self.sort == column {
                return Some(SortOrder {
                    column,
                    descending: false,
                });
            }
            let descending = self
                .sort
                .strip_suffix(DESCENDING_SUFFIX)
                .is_some_and(|stem| stem == column);
            descending.then_some(SortOrder {
                column,
                descending: true,
            })
        })
    }
}

/// Sort column and direction taken from an allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    column: String,
    descending: bool,
}

impl SortOrder {
    /// Returns the lowercase column name; empty means default order.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns `true` for descending order.
    #[must_use]
    pub const fn is_descending(&self) -> bool {
        self.descending
    }
}

/// Validated pagination handed to stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
    sort: SortOrder,
}

impl Pagination {
    /// Returns the 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns the validated sort order.
    #[must_use]
    pub const fn sort(&self) -> &SortOrder {
        &self.sort
    }

    /// Returns the maximum number of items on the page.
    #[must_use]
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }

    /// Returns the number of items preceding the page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let skipped = u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }

    /// Slices one page out of a fully filtered and ordered result set.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let page_items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect();
        Page {
            items: page_items,
            metadata: PageMetadata::calculate(
                self.page,
                self.page_size,
                u64::try_from(total).unwrap_or(u64::MAX),
            ),
        }
    }
}

/// Page position information returned with list results.
///
/// All fields are zero when there are no records at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Requested page.
    pub current_page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Always 1 when any records exist.
    pub first_page: u32,
    /// Last non-empty page.
    pub last_page: u64,
    /// Records across all pages.
    pub total_records: u64,
}

impl PageMetadata {
    /// Computes metadata for `total_records` split into `page_size` pages.
    #[must_use]
    pub fn calculate(page: u32, page_size: u32, total_records: u64) -> Self {
        if total_records == 0 || page_size == 0 {
            return Self::default();
        }
        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: total_records.div_ceil(u64::from(page_size)),
            total_records,
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Position information.
    pub metadata: PageMetadata,
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_SORT_SAFELIST, PageMetadata, PageRequest};
    use crate::validation::Validator;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, Some("page"))]
    #[case(10_000_001, 10, Some("page"))]
    #[case(1, 0, Some("page_size"))]
    #[case(1, 101, Some("page_size"))]
    #[case(10_000_000, 100, None)]
    fn rejects_out_of_range_pages(
        #[case] page: u32,
        #[case] page_size: u32,
        #[case] failing_field: Option<&str>,
    ) {
        let mut validator = Validator::new();
        let pagination =
            PageRequest::new(page, page_size, "").validate(&mut validator, DEFAULT_SORT_SAFELIST);

        match failing_field {
            Some(field) => {
                assert!(pagination.is_none());
                assert!(validator.error(field).is_some());
            }
            None => {
                assert!(pagination.is_some());
                assert!(!validator.has_errors());
            }
        }
    }

    #[rstest]
    #[case("name", Some(("name", false)))]
    #[case("NAME_DESC", Some(("name", true)))]
    #[case("id", None)]
    #[case("name_asc", None)]
    #[case("", Some(("name", false)))]
    fn sort_must_be_allow_listed(#[case] sort: &str, #[case] expected: Option<(&str, bool)>) {
        let mut validator = Validator::new();
        let pagination = PageRequest::new(1, 20, sort).validate(&mut validator, &["name"]);

        let actual = pagination
            .as_ref()
            .map(|p| (p.sort().column(), p.sort().is_descending()));
        assert_eq!(actual, expected);
        if expected.is_none() {
            assert_eq!(validator.error("sort"), Some("Unsupported sort."));
        }
    }

    #[rstest]
    fn offset_and_limit_follow_page() {
        let mut validator = Validator::new();
        let Some(pagination) =
            PageRequest::new(3, 25, "").validate(&mut validator, DEFAULT_SORT_SAFELIST)
        else {
            panic!("expected valid pagination");
        };
        assert_eq!(pagination.limit(), 25);
        assert_eq!(pagination.offset(), 50);
    }

    #[rstest]
    fn paginate_slices_and_counts() {
        let mut validator = Validator::new();
        let Some(pagination) =
            PageRequest::new(2, 2, "").validate(&mut validator, DEFAULT_SORT_SAFELIST)
        else {
            panic!("expected valid pagination");
        };
        let page = pagination.paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.metadata.total_records, 5);
        assert_eq!(page.metadata.last_page, 3);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(20, 2)]
    #[case(21, 3)]
    fn metadata_rounds_last_page_up(#[case] total: u64, #[case] last_page: u64) {
        let expected = PageMetadata {
            current_page: 1,
            page_size: 10,
            first_page: 1,
            last_page,
            total_records: total,
        };
        assert_eq!(PageMetadata::calculate(1, 10, total), expected);
    }

    #[rstest]
    fn metadata_is_empty_without_records() {
        assert_eq!(PageMetadata::calculate(1, 10, 0), PageMetadata::default());
    }
}
