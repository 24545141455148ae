use serde::Deserialize;
use url::Url;

/// Pagination envelope returned alongside every list
///
/// `next`/`previous` are page numbers, zero when there is no such page
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(default)]
    pub next: u32,

    #[serde(default)]
    pub previous: u32,

    #[serde(default)]
    pub count: u32,

    #[serde(default)]
    pub current: u32,

    #[serde(default)]
    pub total_pages: u32,

    #[serde(default)]
    pub start_index: u32,

    #[serde(default)]
    pub end_index: u32,
}

impl Pagination {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next > 0
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.previous > 0
    }
}

/// One page of objects
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub pagination: Pagination,

    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Query parameters accepted by list endpoints
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    search: Option<String>,
    ordering: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    // query_pairs_mut leaves a dangling "?" when nothing is appended
    pub(crate) fn apply(&self, url: &mut Url) {
        if self.search.is_none()
            && self.ordering.is_none()
            && self.page.is_none()
            && self.page_size.is_none()
        {
            return;
        }

        let mut pairs = url.query_pairs_mut();

        if let Some(search) = &self.search {
            pairs.append_pair("search", search);
        }

        if let Some(ordering) = &self.ordering {
            pairs.append_pair("ordering", ordering);
        }

        if let Some(page) = self.page {
            pairs.append_pair("page", &page.to_string());
        }

        if let Some(page_size) = self.page_size {
            pairs.append_pair("page_size", &page_size.to_string());
        }
    }
}
