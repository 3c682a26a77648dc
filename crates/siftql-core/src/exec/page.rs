use serde::{Deserialize, Serialize};

///
/// Pagination contracts
///
/// Input (`Pageable`) and output (`Page`) payloads of the executor
/// interface. The compiler never sees these; they travel alongside the
/// compiled predicate.
///

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

///
/// SortKey
///
/// One sort criterion over a root-entity field.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

///
/// Pageable
///
/// Zero-based page index plus page size (clamped to a minimum of 1) and sort keys.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Pageable {
    page: u32,
    size: u32,
    sort: Vec<SortKey>,
}

impl Pageable {
    #[must_use]
    pub const fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: if size == 0 { 1 } else { size },
            sort: Vec::new(),
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }
}

///
/// Page
///
/// One page of results plus totals and navigation flags.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Page<T> {
    content: Vec<T>,
    page: u32,
    size: u32,
    total_elements: u64,
    total_pages: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let size = size.max(1);
        let total_pages = u32::try_from(total_elements.div_ceil(u64::from(size)))
            .unwrap_or(u32::MAX);

        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    #[must_use]
    pub const fn empty(page: u32, size: u32) -> Self {
        Self {
            content: Vec::new(),
            page,
            size,
            total_elements: 0,
            total_pages: 0,
        }
    }

    #[must_use]
    pub fn content(&self) -> &[T] {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn total_elements(&self) -> u64 {
        self.total_elements
    }

    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.page == 0
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        !self.has_next()
    }
}

///
/// TESTS
///
