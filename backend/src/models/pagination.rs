use serde::{Deserialize, Serialize};

use crate::error::{FieldErrors, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 1000;

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Raw `page`/`pageSize` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl Pagination {
    /// Parses the raw query values, reporting bad ones as field errors.
    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> Result<Self> {
        let mut errors = FieldErrors::new();
        let page = parse_number(page, DEFAULT_PAGE, "page", 1, u32::MAX, &mut errors);
        let page_size = parse_number(
            page_size,
            DEFAULT_PAGE_SIZE,
            "pageSize",
            1,
            MAX_PAGE_SIZE,
            &mut errors,
        );
        errors.into_result()?;
        Ok(Self { page, page_size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Cuts this page out of an already filtered and sorted list.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(offset)
            .take(self.page_size as usize)
            .collect()
    }
}

fn parse_number(
    raw: Option<&str>,
    default: u32,
    field: &str,
    min: u32,
    max: u32,
    errors: &mut FieldErrors,
) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return default;
    };

    match raw.parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => value,
        Ok(_) => {
            errors.add(field, format!("{} must be between {} and {}", field, min, max));
            default
        }
        Err(_) => {
            errors.add(field, format!("{} must be a positive integer", field));
            default
        }
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
            total,
        }
    }
}
