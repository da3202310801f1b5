use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const RECRUITMENT_PAGE_SIZE: i64 = 5;
pub const COMPANY_PAGE_SIZE: i64 = 5;
pub const RESUME_PAGE_SIZE: i64 = 5;
pub const COMMENT_PAGE_SIZE: i64 = 10;
pub const APPLY_PAGE_SIZE: i64 = 10;
pub const ADMIN_PAGE_SIZE: i64 = 100;

/// `?page=N` query parameter. Missing means the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(query: &PageQuery, size: i64) -> Result<Self, AppError> {
        let number = match query.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(invalid_page)?,
        };
        // offset() must stay representable
        (number - 1).checked_mul(size).ok_or_else(invalid_page)?;
        Ok(PageRequest { number, size })
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}

/// One page of results with neighbour page numbers.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Builds a page; asking past the last page is a 404, except that the
    /// first page of an empty listing is always valid.
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Result<Self, AppError> {
        let last = last_page(count, request.size);
        if request.number > last {
            return Err(invalid_page());
        }
        Ok(Page {
            count,
            page: request.number,
            next: (request.number < last).then_some(request.number + 1),
            previous: (request.number > 1).then_some(request.number - 1),
            results,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn last_page(count: i64, size: i64) -> i64 {
    if count <= 0 {
        1
    } else {
        (count + size - 1) / size
    }
}

fn invalid_page() -> AppError {
    AppError::NotFound("Invalid page.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_to_first_page() {
        let req = PageRequest::new(&query(None), 5).unwrap();
        assert_eq!(req.number, 1);
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), 5);
    }

    #[test]
    fn test_offset_uses_page_size() {
        let req = PageRequest::new(&query(Some("3")), 10).unwrap();
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        assert!(PageRequest::new(&query(Some("0")), 5).is_err());
        assert!(PageRequest::new(&query(Some("abc")), 5).is_err());
        assert!(PageRequest::new(&query(Some("-2")), 5).is_err());
    }

    #[test]
    fn test_huge_page_number_is_not_found() {
        let huge = i64::MAX.to_string();
        assert!(matches!(
            PageRequest::new(&query(Some(&huge)), 5),
            Err(AppError::NotFound(_))
        ));

        let largest = (i64::MAX / 5 + 1).to_string();
        let req = PageRequest::new(&query(Some(&largest)), 5).unwrap();
        assert_eq!(req.offset(), (i64::MAX / 5) * 5);
    }

    #[test]
    fn test_neighbours() {
        let req = PageRequest::new(&query(Some("2")), 5).unwrap();
        let page = Page::new(req, 12, vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.next, Some(3));

        let last = PageRequest::new(&query(Some("3")), 5).unwrap();
        let page = Page::new(last, 12, vec![11, 12]).unwrap();
        assert_eq!(page.next, None);
    }

    #[test]
    fn test_empty_listing_first_page_is_valid() {
        let req = PageRequest::new(&query(None), 5).unwrap();
        let page: Page<i32> = Page::new(req, 0, vec![]).unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }

    #[test]
    fn test_past_last_page_is_not_found() {
        let req = PageRequest::new(&query(Some("4")), 5).unwrap();
        assert!(matches!(
            Page::<i32>::new(req, 15, vec![]),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_map_keeps_metadata() {
        let req = PageRequest::new(&query(None), 2).unwrap();
        let page = Page::new(req, 3, vec![1, 2]).unwrap().map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.next, Some(2));
    }
}
