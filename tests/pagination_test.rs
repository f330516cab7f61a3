//! Pagination behavior of the known-site adapter: page limits, next-control
//! detection, early stopping, and deadline expiry. All driven through a
//! stub fetcher, no network involved.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use reviewlens::adapter;
use reviewlens::error::{Result, ScrapeError};
use reviewlens::fetch::{Fetcher, PageContent};
use reviewlens::profile::PlatformProfile;
use reviewlens::utils::Deadline;

struct StubFetcher {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl StubFetcher {
    fn new(pages: &[(&str, &str)]) -> Self {
        StubFetcher {
            pages: pages
                .iter()
                .map(|(u, h)| (u.to_string(), h.to_string()))
                .collect(),
            requests: RefCell::new(Vec::new()),
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<PageContent> {
        self.requests.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .map(|html| PageContent {
                url: url.to_string(),
                html: html.clone(),
            })
            .ok_or_else(|| ScrapeError::FetchUnreachable(url.to_string()))
    }
}

fn profile() -> PlatformProfile {
    PlatformProfile {
        review_block: vec!["div.rev".into()],
        review_rating: vec!["span.rr".into()],
        review_text: vec!["p.rt".into()],
        next_page: vec!["a.next-link".into()],
        ..Default::default()
    }
}

fn page(reviews: &[&str], has_next: bool) -> String {
    let mut html = String::from("<html><body>");
    for text in reviews {
        html.push_str(&format!(
            r#"<div class="rev"><span class="rr">4</span><p class="rt">{}</p></div>"#,
            text
        ));
    }
    if has_next {
        html.push_str(r##"<a class="next-link" href="#">Next</a>"##);
    }
    html.push_str("</body></html>");
    html
}

const URL: &str = "https://shop.test/product-reviews/item1";

fn run(
    fetcher: &StubFetcher,
    first_page: &str,
    max_pages: usize,
    deadline: &Deadline,
) -> adapter::PaginatedReviews {
    adapter::scrape_reviews_paginated(
        fetcher,
        URL,
        first_page,
        &profile(),
        max_pages,
        (0, 0),
        deadline,
        true,
    )
}

#[test]
fn collects_across_pages_up_to_the_limit() {
    let p1 = page(&["First page review, long enough to count."], true);
    let p2 = page(&["Second page review, also long enough here."], true);
    let p3 = page(&["Third page review, still plenty of text."], true);
    let fetcher = StubFetcher::new(&[
        ("https://shop.test/product-reviews/item1?page=2", p2.as_str()),
        ("https://shop.test/product-reviews/item1?page=3", p3.as_str()),
        ("https://shop.test/product-reviews/item1?page=4", p3.as_str()),
    ]);

    let result = run(&fetcher, &p1, 3, &Deadline::none());

    // Page 3 still advertises a next control, but the cap wins
    assert_eq!(result.pages_fetched, 3);
    assert_eq!(result.reviews.len(), 3);
    assert_eq!(
        fetcher.requested(),
        vec![
            "https://shop.test/product-reviews/item1?page=2",
            "https://shop.test/product-reviews/item1?page=3",
        ]
    );
}

#[test]
fn stops_when_no_next_control() {
    let p1 = page(&["Only page of reviews, decently long text."], false);
    let fetcher = StubFetcher::new(&[]);

    let result = run(&fetcher, &p1, 3, &Deadline::none());

    assert_eq!(result.pages_fetched, 1);
    assert_eq!(result.reviews.len(), 1);
    assert!(fetcher.requested().is_empty());
}

#[test]
fn stops_when_a_later_page_is_empty() {
    let p1 = page(&["First page review, long enough to count."], true);
    let p2 = page(&[], true);
    let fetcher = StubFetcher::new(&[(
        "https://shop.test/product-reviews/item1?page=2",
        p2.as_str(),
    )]);

    let result = run(&fetcher, &p1, 3, &Deadline::none());

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.reviews.len(), 1);
}

#[test]
fn later_fetch_failure_keeps_earlier_reviews() {
    let p1 = page(&["First page review, long enough to count."], true);
    // No entry for page 2, so the stub errors
    let fetcher = StubFetcher::new(&[]);

    let result = run(&fetcher, &p1, 3, &Deadline::none());

    assert_eq!(result.pages_fetched, 1);
    assert_eq!(result.reviews.len(), 1);
}

#[test]
fn expired_deadline_returns_partial_results() {
    let p1 = page(&["First page review, long enough to count."], true);
    let p2 = page(&["Second page review, also long enough here."], true);
    let fetcher = StubFetcher::new(&[(
        "https://shop.test/product-reviews/item1?page=2",
        p2.as_str(),
    )]);

    let deadline = Deadline::after(Duration::from_secs(0));
    let result = run(&fetcher, &p1, 3, &deadline);

    assert_eq!(result.pages_fetched, 1);
    assert_eq!(result.reviews.len(), 1);
    assert!(fetcher.requested().is_empty());
}

#[test]
fn custom_page_param_used_in_urls() {
    let p1 = page(&["First page review, long enough to count."], true);
    let p2 = page(&["Second page review, also long enough here."], false);
    let fetcher = StubFetcher::new(&[(
        "https://shop.test/product-reviews/item1?pageNumber=2",
        p2.as_str(),
    )]);

    let prof = PlatformProfile {
        page_param: "pageNumber".into(),
        ..profile()
    };
    let result = adapter::scrape_reviews_paginated(
        &fetcher,
        URL,
        &p1,
        &prof,
        3,
        (0, 0),
        &Deadline::none(),
        true,
    );

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(
        fetcher.requested(),
        vec!["https://shop.test/product-reviews/item1?pageNumber=2"]
    );
}

#[test]
fn default_next_controls_apply_without_profile_ones() {
    // Profile configures no next selectors; an aria-label Next link on the
    // page still drives pagination.
    let mut p1 = page(&["First page review, long enough to count."], false);
    p1 = p1.replace(
        "</body>",
        r##"<a aria-label="Next" href="#">→</a></body>"##,
    );
    let p2 = page(&["Second page review, also long enough here."], false);
    let fetcher = StubFetcher::new(&[(
        "https://shop.test/product-reviews/item1?page=2",
        p2.as_str(),
    )]);

    let prof = PlatformProfile {
        next_page: Vec::new(),
        ..profile()
    };
    let result = adapter::scrape_reviews_paginated(
        &fetcher,
        URL,
        &p1,
        &prof,
        3,
        (0, 0),
        &Deadline::none(),
        true,
    );

    assert_eq!(result.pages_fetched, 2);
    assert_eq!(result.reviews.len(), 2);
}
