use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::driver::UiDriver;

/// Entry point of the citation tool's website flow.
pub const CITE_URL: &str = "https://www.citethisforme.com/cite/website";

// The selectors below are the only coupling to the citation tool's markup.
const SEARCH_INPUT: &str = ".input-cite";
const ERROR_INDICATOR: &str = ".alert-error";
const FIRST_RESULT: &str = ".js-results-list li form button";
const CONTINUE_BUTTON: &str = ".continue-btn";
const REFERENCE_LIST: &str = ".reference-list";
const REFERENCE_STRING: &str = ".highlighted .reference-parts p span[id^='js-reference-string']";

/// Every navigation and element wait is bounded by this.
pub const NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one lookup. The tool not knowing a URL is a normal result,
/// reported via the error indicator on the search results page, not an error
/// of ours.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup {
    Cited(String),
    NotFound,
}

/// Drive the citation tool through search, candidate selection, two
/// confirmation pages and the bibliography page for a single URL.
///
/// Single attempt: any error at any step, including a timed-out wait, aborts
/// the lookup and becomes the failure reason for this URL alone.
pub fn cite(driver: &dyn UiDriver, access_date: &str, url: &str) -> anyhow::Result<Lookup> {
    driver.clear_cookies()?;
    driver.navigate(CITE_URL)?;

    // Search
    let before = driver.current_url();
    driver.submit_text(SEARCH_INPUT, url)?;
    driver.wait_for_url_change(&before, NAV_TIMEOUT)?;

    if driver.element_present(ERROR_INDICATOR)? {
        return Ok(Lookup::NotFound);
    }

    // Take the first candidate
    let before = driver.current_url();
    driver.click(FIRST_RESULT)?;
    driver.wait_for_url_change(&before, NAV_TIMEOUT)?;

    // Two confirmation pages, then the bibliography renders
    let before = driver.current_url();
    driver.click(CONTINUE_BUTTON)?;
    driver.wait_for_url_change(&before, NAV_TIMEOUT)?;
    driver.click(CONTINUE_BUTTON)?;
    driver.wait_for_element(REFERENCE_LIST, NAV_TIMEOUT)?;

    let rendered = driver.element_text(REFERENCE_STRING)?;
    Ok(Lookup::Cited(stamp_access_date(&rendered, access_date)))
}

static ACCESSED_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\[Accessed\b[^\]]*\]\.?$").unwrap());

/// Replace the tool's own trailing `[Accessed ...].` with the date the
/// resource was actually retrieved. The rendered text is whitespace-collapsed
/// first since the element's inner text can wrap across lines.
pub fn stamp_access_date(rendered: &str, access_date: &str) -> String {
    let flat = rendered.split_whitespace().collect::<Vec<_>>().join(" ");
    let base = ACCESSED_SUFFIX.replace(&flat, "");
    format!("{} [Accessed {access_date}].", base.trim_end())
}
