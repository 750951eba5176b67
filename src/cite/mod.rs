use url::Url;

use crate::{driver::UiDriver, store::ResultStore};

pub mod video;
pub mod website;

/// Host suffix that routes a URL to the video strategy.
pub const VIDEO_DOMAIN: &str = "youtube.com";

/// What happened to one input record, for progress reporting only; reasons
/// and citations live in the [`ResultStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Cited,
    NotFound,
    Failed,
    /// URL already resolved earlier in this run.
    Skipped,
    /// Resource type we do not handle.
    Ignored,
}

/// Routes each record to its citation strategy and records the result.
pub struct Citer<'a> {
    driver: &'a dyn UiDriver,
    video: video::VideoApi,
}

impl<'a> Citer<'a> {
    pub fn new(driver: &'a dyn UiDriver, api_key: Option<String>) -> Self {
        Citer {
            driver,
            video: video::VideoApi::new(api_key),
        }
    }

    /// Cite one record. Only "website" resources are handled; anything else
    /// is dropped without a trace. A URL already present in either result
    /// map is never reprocessed, so the first outcome wins across duplicate
    /// type/date buckets.
    pub fn cite(
        &self,
        store: &mut ResultStore,
        access_date: &str,
        resource_type: &str,
        url: &str,
    ) -> Outcome {
        if resource_type != "website" {
            return Outcome::Ignored;
        }
        if store.contains(url) {
            return Outcome::Skipped;
        }

        if is_video_url(url) {
            match self.video.cite(access_date, url) {
                Ok(citation) => {
                    store.record_success(url, citation);
                    Outcome::Cited
                }
                Err(err) => {
                    store.record_failure(url, err.to_string());
                    Outcome::Failed
                }
            }
        } else {
            match website::cite(self.driver, access_date, url) {
                Ok(website::Lookup::Cited(citation)) => {
                    store.record_success(url, citation);
                    Outcome::Cited
                }
                Ok(website::Lookup::NotFound) => {
                    store.record_failure(url, "URL not found");
                    Outcome::NotFound
                }
                Err(err) => {
                    store.record_failure(url, err.to_string());
                    Outcome::Failed
                }
            }
        }
    }
}

/// A URL is a video link when its host is the video platform's domain or a
/// subdomain of it, regardless of path or query structure.
pub fn is_video_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    match url.host_str() {
        Some(host) => host == VIDEO_DOMAIN || host.ends_with(&format!(".{VIDEO_DOMAIN}")),
        None => false,
    }
}
