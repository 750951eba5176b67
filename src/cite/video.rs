use anyhow::{Context, anyhow};
use serde_json::Value;
use url::Url;

/// Video list endpoint of the metadata API.
pub const API_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Fast path for video links: one metadata lookup instead of a browser run.
///
/// The key is optional at construction so a keyless run still starts; each
/// video lookup then fails on its own, like any other per-URL error.
pub struct VideoApi {
    api_key: Option<String>,
}

impl VideoApi {
    pub fn new(api_key: Option<String>) -> Self {
        VideoApi { api_key }
    }

    pub fn cite(&self, access_date: &str, url: &str) -> anyhow::Result<String> {
        let id = video_id(url)?;
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("no video API key configured"))?;
        let snippet = fetch_snippet(&id, key)?;
        format_citation(&snippet, access_date, url)
    }
}

/// Pull the video identifier out of the `v` query parameter.
pub fn video_id(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw).with_context(|| format!("invalid URL {raw}"))?;
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| anyhow!("missing 'v' query parameter in {raw}"))
}

fn fetch_snippet(id: &str, key: &str) -> anyhow::Result<Value> {
    let endpoint = Url::parse_with_params(
        API_ENDPOINT,
        &[("part", "snippet"), ("id", id), ("key", key)],
    )?;
    let body: String = ureq::get(endpoint.as_str())
        .call()
        .with_context(|| format!("metadata request failed for video {id}"))?
        .body_mut()
        .read_to_string()?;

    let payload: Value = serde_json::from_str(&body)
        .with_context(|| format!("malformed metadata response for video {id}"))?;
    payload
        .get("items")
        .and_then(|items| items.get(0))
        .and_then(|item| item.get("snippet"))
        .cloned()
        .ok_or_else(|| anyhow!("no metadata returned for video {id}"))
}

fn format_citation(snippet: &Value, access_date: &str, url: &str) -> anyhow::Result<String> {
    let channel = snippet_str(snippet, "channelTitle")?;
    let published = snippet_str(snippet, "publishedAt")?;
    let title = snippet_str(snippet, "title")?;
    // Publish year is the leading YYYY of the ISO-ish timestamp.
    let year = published
        .get(..4)
        .ok_or_else(|| anyhow!("malformed publishedAt timestamp: {published}"))?;

    Ok(format!(
        "{channel}. {year}. {title}. [online] Available at: <{url}> [Accessed {access_date}]."
    ))
}

fn snippet_str<'a>(snippet: &'a Value, field: &str) -> anyhow::Result<&'a str> {
    snippet
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("metadata response missing snippet field {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_id_from_watch_url() {
        let id = video_id("https://youtube.com/watch?v=abc123").expect("id");
        assert_eq!(id, "abc123");
    }

    #[test]
    fn video_id_ignores_other_parameters() {
        let id = video_id("https://www.youtube.com/watch?t=42&v=xyz&list=PL1").expect("id");
        assert_eq!(id, "xyz");
    }

    #[test]
    fn missing_v_parameter_is_an_error_not_a_crash() {
        let err = video_id("https://youtube.com/watch?list=PL1").expect_err("no id");
        assert!(err.to_string().contains("missing 'v' query parameter"));
    }

    #[test]
    fn unparseable_url_is_an_error() {
        assert!(video_id("not a url").is_err());
    }

    #[test]
    fn citation_matches_expected_shape() {
        let snippet = json!({
            "channelTitle": "Acme",
            "publishedAt": "2021-07-01T00:00:00Z",
            "title": "Demo",
        });
        let citation = format_citation(
            &snippet,
            "2023-05-01",
            "https://youtube.com/watch?v=abc123",
        )
        .expect("citation");
        assert_eq!(
            citation,
            "Acme. 2021. Demo. [online] Available at: \
             <https://youtube.com/watch?v=abc123> [Accessed 2023-05-01]."
        );
    }

    #[test]
    fn missing_snippet_field_is_reported() {
        let snippet = json!({ "channelTitle": "Acme", "publishedAt": "2021-07-01T00:00:00Z" });
        let err = format_citation(&snippet, "2023-05-01", "u").expect_err("no title");
        assert!(err.to_string().contains("missing snippet field title"));
    }

    #[test]
    fn truncated_timestamp_is_reported() {
        let snippet = json!({ "channelTitle": "A", "publishedAt": "21", "title": "T" });
        let err = format_citation(&snippet, "2023-05-01", "u").expect_err("short timestamp");
        assert!(err.to_string().contains("malformed publishedAt"));
    }

    #[test]
    fn keyless_lookup_fails_per_url() {
        let api = VideoApi::new(None);
        let err = api
            .cite("2023-05-01", "https://youtube.com/watch?v=abc123")
            .expect_err("no key");
        assert!(err.to_string().contains("no video API key"));
    }
}
