use std::{
    ffi::OsStr,
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use headless_chrome::{Browser, LaunchOptions, Tab, protocol::cdp::Network};

/// The narrow UI-automation surface the citation flow depends on.
///
/// Selectors are CSS. Everything the website strategy needs from a browser is
/// here and nothing more, so the fragile selectors stay in one module and the
/// protocol itself can be driven by a scripted fake in tests.
pub trait UiDriver {
    fn navigate(&self, url: &str) -> anyhow::Result<()>;
    /// Drop all cookies so each lookup starts from a clean session.
    fn clear_cookies(&self) -> anyhow::Result<()>;
    fn current_url(&self) -> String;
    /// Type into the element at `selector` and submit with a return keypress.
    fn submit_text(&self, selector: &str, text: &str) -> anyhow::Result<()>;
    /// Explicit presence query; absence is a regular `false`, not an error.
    fn element_present(&self, selector: &str) -> anyhow::Result<bool>;
    fn click(&self, selector: &str) -> anyhow::Result<()>;
    /// Block until the page URL differs from `from`, bounded by `timeout`.
    fn wait_for_url_change(&self, from: &str, timeout: Duration) -> anyhow::Result<()>;
    fn wait_for_element(&self, selector: &str, timeout: Duration) -> anyhow::Result<()>;
    fn element_text(&self, selector: &str) -> anyhow::Result<String>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// One headless Chrome with a single tab reused for every lookup. The
/// process is torn down when this is dropped, however many lookups failed.
pub struct ChromeDriver {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(binary: Option<PathBuf>) -> anyhow::Result<Self> {
        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            path: binary,
            args: vec![OsStr::new("--incognito")],
            // Lookups can be far apart when the video fast path dominates.
            idle_browser_timeout: Duration::from_secs(300),
            ..Default::default()
        };
        let browser = Browser::new(options).context("failed to launch browser")?;
        let tab = browser.new_tab().context("failed to open tab")?;
        Ok(ChromeDriver { _browser: browser, tab })
    }
}

impl UiDriver for ChromeDriver {
    fn navigate(&self, url: &str) -> anyhow::Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn clear_cookies(&self) -> anyhow::Result<()> {
        self.tab.call_method(Network::ClearBrowserCookies(None))?;
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn submit_text(&self, selector: &str, text: &str) -> anyhow::Result<()> {
        self.tab.find_element(selector)?.click()?;
        self.tab.type_str(text)?;
        self.tab.press_key("Enter")?;
        Ok(())
    }

    fn element_present(&self, selector: &str) -> anyhow::Result<bool> {
        Ok(self.tab.find_element(selector).is_ok())
    }

    fn click(&self, selector: &str) -> anyhow::Result<()> {
        self.tab.find_element(selector)?.click()?;
        Ok(())
    }

    fn wait_for_url_change(&self, from: &str, timeout: Duration) -> anyhow::Result<()> {
        let deadline = Instant::now() + timeout;
        while self.tab.get_url() == from {
            if Instant::now() >= deadline {
                bail!(
                    "timed out after {}s waiting for navigation away from {from}",
                    timeout.as_secs()
                );
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    fn wait_for_element(&self, selector: &str, timeout: Duration) -> anyhow::Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .with_context(|| format!("timed out waiting for {selector}"))?;
        Ok(())
    }

    fn element_text(&self, selector: &str) -> anyhow::Result<String> {
        Ok(self.tab.find_element(selector)?.get_inner_text()?)
    }
}
