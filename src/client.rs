use fantoccini::{
    Client, ClientBuilder,
    wd::Capabilities,
};
use serde_json::json;
use tokio::time::Duration;

use crate::types::WebbotError;

/// Configuration options for initializing a browser session.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Whether the browser should run in headless mode.
    pub headless: bool,
    /// Optional window dimensions (width, height).
    pub window_size: Option<(u32, u32)>,
    /// WebDriver server address.
    pub webdriver_url: String,
    /// Timeout for bounded element waits, in seconds.
    pub timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            window_size: Some((1920, 1080)),
            webdriver_url: "http://localhost:4444".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserOptions {
    /// Creates a new `BrowserOptions` instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets headless mode (true = no UI).
    pub fn headless(mut self, enabled: bool) -> Self {
        self.headless = enabled;
        self
    }

    /// Sets the browser window size.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Sets the WebDriver server address (geckodriver, usually port 4444).
    pub fn webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    /// Sets the timeout for bounded waits (in seconds).
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }
}

/// High-level browser automation client powered by `fantoccini`.
///
/// One instance owns one WebDriver session; the session is released by
/// [`BrowserClient::shutdown`], which consumes the client.
pub struct BrowserClient {
    /// The underlying WebDriver client instance.
    pub client: Client,
    /// Upper bound for bounded element waits.
    timeout: Duration,
}

impl BrowserClient {
    /// Connects to the WebDriver server with the given options and returns a
    /// `BrowserClient`.
    pub async fn connect(options: BrowserOptions) -> Result<Self, WebbotError> {
        let mut caps = Capabilities::new();

        let firefox_options = json!({
            "args": if options.headless {
                vec!["-headless"]
            } else {
                vec![]
            }
        });
        caps.insert("moz:firefoxOptions".to_string(), firefox_options);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| WebbotError::ConnectionError(e.to_string()))?;

        if let Some((width, height)) = options.window_size {
            client
                .set_window_size(width, height)
                .await
                .map_err(|e| WebbotError::OperationError(e.to_string()))?;
        }

        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }

    /// Navigates the session to the given URL.
    pub async fn navigate(&mut self, url: &str) -> Result<(), WebbotError> {
        self.client
            .goto(url)
            .await
            .map_err(|e| WebbotError::OperationError(e.to_string()))
    }

    /// Waits for an element matching the CSS selector to appear.
    /// Returns `true` if found, `false` if it times out.
    ///
    /// The synthesized step interpreter deliberately uses fixed settle sleeps
    /// instead; this bounded wait is part of the driver surface for scripts
    /// layered on top of the client.
    pub async fn wait_for_element(&mut self, selector: &str) -> Result<bool, WebbotError> {
        match self
            .client
            .wait()
            .at_most(self.timeout)
            .for_element(fantoccini::Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Scrolls an element matching the CSS selector into view.
    pub async fn scroll_to(&mut self, selector: &str) -> Result<(), WebbotError> {
        let js = r#"
        const el = document.querySelector(arguments[0]);
        if (el) {
            el.scrollIntoView({ behavior: 'smooth', block: 'center', inline: 'center' });
            return true;
        }
        return false;
        "#;

        let res = self
            .client
            .execute(js, vec![json!(selector)])
            .await
            .map_err(|e| WebbotError::OperationError(e.to_string()))?;

        match res.as_bool() {
            Some(true) => Ok(()),
            _ => Err(WebbotError::OperationError(format!(
                "Element not found or failed to scroll: {selector}"
            ))),
        }
    }

    /// Returns the full page source HTML of the current tab.
    pub async fn source(&mut self) -> Result<String, WebbotError> {
        self.client
            .source()
            .await
            .map_err(|e| WebbotError::OperationError(e.to_string()))
    }

    /// Shuts down the browser session and closes the WebDriver connection.
    pub async fn shutdown(self) -> Result<(), WebbotError> {
        self.client
            .close()
            .await
            .map_err(|e| WebbotError::OperationError(e.to_string()))
    }
}
