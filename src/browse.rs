// src/browse.rs
use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// One live headless-Chrome session. Everything the harvester reads comes
/// through here; the session is constructed once in `main` and shared across
/// every category.
pub struct Session {
    client: Client,
}

impl Session {
    /// Connect to the WebDriver endpoint and open a headless Chrome session.
    pub async fn connect(webdriver_url: &str) -> Result<Self> {
        let mut caps = serde_json::map::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({
                "args": [
                    "--headless=new",
                    "--disable-gpu",
                    "--no-sandbox",
                    "--window-size=1920,1080",
                ],
            }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .with_context(|| format!("connecting to WebDriver at {}", webdriver_url))?;

        debug!(endpoint = webdriver_url, "browser session opened");
        Ok(Session { client })
    }

    /// Navigate the session to `url` and block until the navigation settles.
    pub async fn goto(&mut self, url: &Url) -> Result<(), CmdError> {
        self.client.goto(url.as_str()).await
    }

    /// Poll until an element matching `css` appears, up to `timeout`.
    /// Times out with `CmdError::WaitTimeout`.
    pub async fn wait_for_css(
        &mut self,
        css: &str,
        timeout: Duration,
    ) -> Result<Element, CmdError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(css))
            .await
    }

    /// Visible text of every element matching `css`, in document order.
    pub async fn texts_of_all(&mut self, css: &str) -> Result<Vec<String>, CmdError> {
        let elements = self.client.find_all(Locator::Css(css)).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            texts.push(element.text().await?);
        }
        Ok(texts)
    }

    /// Poll until an element matching `xpath` appears, then click it.
    /// An element that is present but not interactable fails the click.
    pub async fn click_when_ready(
        &mut self,
        xpath: &str,
        timeout: Duration,
    ) -> Result<(), CmdError> {
        let target = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::XPath(xpath))
            .await?;
        target.click().await?;
        Ok(())
    }

    /// Full rendered markup of the current page.
    pub async fn page_source(&mut self) -> Result<String, CmdError> {
        self.client.source().await
    }

    /// Shut the browser down. Must run on every exit path of the run.
    pub async fn close(self) -> Result<(), CmdError> {
        self.client.close().await
    }
}
