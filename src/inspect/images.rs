//! Slide, infographic, and generic image recovery.
//!
//! Rendered images inside the target application are frequently behind
//! cookie-authenticated, CORS-restricted URLs. Drawing the already-rendered
//! `<img>` to an offscreen canvas and re-encoding it as a data URL rides on
//! the browser's native request pipeline, which has already applied the
//! session cookies — that is the whole reason the canvas step exists.

use base64::Engine as _;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::repository::Slide;

use super::engine::{ExtractionEngine, IMAGE_STRATEGY_TIMEOUT, POLL_INTERVAL};
use super::{FrameScope, TabId, scripts};

impl ExtractionEngine {
    /// Recovers a slide deck's rendered images as data URLs.
    ///
    /// Opens the artifact in a background tab and polls the known slide
    /// containers until they produce images or the deadline passes. The
    /// tab is closed on every exit path. Returns an empty deck on failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn slide_images(&self, notebook_id: &str, artifact_id: &str) -> Vec<Slide> {
        let url = format!("{}?artifact={artifact_id}", self.notebook_url(notebook_id));
        let tab = match self.open_settled_tab(&url, true).await {
            Ok(tab) => tab,
            Err(error) => {
                warn!(%error, "could not open slide tab");
                return Vec::new();
            }
        };
        let slides = self.poll_slide_images(tab).await;
        self.close_quietly(tab).await;
        slides
    }

    async fn poll_slide_images(&self, tab: TabId) -> Vec<Slide> {
        let deadline = Self::deadline(super::engine::ARTIFACT_POLL_TIMEOUT);
        loop {
            let value = self
                .inspector()
                .execute(tab, FrameScope::Top, scripts::COLLECT_SLIDE_IMAGES)
                .await
                .unwrap_or(Value::Null);
            let urls: Vec<String> = value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter(|s| !s.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if !urls.is_empty() {
                return urls
                    .into_iter()
                    .enumerate()
                    .map(|(i, image_url)| Slide {
                        image_url: Some(image_url),
                        pdf_url: None,
                        slide_number: i + 1,
                    })
                    .collect();
            }
            if !Self::tick(deadline).await {
                debug!("slide polling hit deadline");
                return Vec::new();
            }
        }
    }

    /// Recovers a rendered infographic as one data URL.
    #[instrument(level = "debug", skip(self))]
    pub async fn infographic_image(&self, notebook_id: &str, artifact_id: &str) -> Option<String> {
        let url = format!("{}?artifact={artifact_id}", self.notebook_url(notebook_id));
        let tab = match self.open_settled_tab(&url, true).await {
            Ok(tab) => tab,
            Err(error) => {
                warn!(%error, "could not open infographic tab");
                return None;
            }
        };
        let deadline = Self::deadline(super::engine::ARTIFACT_POLL_TIMEOUT);
        let image = loop {
            let value = self
                .inspector()
                .execute(tab, FrameScope::Top, scripts::COLLECT_INFOGRAPHIC_IMAGE)
                .await
                .unwrap_or(Value::Null);
            if let Some(data) = value.as_str().filter(|s| !s.is_empty()) {
                break Some(data.to_string());
            }
            if !Self::tick(deadline).await {
                break None;
            }
        };
        self.close_quietly(tab).await;
        image
    }

    /// Fetches an arbitrary image URL into a data URL.
    ///
    /// Strategies, each with its own timeout, stopping at first success:
    /// (a) render the URL in a background tab and read it via canvas,
    /// (b) a direct unauthenticated fetch,
    /// (c) an in-page authenticated fetch in a tab already showing the
    ///     notebook, so the request carries the target origin's cookies.
    /// Returns `None` when every strategy fails; never retries beyond the
    /// chain.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_image(&self, url: &str, context_notebook: Option<&str>) -> Option<String> {
        if let Some(data) = self.image_via_background_tab(url).await {
            return Some(data);
        }
        if let Some(data) = Self::image_via_direct_fetch(url).await {
            return Some(data);
        }
        if let Some(notebook_id) = context_notebook {
            if let Some(data) = self.image_via_page_fetch(url, notebook_id).await {
                return Some(data);
            }
        }
        debug!("all image fetch strategies failed");
        None
    }

    /// Strategy (a): background tab plus canvas read.
    async fn image_via_background_tab(&self, url: &str) -> Option<String> {
        let tab = self.open_settled_tab(url, true).await.ok()?;
        let deadline = Self::deadline(IMAGE_STRATEGY_TIMEOUT);
        let image = loop {
            let value = self
                .inspector()
                .execute(tab, FrameScope::Top, scripts::READ_PAGE_IMAGE)
                .await
                .unwrap_or(Value::Null);
            if let Some(data) = value.as_str().filter(|s| s.starts_with("data:")) {
                break Some(data.to_string());
            }
            if !Self::tick(deadline).await {
                break None;
            }
        };
        self.close_quietly(tab).await;
        image
    }

    /// Strategy (b): plain fetch without cookies, for public URLs.
    async fn image_via_direct_fetch(url: &str) -> Option<String> {
        let response = tokio::time::timeout(IMAGE_STRATEGY_TIMEOUT, reqwest::get(url))
            .await
            .ok()?
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        if !mime.starts_with("image/") {
            return None;
        }
        let bytes = tokio::time::timeout(IMAGE_STRATEGY_TIMEOUT, response.bytes())
            .await
            .ok()?
            .ok()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Some(format!("data:{mime};base64,{encoded}"))
    }

    /// Strategy (c): authenticated fetch inside the notebook tab.
    async fn image_via_page_fetch(&self, url: &str, notebook_id: &str) -> Option<String> {
        let tab = self.acquire_notebook_tab(notebook_id).await?;
        // Safe JS string literal for the URL argument.
        let argument = serde_json::to_string(url).ok()?;
        let script = format!("{}({argument})", scripts::FETCH_IMAGE_IN_PAGE);
        let value = tokio::time::timeout(
            IMAGE_STRATEGY_TIMEOUT + POLL_INTERVAL,
            self.inspector().execute(tab, FrameScope::Top, &script),
        )
        .await
        .ok()?
        .ok()?;
        value
            .as_str()
            .filter(|s| s.starts_with("data:"))
            .map(ToString::to_string)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::super::testing::FakeInspector;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_slide_images_numbered_in_order() {
        let inspector = Arc::new(FakeInspector::with_results(&[(
            "slide-strip",
            json!(["data:image/png;base64,AAA", "data:image/png;base64,BBB"]),
        )]));
        let engine = ExtractionEngine::new(inspector.clone(), "https://notebook.example");

        let slides = engine.slide_images("nb", "deck").await;
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].slide_number, 1);
        assert_eq!(slides[1].slide_number, 2);
        assert_eq!(
            slides[1].image_url.as_deref(),
            Some("data:image/png;base64,BBB")
        );
        assert_eq!(inspector.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slide_images_timeout_returns_empty_and_closes() {
        let inspector = Arc::new(FakeInspector::default());
        let engine = ExtractionEngine::new(inspector.clone(), "https://notebook.example");
        assert!(engine.slide_images("nb", "deck").await.is_empty());
        assert_eq!(inspector.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_infographic_image_no_tab_returns_none() {
        let inspector = Arc::new(FakeInspector {
            no_tabs: true,
            ..FakeInspector::default()
        });
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");
        assert!(engine.infographic_image("nb", "info").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_image_in_page_strategy() {
        // Background-tab strategy yields nothing; in-page fetch succeeds.
        let inspector = Arc::new(FakeInspector::with_results(&[(
            "credentials: 'include'",
            json!("data:image/png;base64,CCC"),
        )]));
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");
        let data = engine
            .fetch_image("https://cdn.example/slide.png", Some("nb"))
            .await;
        assert_eq!(data.as_deref(), Some("data:image/png;base64,CCC"));
    }

    #[test]
    fn test_image_strategy_timeout_is_bounded() {
        assert!(IMAGE_STRATEGY_TIMEOUT <= Duration::from_secs(30));
    }
}
