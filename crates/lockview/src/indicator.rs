//! The shared loading indicator.
//!
//! Every request to the artifact source goes through [`fetch_checked`], which
//! shows the indicator while the request is in flight and leaves the error
//! text on it when the request fails, until another request begins or
//! succeeds. The indicator is presentational only:
//! it never serializes or cancels requests.

use crate::error::Result;
use serde::Serialize;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tracing::debug;

/// Text shown while a request is in flight and no error is displayed.
pub const LOADING_TEXT: &str = "loading";

#[derive(Debug, Default)]
struct IndicatorState {
    in_flight: usize,
    error: Option<String>,
}

/// A loading/error indicator shared by every view of one session.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    state: Rc<RefCell<IndicatorState>>,
}

/// What the indicator currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndicatorView {
    /// Whether the indicator is shown at all.
    pub visible: bool,
    /// The text it shows, if visible.
    pub text: Option<String>,
    /// Number of requests currently in flight.
    pub in_flight: usize,
}

impl LoadingIndicator {
    /// Create a hidden indicator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A request has started. Clears any displayed error.
    pub fn begin(&self) {
        let mut state = self.state.borrow_mut();
        state.in_flight += 1;
        state.error = None;
    }

    /// A request has completed successfully. Clears any displayed error.
    pub fn finish(&self) {
        let mut state = self.state.borrow_mut();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.error = None;
    }

    /// A request has failed; show `message` until the next request begins
    /// or succeeds.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.error = Some(message.into());
    }

    /// Whether the indicator is shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        let state = self.state.borrow();
        state.in_flight > 0 || state.error.is_some()
    }

    /// The text shown, or `None` when hidden.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let state = self.state.borrow();
        match &state.error {
            Some(error) => Some(error.clone()),
            None if state.in_flight > 0 => Some(LOADING_TEXT.to_string()),
            None => None,
        }
    }

    /// The displayed error, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Snapshot of what the indicator shows.
    #[must_use]
    pub fn view(&self) -> IndicatorView {
        IndicatorView {
            visible: self.is_visible(),
            text: self.text(),
            in_flight: self.state.borrow().in_flight,
        }
    }
}

/// Run `request` with the indicator shown.
///
/// On failure the indicator displays the error's indicator text and the error
/// is returned unchanged.
///
/// # Errors
///
/// Returns whatever error `request` produced.
pub async fn fetch_checked<T, F>(indicator: &LoadingIndicator, request: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    indicator.begin();
    match request.await {
        Ok(value) => {
            indicator.finish();
            Ok(value)
        }
        Err(err) => {
            let text = err.indicator_text();
            debug!(error = %text, "Request failed");
            indicator.fail(text);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_hidden_by_default() {
        let indicator = LoadingIndicator::new();
        assert!(!indicator.is_visible());
        assert_eq!(indicator.text(), None);
    }

    #[test]
    fn test_visible_while_any_request_in_flight() {
        let indicator = LoadingIndicator::new();
        indicator.begin();
        indicator.begin();
        indicator.finish();
        assert!(indicator.is_visible());
        assert_eq!(indicator.text().as_deref(), Some(LOADING_TEXT));
        indicator.finish();
        assert!(!indicator.is_visible());
    }

    #[test]
    fn test_error_stays_until_next_request() {
        let indicator = LoadingIndicator::new();
        indicator.begin();
        indicator.fail("Not Found");
        assert!(indicator.is_visible());
        assert_eq!(indicator.text().as_deref(), Some("Not Found"));

        indicator.begin();
        assert_eq!(indicator.error(), None);
        assert_eq!(indicator.text().as_deref(), Some(LOADING_TEXT));
    }

    #[test]
    fn test_later_success_clears_earlier_failure() {
        let indicator = LoadingIndicator::new();
        indicator.begin();
        indicator.begin();
        indicator.fail("Service Unavailable");
        assert_eq!(indicator.text().as_deref(), Some("Service Unavailable"));

        indicator.finish();
        assert_eq!(
            indicator.view(),
            IndicatorView {
                visible: false,
                text: None,
                in_flight: 0,
            }
        );
    }

    #[test]
    fn test_clones_share_state() {
        let indicator = LoadingIndicator::new();
        let other = indicator.clone();
        other.begin();
        assert!(indicator.is_visible());
    }

    #[tokio::test]
    async fn test_fetch_checked_success_hides_indicator() {
        let indicator = LoadingIndicator::new();
        let value = fetch_checked(&indicator, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!indicator.is_visible());
    }

    #[tokio::test]
    async fn test_fetch_checked_shows_status_text_and_reraises() {
        let indicator = LoadingIndicator::new();
        let result: Result<()> = fetch_checked(&indicator, async {
            Err(Error::Status {
                code: 500,
                text: "Internal Server Error".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(Error::Status { code: 500, .. })));
        assert_eq!(indicator.text().as_deref(), Some("Internal Server Error"));
        assert_eq!(indicator.view().in_flight, 0);
    }
}
