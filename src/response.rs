//! HTTP Response.
use crate::{
    http::{InvalidStatus, StatusCode},
    message::{Message, impl_message},
};

/// HTTP response value.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    reason: Option<String>,
    message: Message,
}

impl Response {
    /// Create a response with the given status code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] for a code outside `100..=599`.
    pub fn new(status: u16) -> Result<Self, InvalidStatus> {
        Ok(Self {
            status: StatusCode::from_u16(status)?,
            reason: None,
            message: Message::new(),
        })
    }

    /// Returns the status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the reason phrase.
    ///
    /// An explicitly set phrase wins, then the standard phrase for the
    /// code, then the empty string.
    pub fn reason_phrase(&self) -> &str {
        match &self.reason {
            Some(reason) => reason,
            None => self.status.reason().unwrap_or(""),
        }
    }

    /// Returns a new response with the given status code and the
    /// standard reason phrase.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] for a code outside `100..=599`.
    pub fn with_status(&self, status: u16) -> Result<Self, InvalidStatus> {
        let status = StatusCode::from_u16(status)?;
        let mut new = self.clone();
        new.status = status;
        new.reason = None;
        Ok(new)
    }

    /// Returns a new response with the given status code and an explicit
    /// reason phrase.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] for a code outside `100..=599`.
    pub fn with_status_reason(&self, status: u16, reason: &str) -> Result<Self, InvalidStatus> {
        let mut new = self.with_status(status)?;
        new.reason = Some(reason.to_owned());
        Ok(new)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            reason: None,
            message: Message::new(),
        }
    }
}

impl_message!(Response.message);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_and_reason() {
        let response = Response::new(404).unwrap();
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");

        assert!(Response::new(999).is_err());
        assert!(Response::new(99).is_err());
    }

    #[test]
    fn test_with_status_resets_reason() {
        let response = Response::new(200)
            .unwrap()
            .with_status_reason(404, "Gone Fishing")
            .unwrap();
        assert_eq!(response.reason_phrase(), "Gone Fishing");

        let response = response.with_status(500).unwrap();
        assert_eq!(response.reason_phrase(), "Internal Server Error");
    }

    #[test]
    fn test_unassigned_code_has_empty_reason() {
        let response = Response::new(599).unwrap();
        assert_eq!(response.reason_phrase(), "");
    }

    #[test]
    fn test_message_surface() {
        let response = Response::default().with_header("Content-Type", "text/html");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header_line("content-type"), "text/html");
    }
}
