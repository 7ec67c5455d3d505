//! Protocol status codes and their wire texts.
//!
//! The code/text pairs are wire literals; clients match on them exactly.

/// Protocol-level result of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 — command succeeded.
    Ok,
    /// 201 — a resource was created.
    Created,
    /// 202 — a long-running request was accepted.
    Requested,
    /// 400 — malformed or incomplete command structure.
    Syntax,
    /// 400 — credentials were rejected (distinct text from Syntax).
    AuthFailed,
    /// 401 — the session has not authenticated yet.
    AuthRequired,
    /// 403 — the session role forbids this command.
    Forbidden,
    /// 404 — a referenced resource does not exist.
    Missing,
    /// 409 — the resource is in use and cannot be changed.
    Busy,
    /// 500 — backend or invariant failure.
    Internal,
    /// 503 — the command is administratively disabled.
    Unavailable,
    /// 503 — the scanner or backend is unreachable.
    Down,
}

impl StatusCode {
    /// The wire status code.
    pub fn code(&self) -> &'static str {
        match self {
            StatusCode::Ok => "200",
            StatusCode::Created => "201",
            StatusCode::Requested => "202",
            StatusCode::Syntax | StatusCode::AuthFailed => "400",
            StatusCode::AuthRequired => "401",
            StatusCode::Forbidden => "403",
            StatusCode::Missing => "404",
            StatusCode::Busy => "409",
            StatusCode::Internal => "500",
            StatusCode::Unavailable | StatusCode::Down => "503",
        }
    }

    /// The default wire status text.
    ///
    /// Commands may substitute a more specific message (for example
    /// "Failed to find task '...'" for Missing).
    pub fn default_text(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "OK, resource created",
            StatusCode::Requested => "OK, request submitted",
            StatusCode::Syntax => "Syntax error",
            StatusCode::AuthFailed => "Authentication failed",
            StatusCode::AuthRequired => "Authenticate first",
            StatusCode::Forbidden => "Access to resource forbidden",
            StatusCode::Missing => "Resource missing",
            StatusCode::Busy => "Resource busy",
            StatusCode::Internal => "Internal error",
            StatusCode::Unavailable => "Service unavailable",
            StatusCode::Down => "Service temporarily down",
        }
    }

    /// True for the 2xx family.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            StatusCode::Ok | StatusCode::Created | StatusCode::Requested
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_wire_literals() {
        assert_eq!(StatusCode::Ok.code(), "200");
        assert_eq!(StatusCode::Created.code(), "201");
        assert_eq!(StatusCode::Requested.code(), "202");
        assert_eq!(StatusCode::Syntax.code(), "400");
        assert_eq!(StatusCode::AuthFailed.code(), "400");
        assert_eq!(StatusCode::AuthRequired.code(), "401");
        assert_eq!(StatusCode::Forbidden.code(), "403");
        assert_eq!(StatusCode::Missing.code(), "404");
        assert_eq!(StatusCode::Busy.code(), "409");
        assert_eq!(StatusCode::Internal.code(), "500");
        assert_eq!(StatusCode::Unavailable.code(), "503");
        assert_eq!(StatusCode::Down.code(), "503");
    }

    #[test]
    fn texts_match_wire_literals() {
        assert_eq!(StatusCode::Created.default_text(), "OK, resource created");
        assert_eq!(StatusCode::Requested.default_text(), "OK, request submitted");
        assert_eq!(StatusCode::AuthRequired.default_text(), "Authenticate first");
        assert_eq!(
            StatusCode::Forbidden.default_text(),
            "Access to resource forbidden"
        );
        assert_eq!(StatusCode::AuthFailed.default_text(), "Authentication failed");
        assert_eq!(StatusCode::Down.default_text(), "Service temporarily down");
    }

    #[test]
    fn success_family() {
        assert!(StatusCode::Requested.is_success());
        assert!(!StatusCode::Busy.is_success());
    }
}
