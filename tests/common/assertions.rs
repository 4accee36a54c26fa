//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

/// Assert that a result is ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert an API error response: status code plus a fragment of the
/// `error` field of the JSON body
#[cfg(feature = "ssr")]
#[macro_export]
macro_rules! assert_api_error {
    ($response:expr, $status:expr) => {{
        let response = &$response;
        assert_eq!(response.status_code(), $status, "body: {}", response.text());
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], $status.as_u16());
    }};
    ($response:expr, $status:expr, $fragment:expr) => {{
        let response = &$response;
        assert_eq!(response.status_code(), $status, "body: {}", response.text());
        let body: serde_json::Value = response.json();
        let message = body["error"].as_str().unwrap_or_default().to_string();
        $crate::assert_contains!(message, $fragment);
    }};
}
