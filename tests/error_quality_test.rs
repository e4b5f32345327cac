//! Error message quality tests
//!
//! Tests that verify error messages are helpful and distinguishable.

use qsan_exporter::error::ExporterError;

#[test]
fn test_auth_error_message_clarity() {
    // Given: An authentication error
    let error = ExporterError::Auth("10.0.0.20 did not accept the credentials for user".to_string());

    // When: Converting to string
    let message = format!("{}", error);

    // Then: Message should clearly indicate authentication issue
    assert!(message.contains("Authentication failed"));
    assert!(message.contains("10.0.0.20"));
}

#[test]
fn test_http_status_message_names_path_and_status() {
    let error = ExporterError::HttpStatus {
        path: "/vd_x.php".to_string(),
        status: 503,
    };

    let message = error.to_string();

    assert!(message.contains("503"));
    assert!(message.contains("/vd_x.php"));
}

#[test]
fn test_protocol_error_message_clarity() {
    let error = ExporterError::Protocol("volume page 2 has no vd_num".to_string());

    let message = error.to_string();

    assert!(message.starts_with("Protocol error"));
    assert!(message.contains("vd_num"));
}

#[test]
fn test_config_error_message_clarity() {
    let error = ExporterError::Config("no host".to_string());

    assert!(error.to_string().contains("Configuration error"));
}

#[test]
fn test_io_error_conversion() {
    // Given: An IO error from writing output
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");

    // When: Converting
    let error: ExporterError = io.into();

    // Then: It keeps its message and is not a transport failure
    assert!(error.to_string().contains("stdout closed"));
    assert!(!error.is_transport());
}

#[test]
fn test_json_error_conversion() {
    let json = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");

    let error: ExporterError = json.into();

    assert!(error.to_string().starts_with("JSON error"));
}

#[test]
fn test_transport_family() {
    // Given: One error of each non-reqwest variant
    let transport_like = [
        ExporterError::HttpStatus {
            path: "/login.php".to_string(),
            status: 500,
        },
        ExporterError::Protocol("bad page".to_string()),
    ];
    let others = [
        ExporterError::Auth("rejected".to_string()),
        ExporterError::Config("bad".to_string()),
    ];

    // Then: Only exchange failures count as transport errors
    assert!(transport_like.iter().all(ExporterError::is_transport));
    assert!(!others.iter().any(ExporterError::is_transport));
}

#[test]
fn test_errors_are_distinguishable() {
    let messages = [
        ExporterError::Auth("x".to_string()).to_string(),
        ExporterError::Protocol("x".to_string()).to_string(),
        ExporterError::Config("x".to_string()).to_string(),
    ];

    for (i, a) in messages.iter().enumerate() {
        for b in messages.iter().skip(i + 1) {
            assert_ne!(a, b);
        }
    }
}
