use crate::utils::error::{RpaasError, Result};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RpaasError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse::<SocketAddr>()
        .map_err(|e| RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

/// Checks that `value` can be used as a single object name or namespace.
pub fn validate_object_name(field_name: &str, value: &str) -> Result<()> {
    match path_segment_problem(value) {
        None => Ok(()),
        Some(reason) => Err(RpaasError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }),
    }
}

/// Returns why `value` is not a safe single path segment, if it is not.
pub fn path_segment_problem(value: &str) -> Option<&'static str> {
    if value.is_empty() {
        Some("name cannot be empty")
    } else if value == "." || value == ".." {
        Some("name cannot be a relative path component")
    } else if value.contains(|c: char| matches!(c, '/' | '\\' | '\0')) {
        Some("name cannot contain path separators or null bytes")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_url", "https://example.com").is_ok());
        assert!(validate_url("api_url", "http://example.com").is_ok());
        assert!(validate_url("api_url", "").is_err());
        assert!(validate_url("api_url", "invalid-url").is_err());
        assert!(validate_url("api_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("request_timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("request_timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_socket_addr() {
        assert!(validate_socket_addr("bind_address", "127.0.0.1:9999").is_ok());
        assert!(validate_socket_addr("bind_address", "localhost").is_err());
    }

    #[test]
    fn test_path_segment_problem() {
        assert_eq!(path_segment_problem("rpaas-v2"), None);
        assert!(path_segment_problem("").is_some());
        assert!(path_segment_problem("..").is_some());
        assert!(path_segment_problem("a/b").is_some());
        assert!(validate_object_name("store.namespace", "bad\\name").is_err());
    }
}
