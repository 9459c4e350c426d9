pub(crate) mod export;
pub(crate) mod fetch_all;
pub(crate) mod progress;
pub(crate) mod records;
pub(crate) mod session;
pub(crate) mod stats;

use timberdesk_client::RequestError;
use timberdesk_loader::LoadError;

/// Turns library errors into `anyhow` errors whose top line is the message
/// meant for the operator, with the technical cause kept in the chain.
pub(crate) trait UserFacing<T> {
    fn user_facing(self) -> anyhow::Result<T>;
}

impl<T> UserFacing<T> for Result<T, RequestError> {
    fn user_facing(self) -> anyhow::Result<T> {
        self.map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })
    }
}

impl<T> UserFacing<T> for Result<T, LoadError> {
    fn user_facing(self) -> anyhow::Result<T> {
        self.map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })
    }
}

/// Cap a requested page size at the client's configured maximum.
pub(crate) fn page_size_within(requested: u64, max: u64) -> u64 {
    if requested > max {
        tracing::warn!("Page size {requested} exceeds the configured maximum, using {max}");
        return max;
    }
    requested
}

/// Parse a `--data` argument, which must be a JSON object.
pub(crate) fn parse_object(data: &str) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value =
        serde_json::from_str(data).map_err(|e| anyhow::anyhow!("--data is not valid JSON: {e}"))?;
    if !value.is_object() {
        anyhow::bail!("--data must be a JSON object");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        assert!(parse_object(r#"{"title": "Oak"}"#).is_ok());
        assert!(parse_object("[1, 2]").is_err());
        assert!(parse_object("{title").is_err());
    }

    #[test]
    fn test_page_size_within() {
        assert_eq!(page_size_within(20, 10), 10);
        assert_eq!(page_size_within(5, 10), 5);
        assert_eq!(page_size_within(0, 10), 0);
    }

    #[test]
    fn test_user_facing_message_first() {
        let err: Result<(), RequestError> = Err(RequestError::from_status(404, String::new()));
        let err = err.user_facing().unwrap_err();
        assert_eq!(err.to_string(), timberdesk_client::ErrorKind::NotFound.message());
    }
}
