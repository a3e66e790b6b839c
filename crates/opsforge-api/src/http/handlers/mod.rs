//! Request handlers, grouped by resource.

pub mod analyze;
pub mod session;
pub mod update;
pub mod workflow;

use opsforge_types::request::Domain;
use opsforge_types::update::UpdateChannel;

use crate::http::error::AppError;

/// Parse the `{domain}` path segment.
pub(crate) fn parse_domain(raw: &str) -> Result<Domain, AppError> {
    raw.parse().map_err(AppError::Validation)
}

/// Parse the `{channel}` path segment.
pub(crate) fn parse_channel(raw: &str) -> Result<UpdateChannel, AppError> {
    raw.parse().map_err(AppError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain_accepts_known() {
        assert_eq!(parse_domain("sql").unwrap(), Domain::Sql);
        assert_eq!(parse_domain("incident").unwrap(), Domain::Incident);
    }

    #[test]
    fn test_parse_domain_rejects_unknown() {
        assert!(matches!(
            parse_domain("blockchain"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("dev").unwrap(), UpdateChannel::Dev);
        assert!(matches!(parse_channel("ops"), Err(AppError::Validation(_))));
    }
}
