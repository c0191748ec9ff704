//! Custom Axum extractors.
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     claimed: CallerId,
//! ) -> Result<Json<Response>, AppError> {
//!     let caller = state.require_caller(claimed, Capability::ViewOwnTicket).await?;
//!     ...
//! }
//! ```

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use helpdesk_core::types::AccountId;
use uuid::Uuid;

/// Header carrying the caller's account id.
pub const CALLER_ID_HEADER: &str = "X-User-Id";

/// Account id claimed by the caller in the `X-User-Id` header.
///
/// A claim still has to be resolved against the account store before it
/// means anything. Only [`CallerId::Absent`] may be treated as anonymous; a
/// header that does not parse is an unauthenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerId {
    /// No header was sent
    Absent,
    /// The header holds a well-formed account id
    Claimed(AccountId),
    /// The header is present but empty or not a UUID
    Malformed,
}

impl CallerId {
    /// Whether the request carried no caller header at all.
    #[must_use]
    pub const fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The claimed account id, if the header was well formed.
    #[must_use]
    pub const fn account_id(self) -> Option<AccountId> {
        match self {
            Self::Claimed(id) => Some(id),
            Self::Absent | Self::Malformed => None,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(CALLER_ID_HEADER) else {
            return Ok(Self::Absent);
        };

        let claimed = value
            .to_str()
            .ok()
            .map(str::trim)
            .and_then(|s| Uuid::parse_str(s).ok())
            .map_or(Self::Malformed, |id| Self::Claimed(AccountId::from_uuid(id)));

        if claimed == Self::Malformed {
            tracing::debug!("Malformed {CALLER_ID_HEADER} header");
        }
        Ok(claimed)
    }
}
