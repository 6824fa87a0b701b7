use thiserror::Error;

/// EIP-1193 provider code: the user dismissed the wallet prompt.
pub const CODE_USER_REJECTED: i64 = 4001;
/// Provider code: a request of the same kind is already pending.
pub const CODE_REQUEST_PENDING: i64 = -32002;

/// Everything that can go wrong talking to the chain gateway, the backend,
/// or the wallet bridge. Nothing here is fatal: every variant resolves into
/// a user-visible message and a return to a stable state.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Service unreachable or transport-level failure.
    #[error("service unreachable: {0}")]
    Connectivity(#[from] reqwest::Error),

    /// The user declined a wallet prompt (provider code 4001).
    #[error("wallet request declined by user")]
    UserRejected,

    /// A wallet connection attempt is already in flight.
    #[error("a wallet connection is already pending")]
    RequestPending,

    /// The chain gateway reported a failure.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The backend answered with a non-2xx status.
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// A response had the wrong shape (e.g. object where an array was expected).
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Caught before any network call was issued.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl ClientError {
    /// Map a provider/gateway error code to the matching variant.
    pub fn from_rpc(code: i64, message: String) -> Self {
        match code {
            CODE_USER_REJECTED => Self::UserRejected,
            CODE_REQUEST_PENDING => Self::RequestPending,
            _ => Self::Rpc { code, message },
        }
    }

    /// Short text suitable for a toast or inline message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connectivity(_) => "Could not reach the service. Please try again.".to_string(),
            Self::UserRejected => "Request cancelled in your wallet.".to_string(),
            Self::RequestPending => "A wallet request is already open.".to_string(),
            Self::Rpc { message, .. } => format!("Transaction failed: {message}"),
            Self::Backend { .. } => "The server could not complete the request.".to_string(),
            Self::Malformed(_) => "Received an unexpected response.".to_string(),
            Self::Validation(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rpc_user_rejected() {
        let err = ClientError::from_rpc(4001, "User rejected the request".to_string());
        assert!(matches!(err, ClientError::UserRejected));
    }

    #[test]
    fn test_from_rpc_pending() {
        let err = ClientError::from_rpc(-32002, "Request already pending".to_string());
        assert!(matches!(err, ClientError::RequestPending));
    }

    #[test]
    fn test_from_rpc_other_code_passes_through() {
        let err = ClientError::from_rpc(-32000, "execution reverted".to_string());
        match err {
            ClientError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "execution reverted");
            }
            _ => panic!("expected Rpc variant"),
        }
    }

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = ClientError::Validation("Event needs at least 2 options".to_string());
        assert_eq!(err.user_message(), "Event needs at least 2 options");
    }
}
