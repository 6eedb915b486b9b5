use std::error::Error as StdError;
use std::io;

use super::types::TransportError;
use crate::connect::types::AttemptState;
use crate::proxy::TunnelError;

impl TransportError {
    /// The state the attempt was trying to reach when it failed.
    #[must_use]
    pub fn stage(&self) -> AttemptState {
        match self {
            TransportError::Resolve { .. } | TransportError::Create { .. } => {
                AttemptState::Created
            }
            TransportError::Bind { .. } => AttemptState::Bound,
            TransportError::Connect { .. } | TransportError::Tunnel { .. } => {
                AttemptState::Connected
            }
            TransportError::EncryptionContext(_)
            | TransportError::ServerName { .. }
            | TransportError::Handshake { .. } => AttemptState::Upgraded,
        }
    }

    /// Returns true if the failure happened while talking to the HTTP proxy.
    #[must_use]
    pub fn is_proxy(&self) -> bool {
        matches!(self, TransportError::Tunnel { .. })
    }

    /// Returns true if the failure belongs to the encryption upgrade.
    #[must_use]
    pub fn is_handshake(&self) -> bool {
        self.stage() == AttemptState::Upgraded
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        let mut source = self.source();

        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>()
                && matches!(io.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
            {
                return true;
            }
            if let Some(TunnelError::Io(io)) = err.downcast_ref::<TunnelError>()
                && matches!(io.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
            {
                return true;
            }
            source = err.source();
        }

        false
    }
}
