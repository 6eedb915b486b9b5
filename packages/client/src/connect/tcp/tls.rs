//! Encryption upgrade of a connected stream
//!
//! The handshake runs to completion here, under whatever read timeout the
//! underlying socket carries, so a returned [`EncryptedConnection`] is ready
//! for application data.

use std::io::{self, Read, Write};

use rustls::ClientConnection;
use rustls::pki_types::ServerName;

use crate::connect::types::{AttemptState, EncryptedConnection, RawConnection};
use crate::error::{Result, TransportError};
use crate::tls::EncryptionContext;

/// Layers an encrypted session over `raw` and completes the handshake.
///
/// The server name is the target host, never the proxy, so tunneled
/// connections verify the real endpoint. `raw` is consumed either way.
pub fn upgrade<S: Read + Write>(
    mut raw: RawConnection<S>,
    context: &EncryptionContext,
) -> Result<EncryptedConnection<S>> {
    let target = raw.target().clone();
    let server_name = ServerName::try_from(target.bare_host().to_string()).map_err(|_| {
        TransportError::ServerName {
            host: target.host.clone(),
        }
    })?;

    let mut session = ClientConnection::new(context.config(), server_name).map_err(|e| {
        TransportError::Handshake {
            target: target.clone(),
            source: io::Error::other(e),
        }
    })?;

    while session.is_handshaking() {
        if let Err(source) = session.complete_io(raw.get_mut()) {
            return Err(TransportError::Handshake { target, source });
        }
    }

    tracing::debug!(
        endpoint = %target,
        version = ?session.protocol_version(),
        state = %AttemptState::Upgraded,
        "encryption handshake complete"
    );
    Ok(EncryptedConnection::layer(raw, session))
}
