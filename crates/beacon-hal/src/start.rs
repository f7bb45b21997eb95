//! Operator start signal.

use std::io::{ErrorKind, Read};

use beacon_types::BeaconError;
use tracing::{debug, info};

/// Blocks until the operator gives the go.
pub trait StartSignal: Send {
    /// Return once the start token has been received.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::StartSignalLost`] if the source closes or
    /// fails before the token arrives.
    fn wait_for_start(&mut self) -> Result<(), BeaconError>;
}

/// Reads a byte stream (stdin, a serial port) and waits for one token byte.
/// Every other byte is ignored.
pub struct ByteStreamStart<R> {
    reader: R,
    token: u8,
}

impl<R: Read + Send> ByteStreamStart<R> {
    pub fn new(reader: R, token: u8) -> Self {
        Self { reader, token }
    }
}

impl<R: Read + Send> StartSignal for ByteStreamStart<R> {
    fn wait_for_start(&mut self) -> Result<(), BeaconError> {
        info!(token = %char::from(self.token), "waiting for start signal");
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    return Err(BeaconError::StartSignalLost(
                        "input closed before start token".to_string(),
                    ));
                }
                Ok(_) if byte[0] == self.token => return Ok(()),
                Ok(_) => debug!(byte = byte[0], "ignoring input"),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(BeaconError::StartSignalLost(e.to_string())),
            }
        }
    }
}
