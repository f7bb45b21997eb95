//! Release mechanism for the carried object.

use beacon_types::BeaconError;

/// Holds the carried object until [`ReleaseLatch::release`] is called.
///
/// Typically a solenoid or servo-driven gate behind a discrete output.
pub trait ReleaseLatch: Send {
    fn id(&self) -> &str;

    /// Open the latch and let the object fall.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::ActuatorFault`] if the output cannot be driven.
    fn release(&mut self) -> Result<(), BeaconError>;

    fn is_released(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLatch {
        open: bool,
    }

    impl ReleaseLatch for MockLatch {
        fn id(&self) -> &str {
            "payload_latch"
        }

        fn release(&mut self) -> Result<(), BeaconError> {
            self.open = true;
            Ok(())
        }

        fn is_released(&self) -> bool {
            self.open
        }
    }

    #[test]
    fn mock_latch_release() {
        let mut latch = MockLatch { open: false };
        assert!(!latch.is_released());
        latch.release().unwrap();
        assert!(latch.is_released());
    }
}
