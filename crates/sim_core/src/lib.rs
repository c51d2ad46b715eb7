pub mod clock;
pub mod error;
pub mod scenario;
pub mod simulation;
pub mod stations;
pub mod telemetry;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
pub mod timings;
pub mod trucks;
