//! The four pattern detectors. Each is stateless and independent; the
//! pipeline in `runner` fixes their execution order.

pub mod bad_patterns;
pub mod insecure_calls;
pub mod reentrancy;
pub mod validation;

pub use bad_patterns::BadPatternsDetector;
pub use insecure_calls::InsecureCallsDetector;
pub use reentrancy::ReentrancyDetector;
pub use validation::ValidationDetector;
