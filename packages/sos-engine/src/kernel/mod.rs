//! Kernel module - engine infrastructure and dependencies.

pub mod deps;
pub mod sos_kernel;
pub mod test_dependencies;
pub mod traits;

pub use deps::{EngineDeps, LogNotifier, TwilioNotifier};
pub use sos_kernel::SosKernel;
pub use test_dependencies::{FixedClock, MockNotifier, SendBehavior, SentMessage, TestDependencies};
pub use traits::*;
