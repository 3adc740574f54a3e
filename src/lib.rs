//! Hierarchical timer wheel for scheduling deferred one-shot actions.
//!
//! A timer wheel schedules large numbers of cheap timers with O(1) amortized
//! insertion and expiry, regardless of how many are pending. Short delays
//! land in a fine-granularity level; long delays wait in a coarse one and
//! migrate down in batches as virtual time advances. This is the building
//! block behind timeout management in event-driven servers, keepalive
//! tracking, and retry scheduling.
//!
//! Time here is virtual: the caller drives it by calling
//! [`TimerWheel::advance`] once per lowest-level tick. Nothing blocks,
//! suspends, or reads a wall clock.
//!
//! # Thread Safety
//!
//! [`TimerWheel`] is not thread-safe. Confine it to one thread, or guard
//! `submit` and `advance` with a single external lock.
//!
//! # Examples
//!
//! ```ignore
//! let mut wheel = WheelBuilder::new()
//!     .level(60, 1)      // seconds
//!     .level(60, 60)     // minutes
//!     .level(24, 3600)   // hours
//!     .build()?;
//!
//! wheel.submit(90, || println!("a minute and a half later"))?;
//! for _ in 0..90 {
//!     wheel.advance();
//! }
//! ```

pub mod errors;
pub mod slot;
pub mod timerwheel;

pub use errors::WheelError;
pub use timerwheel::{TimerWheel, WheelBuilder};
