//! serum-preset End-to-End Test Infrastructure
//!
//! This crate exercises the preset accessor layer against documents on disk:
//!
//! - **Round trip**: load -> save -> reload keeps modeled values and passes
//!   unmodeled content through unchanged
//! - **Modulation**: routings added through the API land in the saved
//!   `ModSlotN` blocks and survive a reload
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p serum-preset-tests
//! ```

pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use fixtures::PresetFixtures;
pub use harness::TestHarness;
