//! Integration test harness.

mod mock_catalog;
mod settlement;
