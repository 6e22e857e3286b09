//! Property-based tests for the statistics and cleaning code.
