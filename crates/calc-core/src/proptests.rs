//! Property-based tests for sequence stepping.
