//! Integration tests for svcforge
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! They need no container runtime.

mod cli_tests;
