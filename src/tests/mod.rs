//! Unit-level scenario tests
//!
//! Shared doubles live in `test_helpers`; `portal_test` drives a whole
//! `Portal` against a mocked REST service.
