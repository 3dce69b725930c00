//! Integration tests for the portal
//! These drive the library over a real HTTP client against a mock server

mod harness;

mod api_test;
mod session_flow_test;
