//! Integration tests
//!
//! These tests use wiremock to stand in for sitemap hosts and the indexing
//! APIs, and exercise the full fetch/filter/submit/record cycle.

mod coordinator_tests;
mod sitemap_tests;
