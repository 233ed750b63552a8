//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and exercise whole
//! crawls end-to-end over real HTTP.

mod batch_tests;
mod common;
mod crawl_tests;
