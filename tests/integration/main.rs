//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing and poem pages and run full
//! harvests against temporary dataset and checkpoint files.

mod crawl_tests;
