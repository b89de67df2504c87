//! Consolidated test utilities and helpers for the bill scraper.
//!
//! This module provides a centralized location for all test utilities, mock implementations,
//! and test data builders used throughout the codebase.

#![cfg(test)]

pub mod html;
pub mod mocks;
