//! End-to-end tests for the cache.
//!
//! This module contains cases that drive the full cache: admission,
//! eviction, statistics and background tuning together.

mod cases_tuning_test;

pub mod support;
