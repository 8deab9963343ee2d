// src/lib.rs

//! Regression checks of DiffKemp over a list of commits: which functions a
//! commit touched, whether DiffKemp still proves them equal, one report row
//! per commit.

pub mod analyzer;
pub mod batch;
pub mod builder;
pub mod cli;
pub mod comparator;
pub mod config;
pub mod error;
pub mod locator;
pub mod model;
pub mod process;
pub mod report;
