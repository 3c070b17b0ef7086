// src/services/mod.rs

pub mod activity;
pub mod commission;
pub mod grading;
pub mod navigation;
pub mod progress;
pub mod reporting;

#[cfg(test)]
pub(crate) mod test_support;
