// src/models/mod.rs

pub mod activity;
pub mod course;
pub mod enrollment;
pub mod quiz;
pub mod sale;
pub mod user;
