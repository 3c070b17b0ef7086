// src/handlers/mod.rs

pub mod academy;
pub mod admin;
pub mod quiz;
pub mod sales;
