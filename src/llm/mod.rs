//! Generative API integration module

pub mod client;
pub mod prompts;

pub use client::{GeminiClient, GenerateRequest, GenerativeClient, Part, Role, Turn};
