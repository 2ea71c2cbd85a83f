pub mod config;
pub mod error;
pub mod gemini;
pub mod http;
pub mod normalizer;
pub mod schemas;
