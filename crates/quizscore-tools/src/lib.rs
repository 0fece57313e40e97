//! quizscore-tools — Built-in questionnaire tools for quizscore.
//!
//! Each tool is an instrument definition embedded at compile time and
//! parsed on demand through [`quizscore_core::parser`].

pub mod catalog;
pub mod mbti;

pub use catalog::ToolId;
