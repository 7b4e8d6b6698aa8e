//! Task module
//!
//! This module contains task-related types and form validation.

mod input;
mod model;

pub use input::{TaskInput, TaskPayload};
pub use model::*;
