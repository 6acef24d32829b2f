//! REST API client module for the employee directory backend.
//!
//! This module provides the `ApiClient` request pipeline. Every backend call
//! goes through it so that credential attachment and failure classification
//! happen in one place:
//!
//! - `client`: dispatch, bearer decoration, response classification
//! - `employees`: `/employees` list, search, read, create, update
//! - `users`: `/users/login` and `/users/signup`

pub mod client;
pub mod employees;
pub mod error;
pub mod users;

pub use client::{ApiClient, ApiRequest, ApiResponse, AuthFailureHandler};
pub use error::ApiError;
