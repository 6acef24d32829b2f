//! Data models for the employee directory backend.
//!
//! - `Employee`, `NewEmployee`, `EmployeeSearch`: directory records and filters
//! - `LoginRequest`, `LoginResponse`, `SignupRequest`: `/users/*` payloads

pub mod employee;
pub mod user;

pub use employee::{Employee, EmployeeSearch, NewEmployee};
pub use user::{LoginRequest, LoginResponse, SignupRequest};
