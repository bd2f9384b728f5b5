//! Accounts module.
//!
//! Identity and access control for the four account collections: admins,
//! administrative staff, teachers, and students. Each collection owns an
//! independent credential set; credentials authenticate by email and
//! password and sessions are non-renewable one-hour bearer tokens.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
pub mod store;

pub use model::*;
pub use router::{
    init_admins_router, init_staff_router, init_students_router, init_teachers_router,
};
