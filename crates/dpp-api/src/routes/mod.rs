//! HTTP route handlers, grouped per resource.

pub mod applications;
pub mod track;
