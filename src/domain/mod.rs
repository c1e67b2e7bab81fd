// Domain layer: backend DTOs and ports (interfaces) used by state and pages.

pub mod model;
pub mod ports;
