pub mod aggregation;
pub mod attendance_service;
pub mod sheet;
