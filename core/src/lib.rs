pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::Config;
pub use error::AttendanceError;
pub use generator::{demo_store, resolve_seed, sample_roster, AttendanceGenerator};
pub use model::attendance::{AttendanceRecord, AttendanceStatus};
pub use model::stats::{AttendanceStats, ClassStats, OverallStats, Rating, StatusBreakdown, StudentReport, TrendPoint};
pub use model::student::Student;
pub use repository::{AttendanceRepository, InMemoryStore, StudentRepository};
pub use service::aggregation::TrendScope;
pub use service::attendance_service::AttendanceService;
pub use service::sheet::AttendanceSheet;
pub use time::{parse_day, today};
