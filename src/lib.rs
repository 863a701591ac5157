//! Воспроизводимая нагрузка плотной линейной алгебры:
//! случайная матрица, возведение в степень и решение линейной системы

pub mod config;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod profile;
pub mod utils;
pub mod workload;

// Реэкспорт основных типов для удобства
pub use config::WorkloadConfig;
pub use error::WorkloadError;
pub use matrix::{Matrix, Vector};
pub use profile::{ProfileMode, Profiler};
pub use workload::{run, Instrument, Unobserved, WorkloadOutcome};
