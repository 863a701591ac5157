//! Модуль для работы с матрицами
//!
//! Предоставляет:
//! - Типы матриц и векторов
//! - Генерацию воспроизводимых случайных данных
//! - Возведение в степень и решение линейной системы

mod types;
pub mod operations;

pub use types::{Matrix, Vector};
pub use operations::{generate, identity, max_abs_diff, power, power_with, residual, solve};
