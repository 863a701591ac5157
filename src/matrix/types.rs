//! Типы матриц и векторов

use ndarray::{Array1, Array2};

/// Плотная квадратная матрица двойной точности
pub type Matrix = Array2<f64>;

/// Вектор правой части и решения
pub type Vector = Array1<f64>;
