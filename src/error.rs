//! Ошибки рабочей нагрузки

use thiserror::Error;

/// Ошибки операций generate / power / solve
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkloadError {
    #[error("Недопустимая размерность {name} = {value}: требуется положительное целое")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("Несовпадение размеров в {operation}: {detail}")]
    DimensionMismatch { operation: &'static str, detail: String },

    #[error("Матрица {dimension}x{dimension} вырождена, решение не единственно")]
    Singular { dimension: usize },

    #[error("Не удалось выделить память под буфер {rows}x{cols}")]
    OutOfMemory { rows: usize, cols: usize },
}

impl WorkloadError {
    pub(crate) fn mismatch(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::DimensionMismatch { operation, detail: detail.into() }
    }
}
