//! Конфигурация рабочей нагрузки
//!
//! Значения по умолчанию совпадают с эталонным бенчмарком: n = 5000, p = 3,
//! зерно 0. Файл конфигурации в формате JSON, поля можно переопределить
//! переменными окружения `WORKLOAD_*`.

use crate::error::WorkloadError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DIMENSION: usize = 5000;
pub const DEFAULT_POWER: usize = 3;
pub const DEFAULT_SEED: u64 = 0;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Размерность матрицы n
    pub dimension: usize,
    /// Показатель степени p
    pub power: usize,
    pub seed: u64,
    /// Уровень логирования, если не задан `RUST_LOG`
    pub log_level: String,
    /// Куда профилировщики пишут статистику
    pub stats_path: PathBuf,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            power: DEFAULT_POWER,
            seed: DEFAULT_SEED,
            log_level: "info".to_string(),
            stats_path: PathBuf::from("workload_profile.json"),
        }
    }
}

impl WorkloadConfig {
    /// Читает конфигурацию из JSON-файла; отсутствующие поля берутся по умолчанию
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Не удалось прочитать файл конфигурации {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Не удалось разобрать конфигурацию {}", path.display()))
    }

    /// Загружает конфигурацию из файла (если указан) и применяет переменные окружения
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Переопределяет поля значениями из `lookup` по ключам `WORKLOAD_*`
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("WORKLOAD_DIMENSION") {
            self.dimension = value
                .trim()
                .parse()
                .with_context(|| format!("WORKLOAD_DIMENSION: некорректное значение {:?}", value))?;
        }
        if let Some(value) = lookup("WORKLOAD_POWER") {
            self.power = value
                .trim()
                .parse()
                .with_context(|| format!("WORKLOAD_POWER: некорректное значение {:?}", value))?;
        }
        if let Some(value) = lookup("WORKLOAD_SEED") {
            self.seed = value
                .trim()
                .parse()
                .with_context(|| format!("WORKLOAD_SEED: некорректное значение {:?}", value))?;
        }
        if let Some(value) = lookup("WORKLOAD_LOG") {
            self.log_level = value;
        }
        if let Some(value) = lookup("WORKLOAD_STATS_PATH") {
            self.stats_path = PathBuf::from(value);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), WorkloadError> {
        if self.dimension == 0 {
            return Err(WorkloadError::InvalidDimension { name: "dimension", value: self.dimension });
        }
        Ok(())
    }
}
