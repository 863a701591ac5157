//! Инициализация логирования
//!
//! Логи идут в stderr, stdout остаётся для таблиц статистики.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Устанавливает глобальный подписчик `tracing`; `RUST_LOG` имеет приоритет над `level`
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
        .context("Не удалось инициализировать логирование")
}
