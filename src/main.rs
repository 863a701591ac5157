//! Прогон нагрузки без профилирования

use anyhow::{Context, Result};
use dense_workload::{logging::init_logging, utils::measure_time, workload, Unobserved, WorkloadConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = WorkloadConfig::load(config_path.as_deref())?;
    init_logging(&config.log_level)?;

    info!("Размер матрицы: {}x{}, степень: {}", config.dimension, config.dimension, config.power);

    let (outcome, duration) = measure_time(|| workload::run(&config, &mut Unobserved));
    let outcome = outcome.context("Нагрузка завершилась ошибкой")?;

    info!("Нагрузка выполнена за {:?}", duration);
    info!("Максимальная невязка |Aᵖ·x - b|: {:e}", outcome.residual);
    Ok(())
}
