//! Профиль нагрузки по вызовам: generate, power, solve

use anyhow::{Context, Result};
use dense_workload::{logging::init_logging, workload, ProfileMode, Profiler, WorkloadConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = WorkloadConfig::load(config_path.as_deref())?;
    init_logging(&config.log_level)?;

    let mut profiler = Profiler::new(ProfileMode::Calls);
    let outcome = profiler
        .call("workload", |p| workload::run(&config, p))
        .context("Нагрузка завершилась ошибкой")?;
    info!("Максимальная невязка |Aᵖ·x - b|: {:e}", outcome.residual);

    profiler.dump_stats(&config.stats_path)?;
    info!("Статистика сохранена в {}", config.stats_path.display());

    println!("\nСтатистика по накопленному времени:");
    profiler.print_stats();
    Ok(())
}
