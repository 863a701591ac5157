//! Построчный профиль нагрузки: каждый шаг умножения учитывается отдельно

use anyhow::{Context, Result};
use dense_workload::{logging::init_logging, workload, Instrument, ProfileMode, Profiler, WorkloadConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Профилировщик с прогресс-баром по шагам умножения
struct Tracked {
    profiler: Profiler,
    pb: ProgressBar,
}

impl Instrument for Tracked {
    fn stage<T, F>(&mut self, name: &'static str, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.pb.set_message(name);
        let started = self.profiler.begin();
        let result = f(self);
        self.profiler.end(name, started);
        result
    }

    fn step(&mut self, name: &'static str, index: usize, elapsed: Duration) {
        self.profiler.step(name, index, elapsed);
        self.pb.inc(1);
    }
}

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = WorkloadConfig::load(config_path.as_deref())?;
    init_logging(&config.log_level)?;

    let pb = ProgressBar::new(config.power as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {msg} [{wide_bar:.cyan/blue}] {pos}/{len} умножений")?
        .progress_chars("#>-"));

    let mut tracked = Tracked {
        profiler: Profiler::new(ProfileMode::Lines),
        pb,
    };
    let outcome = tracked
        .stage("workload", |t| workload::run(&config, t))
        .context("Нагрузка завершилась ошибкой")?;
    tracked.pb.finish_with_message("готово");
    info!("Максимальная невязка |Aᵖ·x - b|: {:e}", outcome.residual);

    tracked.profiler.dump_stats(&config.stats_path)?;
    info!("Статистика сохранена в {}", config.stats_path.display());

    println!("\nПострочная статистика по накопленному времени:");
    tracked.profiler.print_stats();
    Ok(())
}
