//! Рабочая нагрузка: generate → power → solve
//!
//! Наблюдатели (профилировщики, прогресс-бары) подключаются через
//! [`Instrument`] и не влияют на результат вычислений.

use crate::config::WorkloadConfig;
use crate::error::WorkloadError;
use crate::matrix::{self, Vector};
use std::time::Duration;
use tracing::info;

/// Точка подключения наблюдателя к этапам нагрузки
pub trait Instrument {
    /// Оборачивает именованный этап
    fn stage<T, F>(&mut self, name: &'static str, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T;

    /// Сообщает о завершённом шаге внутри этапа
    fn step(&mut self, _name: &'static str, _index: usize, _elapsed: Duration) {}
}

/// Наблюдатель, который ничего не делает
#[derive(Debug, Default, Clone, Copy)]
pub struct Unobserved;

impl Instrument for Unobserved {
    fn stage<T, F>(&mut self, _name: &'static str, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        f(self)
    }
}

/// Результат одного прогона
#[derive(Debug, Clone)]
pub struct WorkloadOutcome {
    pub dimension: usize,
    pub power: usize,
    pub solution: Vector,
    /// max|Aᵖ·x - b|
    pub residual: f64,
}

/// Выполняет нагрузку по конфигурации
pub fn run<I: Instrument>(config: &WorkloadConfig, instrument: &mut I) -> Result<WorkloadOutcome, WorkloadError> {
    config.validate()?;
    let (n, p) = (config.dimension, config.power);
    info!(n, p, seed = config.seed, "запуск нагрузки");

    let (a, b) = instrument.stage("generate", |_| matrix::generate(n, config.seed))?;
    info!("матрица A и вектор b сгенерированы");

    let ap = instrument.stage("power", |instrument| {
        matrix::power_with(&a, p, |index, elapsed| instrument.step("power::multiply", index, elapsed))
    })?;
    info!(p, "степень матрицы вычислена");

    let x = instrument.stage("solve", |_| matrix::solve(&ap, &b))?;
    let residual = matrix::residual(&ap, &x, &b)?;
    info!(residual, "система решена");

    Ok(WorkloadOutcome {
        dimension: n,
        power: p,
        solution: x,
        residual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Запоминает порядок этапов и шагов
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Instrument for Recorder {
        fn stage<T, F>(&mut self, name: &'static str, f: F) -> T
        where
            F: FnOnce(&mut Self) -> T,
        {
            self.events.push(format!("begin {}", name));
            let result = f(self);
            self.events.push(format!("end {}", name));
            result
        }

        fn step(&mut self, name: &'static str, index: usize, _elapsed: Duration) {
            self.events.push(format!("{} {}", name, index));
        }
    }

    fn small(dimension: usize, power: usize) -> WorkloadConfig {
        WorkloadConfig { dimension, power, ..WorkloadConfig::default() }
    }

    #[test]
    fn stages_run_in_order() {
        let mut recorder = Recorder::default();
        run(&small(4, 2), &mut recorder).unwrap();
        assert_eq!(
            recorder.events,
            vec![
                "begin generate",
                "end generate",
                "begin power",
                "power::multiply 0",
                "power::multiply 1",
                "end power",
                "begin solve",
                "end solve",
            ]
        );
    }

    #[test]
    fn observer_does_not_change_result() {
        let config = small(6, 3);
        let observed = run(&config, &mut Recorder::default()).unwrap();
        let plain = run(&config, &mut Unobserved).unwrap();
        assert_eq!(observed.solution, plain.solution);
        assert_eq!(observed.residual, plain.residual);
    }

    #[test]
    fn power_zero_solves_against_identity() {
        let config = small(5, 0);
        let outcome = run(&config, &mut Unobserved).unwrap();
        let (_, b) = matrix::generate(5, config.seed).unwrap();
        assert_eq!(outcome.solution, b);
        assert_eq!(outcome.residual, 0.0);
    }

    #[test]
    fn invalid_config_stops_before_generation() {
        let mut recorder = Recorder::default();
        let result = run(&small(0, 3), &mut recorder);
        assert!(matches!(result, Err(WorkloadError::InvalidDimension { .. })));
        assert!(recorder.events.is_empty());
    }
}
