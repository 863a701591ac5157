//! Профилирование нагрузки
//!
//! Учитывает вложенные вызовы: для каждой записи хранится число вызовов,
//! накопленное время (вместе с вложенными) и собственное время.
//! В режиме [`ProfileMode::Lines`] каждый шаг умножения учитывается отдельно.

use crate::workload::Instrument;
use anyhow::{Context, Result};
use prettytable::{row, Table};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Детализация профиля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileMode {
    /// Только этапы (generate, power, solve)
    Calls,
    /// Этапы и каждый шаг внутри этапа
    Lines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub name: String,
    pub calls: u64,
    /// Собственное время, без вложенных вызовов
    pub own_secs: f64,
    /// Накопленное время, включая вложенные вызовы
    pub cumulative_secs: f64,
}

impl ProfileEntry {
    pub fn per_call_secs(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.cumulative_secs / self.calls as f64
        }
    }
}

/// Содержимое файла статистики
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub mode: ProfileMode,
    /// Отсортированы по накопленному времени
    pub entries: Vec<ProfileEntry>,
}

impl ProfileStats {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Не удалось прочитать статистику {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Не удалось разобрать статистику {}", path.display()))
    }
}

pub struct Profiler {
    mode: ProfileMode,
    entries: Vec<ProfileEntry>,
    // Время вложенных вызовов для каждого открытого кадра
    frames: Vec<f64>,
}

impl Profiler {
    pub fn new(mode: ProfileMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Выполняет `f` как именованный вызов
    pub fn call<T, F>(&mut self, name: &str, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let started = self.begin();
        let result = f(self);
        self.end(name, started);
        result
    }

    /// Открывает кадр вызова. Каждому `begin` должен соответствовать `end`
    pub fn begin(&mut self) -> Instant {
        self.frames.push(0.0);
        Instant::now()
    }

    /// Закрывает последний открытый кадр и учитывает его под именем `name`
    pub fn end(&mut self, name: &str, started: Instant) {
        let cumulative = started.elapsed().as_secs_f64();
        let children = self.frames.pop().unwrap_or(0.0);
        self.account(name, cumulative, (cumulative - children).max(0.0));
    }

    /// Учитывает уже измеренный вызов без вложенных
    pub fn record(&mut self, name: &str, elapsed: Duration) {
        let secs = elapsed.as_secs_f64();
        self.account(name, secs, secs);
    }

    fn account(&mut self, name: &str, cumulative: f64, own: f64) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.calls += 1;
                entry.cumulative_secs += cumulative;
                entry.own_secs += own;
            }
            None => self.entries.push(ProfileEntry {
                name: name.to_string(),
                calls: 1,
                own_secs: own,
                cumulative_secs: cumulative,
            }),
        }
        if let Some(parent) = self.frames.last_mut() {
            *parent += cumulative;
        }
    }

    pub fn entry(&self, name: &str) -> Option<&ProfileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Записи по убыванию накопленного времени
    pub fn entries_by_cumulative(&self) -> Vec<ProfileEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| b.cumulative_secs.total_cmp(&a.cumulative_secs));
        entries
    }

    pub fn stats(&self) -> ProfileStats {
        ProfileStats {
            mode: self.mode,
            entries: self.entries_by_cumulative(),
        }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["Вызов", "Число вызовов", "Собств. время, с", "Накопл. время, с", "На вызов, с"]);
        for entry in self.entries_by_cumulative() {
            table.add_row(row![
                entry.name,
                entry.calls,
                format!("{:.6}", entry.own_secs),
                format!("{:.6}", entry.cumulative_secs),
                format!("{:.6}", entry.per_call_secs()),
            ]);
        }
        table
    }

    /// Печатает сводку, отсортированную по накопленному времени
    pub fn print_stats(&self) {
        self.table().printstd();
    }

    /// Сохраняет статистику в JSON
    pub fn dump_stats(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Не удалось создать файл статистики {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.stats())
            .with_context(|| format!("Не удалось записать статистику в {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

impl Instrument for Profiler {
    fn stage<T, F>(&mut self, name: &'static str, f: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        self.call(name, f)
    }

    fn step(&mut self, name: &'static str, _index: usize, elapsed: Duration) {
        if self.mode == ProfileMode::Lines {
            self.record(name, elapsed);
        }
    }
}
