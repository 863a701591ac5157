//! Операции над матрицами

use super::types::{Matrix, Vector};
use crate::error::WorkloadError;
use crate::utils::measure_time;
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::time::Duration;
use tracing::debug;

/// Генерирует матрицу A (n x n) и вектор b (n) из стандартного нормального
/// распределения. Сначала заполняется A построчно, затем b.
pub fn generate(n: usize, seed: u64) -> Result<(Matrix, Vector), WorkloadError> {
    if n == 0 {
        return Err(WorkloadError::InvalidDimension { name: "n", value: n });
    }
    let elements = n
        .checked_mul(n)
        .ok_or(WorkloadError::OutOfMemory { rows: n, cols: n })?;

    let mut rng = StdRng::seed_from_u64(seed);
    let a = sample_normal(&mut rng, elements).map_err(|_| WorkloadError::OutOfMemory { rows: n, cols: n })?;
    let b = sample_normal(&mut rng, n).map_err(|_| WorkloadError::OutOfMemory { rows: n, cols: 1 })?;

    let a = Matrix::from_shape_vec((n, n), a)
        .map_err(|e| WorkloadError::mismatch("generate", e.to_string()))?;
    Ok((a, Vector::from_vec(b)))
}

fn sample_normal(rng: &mut StdRng, len: usize) -> Result<Vec<f64>, std::collections::TryReserveError> {
    let mut values = Vec::new();
    values.try_reserve_exact(len)?;
    values.extend((0..len).map(|_| rng.sample::<f64, _>(StandardNormal)));
    Ok(values)
}

/// Единичная матрица n x n
pub fn identity(n: usize) -> Matrix {
    Matrix::eye(n)
}

/// p-я степень матрицы: p последовательных умножений, начиная с единичной
pub fn power(a: &Matrix, p: usize) -> Result<Matrix, WorkloadError> {
    power_with(a, p, |_, _| {})
}

/// То же, что [`power`], но после каждого умножения сообщает номер шага и
/// его длительность наблюдателю
pub fn power_with<F>(a: &Matrix, p: usize, mut on_step: F) -> Result<Matrix, WorkloadError>
where
    F: FnMut(usize, Duration),
{
    if !a.is_square() {
        let (rows, cols) = a.dim();
        return Err(WorkloadError::mismatch(
            "power",
            format!("матрица {}x{} не квадратная", rows, cols),
        ));
    }

    let mut ap = identity(a.nrows());
    for step in 0..p {
        let (next, elapsed) = measure_time(|| ap.dot(a));
        ap = next;
        debug!(step, ?elapsed, "шаг умножения завершён");
        on_step(step, elapsed);
    }
    Ok(ap)
}

/// Решает систему M·x = b через LU-разложение с частичным выбором ведущего
/// элемента
pub fn solve(m: &Matrix, b: &Vector) -> Result<Vector, WorkloadError> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(WorkloadError::mismatch(
            "solve",
            format!("матрица {}x{} не квадратная", rows, cols),
        ));
    }
    if rows != b.len() {
        return Err(WorkloadError::mismatch(
            "solve",
            format!("матрица {}x{}, длина вектора {}", rows, cols, b.len()),
        ));
    }

    let lu = DMatrix::from_row_iterator(rows, cols, m.iter().copied()).lu();
    let rhs = DVector::from_iterator(rows, b.iter().copied());
    let x = lu
        .solve(&rhs)
        .ok_or(WorkloadError::Singular { dimension: rows })?;

    if x.iter().any(|v| !v.is_finite()) {
        return Err(WorkloadError::Singular { dimension: rows });
    }
    Ok(x.iter().copied().collect())
}

/// Максимальная невязка max|M·x - b|
pub fn residual(m: &Matrix, x: &Vector, b: &Vector) -> Result<f64, WorkloadError> {
    let (rows, cols) = m.dim();
    if cols != x.len() || rows != b.len() {
        return Err(WorkloadError::mismatch(
            "residual",
            format!("матрица {}x{}, x: {}, b: {}", rows, cols, x.len(), b.len()),
        ));
    }
    let r = &m.dot(x) - b;
    Ok(r.iter().fold(0.0f64, |acc, v| acc.max(v.abs())))
}

/// Максимальная поэлементная разница двух матриц одного размера
pub fn max_abs_diff(a: &Matrix, b: &Matrix) -> Result<f64, WorkloadError> {
    if a.dim() != b.dim() {
        return Err(WorkloadError::mismatch(
            "max_abs_diff",
            format!("{:?} против {:?}", a.dim(), b.dim()),
        ));
    }
    Ok(a.iter()
        .zip(b.iter())
        .fold(0.0f64, |acc, (x, y)| acc.max((x - y).abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn generate_is_deterministic() {
        let (a1, b1) = generate(16, 0).unwrap();
        let (a2, b2) = generate(16, 0).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!(a1.dim(), (16, 16));
        assert_eq!(b1.len(), 16);
    }

    #[test]
    fn generate_depends_on_seed() {
        let (a1, _) = generate(4, 0).unwrap();
        let (a2, _) = generate(4, 1).unwrap();
        assert_ne!(a1, a2);
    }

    #[test]
    fn generate_draws_vector_after_matrix() {
        // b продолжает ту же последовательность, поэтому при n = 1
        // b[0] совпадает со вторым элементом матрицы 2x2 того же зерна
        let (a1, b1) = generate(1, 7).unwrap();
        let (a2, _) = generate(2, 7).unwrap();
        assert_eq!(a1[[0, 0]], a2[[0, 0]]);
        assert_eq!(b1[0], a2[[0, 1]]);
    }

    #[test]
    fn generate_samples_look_standard_normal() {
        let (a, _) = generate(100, 3).unwrap();
        let mean = a.mean().unwrap();
        let var = a.mapv(|v| (v - mean).powi(2)).mean().unwrap();
        assert!(mean.abs() < 0.05, "mean = {}", mean);
        assert!((var - 1.0).abs() < 0.05, "var = {}", var);
    }

    #[test]
    fn generate_rejects_zero_dimension() {
        assert_eq!(
            generate(0, 0),
            Err(WorkloadError::InvalidDimension { name: "n", value: 0 })
        );
    }

    #[test]
    fn generate_reports_out_of_memory() {
        assert!(matches!(generate(usize::MAX, 0), Err(WorkloadError::OutOfMemory { .. })));
        assert!(matches!(generate(1 << 31, 0), Err(WorkloadError::OutOfMemory { .. })));
    }

    #[test]
    fn power_zero_is_identity() {
        let (a, _) = generate(5, 0).unwrap();
        assert_eq!(power(&a, 0).unwrap(), identity(5));
    }

    #[test]
    fn power_one_is_unchanged() {
        let (a, _) = generate(6, 0).unwrap();
        assert_eq!(power(&a, 1).unwrap(), a);
    }

    #[test]
    fn power_two_matches_product() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(power(&a, 2).unwrap(), array![[7.0, 10.0], [15.0, 22.0]]);
    }

    #[test]
    fn power_exponents_add() {
        let (a, _) = generate(4, 0).unwrap();
        for (p1, p2) in [(0, 3), (1, 2), (2, 2), (3, 1)] {
            let whole = power(&a, p1 + p2).unwrap();
            let split = power(&a, p1).unwrap().dot(&power(&a, p2).unwrap());
            let scale = whole.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
            assert!(max_abs_diff(&whole, &split).unwrap() <= 1e-12 * scale);
        }
    }

    #[test]
    fn power_with_reports_every_step() {
        let (a, _) = generate(3, 0).unwrap();
        let mut steps = Vec::new();
        let observed = power_with(&a, 3, |step, _| steps.push(step)).unwrap();
        assert_eq!(steps, vec![0, 1, 2]);
        assert_eq!(observed, power(&a, 3).unwrap());
    }

    #[test]
    fn power_rejects_non_square() {
        let a = Matrix::zeros((2, 3));
        assert!(matches!(
            power(&a, 2),
            Err(WorkloadError::DimensionMismatch { operation: "power", .. })
        ));
    }

    #[test]
    fn solve_recovers_known_solution() {
        let m = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let expected = array![1.0, -2.0, 3.0];
        let b = m.dot(&expected);
        let x = solve(&m, &b).unwrap();
        assert!(x.iter().zip(expected.iter()).all(|(a, e)| (a - e).abs() < 1e-12));
    }

    #[test]
    fn solve_random_system_has_small_residual() {
        let (m, b) = generate(20, 11).unwrap();
        let x = solve(&m, &b).unwrap();
        assert!(residual(&m, &x, &b).unwrap() < 1e-9);
    }

    #[test]
    fn solve_scalar_is_division() {
        let (a, b) = generate(1, 0).unwrap();
        let x = solve(&a, &b).unwrap();
        assert!((x[0] - b[0] / a[[0, 0]]).abs() <= 1e-15 * x[0].abs().max(1.0));
    }

    #[test]
    fn solve_zero_scalar_is_singular() {
        let m = array![[0.0]];
        let b = array![1.0];
        assert_eq!(solve(&m, &b), Err(WorkloadError::Singular { dimension: 1 }));
    }

    #[test]
    fn solve_rank_deficient_is_singular() {
        let m = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 1.0];
        assert_eq!(solve(&m, &b), Err(WorkloadError::Singular { dimension: 2 }));
    }

    #[test]
    fn solve_checks_shapes() {
        let m = Matrix::eye(3);
        assert!(matches!(
            solve(&m, &array![1.0, 2.0]),
            Err(WorkloadError::DimensionMismatch { operation: "solve", .. })
        ));
        assert!(matches!(
            solve(&Matrix::zeros((2, 3)), &array![1.0, 2.0]),
            Err(WorkloadError::DimensionMismatch { operation: "solve", .. })
        ));
    }

    #[test]
    fn max_abs_diff_checks_shapes() {
        let a = Matrix::zeros((2, 2));
        let b = Matrix::zeros((2, 3));
        assert!(max_abs_diff(&a, &b).is_err());
        assert_eq!(max_abs_diff(&a, &Matrix::eye(2)).unwrap(), 1.0);
    }
}
