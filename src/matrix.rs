//! Fixed 4x4 matrix algebra.
//!
//! All operations are pure: they take matrices by reference and return a fresh
//! value, so a destination register that is also an operand is never read after
//! it has started to change.

use std::fmt;

pub const SIZE: usize = 4;
pub const CELLS: usize = SIZE * SIZE;

/// Above this absolute value a matrix is printed in scientific notation.
const SCIENTIFIC_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix {
    data: [[f64; SIZE]; SIZE],
}

impl Matrix {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_rows(data: [[f64; SIZE]; SIZE]) -> Self {
        Self { data }
    }

    /// Fill row-major from `values`: cells past the end of `values` become zero and
    /// anything after the 16th value is ignored.
    pub fn load(values: &[f64]) -> Self {
        let mut data = [[0.0; SIZE]; SIZE];
        for (i, &v) in values.iter().take(CELLS).enumerate() {
            data[i / SIZE][i % SIZE] = v;
        }
        Self { data }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn rows(&self) -> &[[f64; SIZE]; SIZE] {
        &self.data
    }

    pub fn add(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Matrix) -> Matrix {
        let mut out = [[0.0; SIZE]; SIZE];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = (0..SIZE).map(|k| self.data[row][k] * other.data[k][col]).sum();
            }
        }
        Matrix { data: out }
    }

    pub fn scale(&self, scalar: f64) -> Matrix {
        self.map(|a| a * scalar)
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = [[0.0; SIZE]; SIZE];
        for (row, out_row) in out.iter_mut().enumerate() {
            for (col, cell) in out_row.iter_mut().enumerate() {
                *cell = self.data[col][row];
            }
        }
        Matrix { data: out }
    }

    /// True when any cell's magnitude is strictly above the scientific threshold.
    pub fn needs_scientific(&self) -> bool {
        self.data
            .iter()
            .flatten()
            .any(|v| v.abs() > SCIENTIFIC_THRESHOLD)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        let mut out = self.data;
        out.iter_mut().flatten().for_each(|v| *v = f(*v));
        Matrix { data: out }
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Matrix {
        let mut out = [[0.0; SIZE]; SIZE];
        for row in 0..SIZE {
            for col in 0..SIZE {
                out[row][col] = f(self.data[row][col], other.data[row][col]);
            }
        }
        Matrix { data: out }
    }
}

/// Format like C's `%.2e`: two fraction digits and a signed, two-digit exponent.
fn format_scientific(value: f64) -> String {
    let raw = format!("{:.2e}", value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        // inf and NaN carry no exponent
        None => raw,
    }
}

/// Renders four tab-separated rows, one per line.
///
/// The notation is chosen for the whole matrix: if any cell exceeds the threshold
/// every cell is printed in scientific notation.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scientific = self.needs_scientific();
        for row in &self.data {
            let cells: Vec<String> = row
                .iter()
                .map(|&v| {
                    if scientific {
                        format!("{:>10}", format_scientific(v))
                    } else {
                        format!("{:7.2}", v)
                    }
                })
                .collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
