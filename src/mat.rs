//! Dense, row-major, BLAS-compatible matrices.

use std::fmt;
use std::ops::{Index, IndexMut};
use num::{One, Zero};

/// The indexing convention is row-major and the storage is always packed
/// (the stride equals `num_cols`).
#[derive(Clone, Default, PartialEq)]
pub struct Mat<T> {
    data: Vec<T>,
    num_rows: usize,
    num_cols: usize,
}

impl<T: fmt::Debug> fmt::Debug for Mat<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("mat!")?;
        let mut rows = f.debug_list();
        for row in self.rows() {
            rows.entry(&row);
        }
        rows.finish()
    }
}

impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;
    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        self.get(i, j)
            .unwrap_or_else(|| panic!("out of range: ({}, {})", i, j))
    }
}

impl<T> IndexMut<(usize, usize)> for Mat<T> {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        self.get_mut(i, j)
            .unwrap_or_else(|| panic!("out of range: ({}, {})", i, j))
    }
}

/// Convenience function for creating matrices directly in code.
impl<T> From<Vec<Vec<T>>> for Mat<T> {
    fn from(rows: Vec<Vec<T>>) -> Self {
        let ni = rows.len();
        let nj = if ni == 0 { 0 } else { rows[0].len() };
        let mut data = Vec::with_capacity(ni * nj);
        for mut row in rows {
            assert_eq!(row.len(), nj, "rows must have equal lengths");
            data.extend(row.drain(..));
        }
        Self::from_vec(data, ni, nj)
    }
}

impl<T: Clone> Mat<T> {
    pub fn replicate(num_rows: usize, num_cols: usize, value: T) -> Self {
        Self::from_vec(vec![value; num_rows * num_cols], num_rows, num_cols)
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0 .. self.num_cols {
            for i in 0 .. self.num_rows {
                data.push(self[(i, j)].clone());
            }
        }
        Self::from_vec(data, self.num_cols, self.num_rows)
    }

    pub fn fill(&mut self, value: &T) {
        for x in &mut self.data {
            x.clone_from(value);
        }
    }
}

impl<T: Clone + Zero> Mat<T> {
    pub fn zero(num_rows: usize, num_cols: usize) -> Self {
        Self::replicate(num_rows, num_cols, Zero::zero())
    }

    pub fn set_zero(&mut self) {
        self.fill(&Zero::zero());
    }
}

impl<T: Clone + Zero + One> Mat<T> {
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0 .. n {
            m[(i, i)] = One::one();
        }
        m
    }
}

impl<T> Mat<T> {
    /// Panics if the vector has the wrong length.
    pub fn from_vec(vec: Vec<T>, num_rows: usize, num_cols: usize) -> Self {
        let n = num_rows.checked_mul(num_cols).expect("matrix too large");
        assert_eq!(vec.len(), n);
        Self { data: vec, num_rows, num_cols }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Separation between rows.
    pub fn stride(&self) -> usize {
        self.num_cols
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.num_rows && j < self.num_cols {
            self.data.get(i * self.num_cols + j)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut T> {
        if i < self.num_rows && j < self.num_cols {
            self.data.get_mut(i * self.num_cols + j)
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // chunks(0) panics, so empty matrices need special care
        let n = self.num_rows;
        self.data.chunks(self.num_cols.max(1)).take(n)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}
