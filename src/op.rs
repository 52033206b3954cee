//! One-body and two-body operators over a `Basis`.
//!
//! A one-body operator `A[p q]` is stored as an `N × N` matrix.  A two-body
//! operator `V[p q r s]` is stored as an `N² × N²` matrix whose rows are
//! the ordered bra pairs `p q ↦ p N + q` and whose columns are the ordered
//! ket pairs `r s ↦ r N + s`.
//!
//! Binary operations require both operands to share the same basis (by
//! structural equality) and the same `Herm` tag.
use std::sync::Arc;
use std::ops::{Mul, MulAssign};
use rand::Rng;
use rand_distr::StandardNormal;
use super::basis::Basis;
use super::linalg::congruence;
use super::mat::Mat;

quick_error! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        IncompatibleBasis {
            display("operators are defined over different bases")
        }
        IncompatibleHerm {
            display("operators have different hermiticity")
        }
        NotHermitian {
            display("operator is not hermitian")
        }
    }
}

/// Symmetry of an operator under adjoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Herm {
    Hermitian,
    Antihermitian,
}

impl Default for Herm {
    fn default() -> Self {
        Herm::Hermitian
    }
}

impl Herm {
    /// `+1` for hermitian, `−1` for antihermitian.
    pub fn sign(self) -> f64 {
        match self {
            Herm::Hermitian => 1.0,
            Herm::Antihermitian => -1.0,
        }
    }
}

/// Fast path for shared handles; falls back to structural comparison.
pub fn same_basis(a: &Arc<Basis>, b: &Arc<Basis>) -> bool {
    Arc::ptr_eq(a, b) || a == b
}

fn check_compat(
    basis1: &Arc<Basis>,
    herm1: Herm,
    basis2: &Arc<Basis>,
    herm2: Herm,
) -> Result<(), Error> {
    if !same_basis(basis1, basis2) {
        return Err(Error::IncompatibleBasis);
    }
    if herm1 != herm2 {
        return Err(Error::IncompatibleHerm);
    }
    Ok(())
}

/// `y ← α × x + y`
fn axpy(alpha: f64, x: &Mat<f64>, y: &mut Mat<f64>) {
    debug_assert_eq!(x.dims(), y.dims());
    for (y, x) in y.as_slice_mut().iter_mut().zip(x.as_slice()) {
        *y += alpha * x;
    }
}

/// `½ (A + s Aᵗ)`
fn hermitize_mat(sign: f64, a: &Mat<f64>) -> Mat<f64> {
    let mut r = a.transpose();
    for (r, a) in r.as_slice_mut().iter_mut().zip(a.as_slice()) {
        *r = (a + sign * *r) / 2.0;
    }
    r
}

/// `U ⊗ U`, i.e. `W[p q, r s] = U[p r] U[q s]`.
fn kron_square(u: &Mat<f64>) -> Mat<f64> {
    let n = u.num_rows();
    assert_eq!(n, u.num_cols());
    let mut w = Mat::zero(n * n, n * n);
    for p in 0 .. n {
        for q in 0 .. n {
            for r in 0 .. n {
                for s in 0 .. n {
                    w[(p * n + q, r * n + s)] = u[(p, r)] * u[(q, s)];
                }
            }
        }
    }
    w
}

/// One-body operator.
#[derive(Clone, Debug)]
pub struct Op1 {
    pub basis: Arc<Basis>,
    pub herm: Herm,
    pub mat: Mat<f64>,
}

impl Op1 {
    pub fn new(basis: Arc<Basis>) -> Self {
        Self::with_herm(basis, Default::default())
    }

    pub fn with_herm(basis: Arc<Basis>, herm: Herm) -> Self {
        let n = basis.len();
        Self { basis, herm, mat: Mat::zero(n, n) }
    }

    pub fn dim(&self) -> usize {
        self.basis.len()
    }

    pub fn is_hermitian(&self) -> bool {
        self.herm == Herm::Hermitian
    }

    #[inline]
    pub fn at(&self, p: usize, q: usize) -> f64 {
        self.mat[(p, q)]
    }

    #[inline]
    pub fn set(&mut self, p: usize, q: usize, value: f64) {
        self.mat[(p, q)] = value;
    }

    #[inline]
    pub fn add(&mut self, p: usize, q: usize, value: f64) {
        self.mat[(p, q)] += value;
    }

    pub fn set_zero(&mut self) {
        self.mat.set_zero();
    }

    pub fn check_compat(&self, other: &Self) -> Result<(), Error> {
        check_compat(&self.basis, self.herm, &other.basis, other.herm)
    }

    /// `self ← self + α × other`
    pub fn axpy(&mut self, alpha: f64, other: &Self) -> Result<(), Error> {
        self.check_compat(other)?;
        axpy(alpha, &other.mat, &mut self.mat);
        Ok(())
    }

    pub fn try_add_assign(&mut self, other: &Self) -> Result<(), Error> {
        self.axpy(1.0, other)
    }

    pub fn try_sub_assign(&mut self, other: &Self) -> Result<(), Error> {
        self.axpy(-1.0, other)
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, Error> {
        let mut r = self.clone();
        r.try_add_assign(other)?;
        Ok(r)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, Error> {
        let mut r = self.clone();
        r.try_sub_assign(other)?;
        Ok(r)
    }

    pub fn scale(&mut self, factor: f64) {
        for x in self.mat.as_slice_mut() {
            *x *= factor;
        }
    }

    /// ```text
    /// R[p q] = ½ (A[p q] ± A[q p])
    /// ```
    pub fn hermitize(&self) -> Self {
        Self {
            basis: self.basis.clone(),
            herm: self.herm,
            mat: hermitize_mat(self.herm.sign(), &self.mat),
        }
    }

    /// Diagonal elements.
    pub fn diag(&self) -> Vec<f64> {
        (0 .. self.dim()).map(|p| self.at(p, p)).collect()
    }

    /// Copy with the diagonal elements zeroed.
    pub fn offdiag(&self) -> Self {
        let mut r = self.clone();
        for p in 0 .. self.dim() {
            r.set(p, p, 0.0);
        }
        r
    }

    /// ```text
    /// R[p q] = ∑[r s] U[r p] A[r s] U[s q]
    /// ```
    pub fn unitary_transform(&self, u: &Mat<f64>) -> Self {
        assert_eq!(u.dims(), (self.dim(), self.dim()));
        Self {
            basis: self.basis.clone(),
            herm: self.herm,
            mat: congruence(u, &self.mat),
        }
    }
}

impl MulAssign<f64> for Op1 {
    fn mul_assign(&mut self, factor: f64) {
        self.scale(factor);
    }
}

impl Mul<f64> for Op1 {
    type Output = Self;
    fn mul(mut self, factor: f64) -> Self::Output {
        self.scale(factor);
        self
    }
}

impl<'a> Mul<f64> for &'a Op1 {
    type Output = Op1;
    fn mul(self, factor: f64) -> Self::Output {
        self.clone() * factor
    }
}

impl Mul<Op1> for f64 {
    type Output = Op1;
    fn mul(self, op: Op1) -> Self::Output {
        op * self
    }
}

impl<'a> Mul<&'a Op1> for f64 {
    type Output = Op1;
    fn mul(self, op: &'a Op1) -> Self::Output {
        op * self
    }
}

/// Two-body operator.
#[derive(Clone, Debug)]
pub struct Op2 {
    pub basis: Arc<Basis>,
    pub herm: Herm,
    pub mat: Mat<f64>,
}

impl Op2 {
    pub fn new(basis: Arc<Basis>) -> Self {
        Self::with_herm(basis, Default::default())
    }

    pub fn with_herm(basis: Arc<Basis>, herm: Herm) -> Self {
        let n = basis.len();
        Self { basis, herm, mat: Mat::zero(n * n, n * n) }
    }

    pub fn dim(&self) -> usize {
        self.basis.len()
    }

    pub fn is_hermitian(&self) -> bool {
        self.herm == Herm::Hermitian
    }

    #[inline]
    fn pair(&self, p: usize, q: usize) -> usize {
        let n = self.dim();
        debug_assert!(p < n && q < n);
        p * n + q
    }

    #[inline]
    pub fn at(&self, p: usize, q: usize, r: usize, s: usize) -> f64 {
        self.mat[(self.pair(p, q), self.pair(r, s))]
    }

    #[inline]
    pub fn set(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let (pq, rs) = (self.pair(p, q), self.pair(r, s));
        self.mat[(pq, rs)] = value;
    }

    #[inline]
    pub fn add(&mut self, p: usize, q: usize, r: usize, s: usize, value: f64) {
        let (pq, rs) = (self.pair(p, q), self.pair(r, s));
        self.mat[(pq, rs)] += value;
    }

    pub fn set_zero(&mut self) {
        self.mat.set_zero();
    }

    pub fn check_compat(&self, other: &Self) -> Result<(), Error> {
        check_compat(&self.basis, self.herm, &other.basis, other.herm)
    }

    /// `self ← self + α × other`
    pub fn axpy(&mut self, alpha: f64, other: &Self) -> Result<(), Error> {
        self.check_compat(other)?;
        axpy(alpha, &other.mat, &mut self.mat);
        Ok(())
    }

    pub fn try_add_assign(&mut self, other: &Self) -> Result<(), Error> {
        self.axpy(1.0, other)
    }

    pub fn try_sub_assign(&mut self, other: &Self) -> Result<(), Error> {
        self.axpy(-1.0, other)
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, Error> {
        let mut r = self.clone();
        r.try_add_assign(other)?;
        Ok(r)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, Error> {
        let mut r = self.clone();
        r.try_sub_assign(other)?;
        Ok(r)
    }

    pub fn scale(&mut self, factor: f64) {
        for x in self.mat.as_slice_mut() {
            *x *= factor;
        }
    }

    /// ```text
    /// R[p q r s] = ½ (V[p q r s] ± V[r s p q])
    /// ```
    pub fn hermitize(&self) -> Self {
        Self {
            basis: self.basis.clone(),
            herm: self.herm,
            mat: hermitize_mat(self.herm.sign(), &self.mat),
        }
    }

    /// ```text
    /// R[p q r s] = ¼ (V[p q r s] − V[q p r s] + V[q p s r] − V[p q s r])
    /// ```
    pub fn antisymmetrize(&self) -> Self {
        let n = self.dim();
        let mut r = Self::with_herm(self.basis.clone(), self.herm);
        for p in 0 .. n {
            for q in 0 .. n {
                for s1 in 0 .. n {
                    for s2 in 0 .. n {
                        r.set(p, q, s1, s2, (
                            self.at(p, q, s1, s2)
                                - self.at(q, p, s1, s2)
                                + self.at(q, p, s2, s1)
                                - self.at(p, q, s2, s1)
                        ) / 4.0);
                    }
                }
            }
        }
        r
    }

    /// ```text
    /// R[p q r s] = ∑[t u v w] U[t p] U[u q] V[t u v w] U[v r] U[w s]
    /// ```
    pub fn unitary_transform(&self, u: &Mat<f64>) -> Self {
        assert_eq!(u.dims(), (self.dim(), self.dim()));
        Self {
            basis: self.basis.clone(),
            herm: self.herm,
            mat: congruence(&kron_square(u), &self.mat),
        }
    }
}

impl MulAssign<f64> for Op2 {
    fn mul_assign(&mut self, factor: f64) {
        self.scale(factor);
    }
}

impl Mul<f64> for Op2 {
    type Output = Self;
    fn mul(mut self, factor: f64) -> Self::Output {
        self.scale(factor);
        self
    }
}

impl<'a> Mul<f64> for &'a Op2 {
    type Output = Op2;
    fn mul(self, factor: f64) -> Self::Output {
        self.clone() * factor
    }
}

impl Mul<Op2> for f64 {
    type Output = Op2;
    fn mul(self, op: Op2) -> Self::Output {
        op * self
    }
}

impl<'a> Mul<&'a Op2> for f64 {
    type Output = Op2;
    fn mul(self, op: &'a Op2) -> Self::Output {
        op * self
    }
}

/// Random hermitian one-body operator with standard normal entries.
pub fn rand_op1<R: Rng>(basis: &Arc<Basis>, rng: &mut R) -> Op1 {
    let mut a = Op1::new(basis.clone());
    for x in a.mat.as_slice_mut() {
        *x = rng.sample(StandardNormal);
    }
    a.hermitize()
}

/// Random hermitian, antisymmetric two-body operator.
pub fn rand_op2<R: Rng>(basis: &Arc<Basis>, rng: &mut R) -> Op2 {
    let mut a = Op2::new(basis.clone());
    for x in a.mat.as_slice_mut() {
        *x = rng.sample(StandardNormal);
    }
    a.antisymmetrize().hermitize()
}

/// Random orthogonal matrix, obtained as the eigenvectors of a random
/// symmetric matrix.
pub fn rand_orthogonal<R: Rng>(
    basis: &Arc<Basis>,
    rng: &mut R,
) -> Result<Mat<f64>, i32> {
    use super::linalg::{heevr, Part};
    let a = rand_op1(basis, rng);
    let mut w = vec![0.0; a.dim()];
    let mut z = Mat::zero(a.dim(), a.dim());
    heevr(Part::Lower, &a.mat, 0.0, &mut w, &mut z)?;
    Ok(z)
}
