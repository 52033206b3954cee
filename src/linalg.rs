//! Linear algebra.
use std::cmp::max;
use cblas;
use lapacke;
use super::mat::Mat;
use super::utils::{self, cast};

pub use cblas::{Part, Transpose};

pub fn part_to_u8(part: Part) -> u8 {
    match part {
        Part::Upper => b'U',
        Part::Lower => b'L',
    }
}

/// `C ← α op(A) op(B) + β C`
///
/// A thin wrapper over `cblas::dgemm` that panics if the sizes don't match.
pub fn gemm(
    transa: Transpose,
    transb: Transpose,
    alpha: f64,
    a: &Mat<f64>,
    b: &Mat<f64>,
    beta: f64,
    c: &mut Mat<f64>,
) {
    let (ma, ka) = utils::swap_if(transa != Transpose::None, a.dims());
    let (kb, nb) = utils::swap_if(transb != Transpose::None, b.dims());
    let (mc, nc) = c.dims();
    assert_eq!(ma, mc);
    assert_eq!(nb, nc);
    assert_eq!(ka, kb);
    if mc == 0 || nc == 0 {
        return;
    }
    // BLAS rejects a leading dimension of zero even when nothing is read
    let lda = cast(max(1, a.stride()));
    let ldb = cast(max(1, b.stride()));
    let ldc = cast(max(1, c.stride()));
    unsafe {
        cblas::dgemm(
            cblas::Layout::RowMajor,
            transa,
            transb,
            cast(ma),
            cast(nb),
            cast(ka),
            alpha,
            a.as_slice(),
            lda,
            b.as_slice(),
            ldb,
            beta,
            c.as_slice_mut(),
            ldc,
        );
    }
}

/// `Aᵗ B A` for square `B`.
pub fn congruence(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    let (m, n) = a.dims();
    let mut t = Mat::zero(m, n);
    gemm(Transpose::None, Transpose::None, 1.0, b, a, 0.0, &mut t);
    let mut r = Mat::zero(n, n);
    gemm(Transpose::Ordinary, Transpose::None, 1.0, a, &t, 0.0, &mut r);
    r
}

/// Diagonalize a real symmetric matrix using `dsyevr`.  Only the triangle
/// given by `uplo` is read and `a` itself is not modified.
///
/// On success, `w` holds all eigenvalues in ascending order, the columns of
/// `z` hold the corresponding orthonormal eigenvectors, and the number of
/// eigenvalues found is returned.  On failure, the LAPACK `info` code is
/// returned.
pub fn heevr(
    uplo: Part,
    a: &Mat<f64>,
    abstol: f64,
    w: &mut [f64],
    z: &mut Mat<f64>,
) -> Result<usize, i32> {
    let n = a.num_rows();
    assert_eq!(n, a.num_cols());
    assert_eq!(z.dims(), (n, n));
    assert!(w.len() >= n);
    if n == 0 {
        return Ok(0);
    }
    // make sure matrix `a` is not modified!
    let mut a = a.clone();
    let lda = cast(a.stride());
    let ldz = cast(z.stride());
    let mut isuppz = vec![0; 2 * max(1, n)];
    let mut m = 0;
    let e = unsafe {
        lapacke::dsyevr(
            lapacke::Layout::RowMajor,
            b'V',
            b'A',
            part_to_u8(uplo),
            cast(n),
            a.as_slice_mut(),
            lda,
            0.0,
            0.0,
            0,
            0,
            abstol,
            &mut m,
            w,
            z.as_slice_mut(),
            ldz,
            &mut isuppz,
        )
    };
    if e == 0 {
        Ok(cast(m))
    } else {
        Err(e)
    }
}
