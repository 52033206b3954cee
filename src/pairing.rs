//! Pairing model.
//!
//! Doubly degenerate levels with unit spacing, coupled by an interaction
//! that moves a spin-up/spin-down pair from one level to another.
use std::sync::Arc;
use super::basis::Basis;
use super::op::{Op1, Op2};

/// ```text
/// H = ∑[p] n[p] a†[p] a[p]
///   − g/2 ∑[n n'] a†[n,+] a†[n,−] a[n',−] a[n',+]
/// ```
///
/// Returned as the one-body and (antisymmetrized) two-body matrix elements.
pub fn hamiltonian(basis: &Arc<Basis>, g: f64) -> (Op1, Op2) {
    let states = basis.states();

    let mut h1 = Op1::new(basis.clone());
    for x in states {
        for y in states {
            if x.n == y.n && x.spin == y.spin {
                h1.set(x.index, y.index, x.n as f64);
            }
        }
    }

    let mut h2 = Op2::new(basis.clone());
    for p in states {
        for q in states {
            if p.n != q.n || p.spin == q.spin {
                continue;
            }
            for r in states {
                for s in states {
                    if r.n != s.n || r.spin == s.spin {
                        continue;
                    }
                    let sign = if p.spin == r.spin { -1.0 } else { 1.0 };
                    h2.set(p.index, q.index, r.index, s.index, sign * g / 2.0);
                }
            }
        }
    }
    (h1, h2)
}

/// Pair-breaking perturbation: a single particle hops to a different level
/// with the same spin while a spectator stays put.
///
/// ```text
/// X[p q r s] = g_pert/2   if s[p] = s[r], n[p] ≠ n[r], q = s
/// ```
///
/// antisymmetrized and then hermitized.  Unlike the pairing interaction,
/// this gives the Fock operator off-diagonal elements.
pub fn perturbation(basis: &Arc<Basis>, g_pert: f64) -> Op2 {
    let states = basis.states();
    let mut x = Op2::new(basis.clone());
    for p in states {
        for r in states {
            if p.spin != r.spin || p.n == r.n {
                continue;
            }
            for q in states {
                x.set(p.index, q.index, r.index, q.index, g_pert / 2.0);
            }
        }
    }
    x.antisymmetrize().hermitize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::hf::normord;
    use super::super::mat::Mat;
    use super::super::utils::Toler;

    const TOLER: Toler = Toler { relerr: 1e-14, abserr: 1e-14 };

    fn basis() -> Arc<Basis> {
        Arc::new(Basis::new(4, 2).unwrap())
    }

    #[test]
    fn test_hamiltonian() {
        let basis = basis();
        let (h1, h2) = hamiltonian(&basis, 0.5);
        assert_eq!(h1.diag(), vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(h1.offdiag().mat, Mat::zero(8, 8));

        // (0↓ 0↑ | 2↓ 2↑)
        assert_eq!(h2.at(0, 1, 4, 5), -0.25);
        assert_eq!(h2.at(0, 1, 5, 4), 0.25);
        assert_eq!(h2.at(1, 0, 5, 4), -0.25);
        // not a pair
        assert_eq!(h2.at(0, 2, 4, 5), 0.0);
        assert_eq!(h2.at(0, 0, 4, 5), 0.0);

        assert!(h1.is_hermitian() && h2.is_hermitian());
        assert_eq!(h2.antisymmetrize().mat, h2.mat);
        assert_eq!(h2.hermitize().mat, h2.mat);
    }

    #[test]
    fn test_hamiltonian_normord() {
        let basis = basis();
        let (h1, h2) = hamiltonian(&basis, 0.5);
        let (e, f, _) = normord(&h1, &h2).unwrap();
        assert_eq!(e, 1.5);
        assert_eq!(f.diag(), vec![-0.25, -0.25, 0.75, 0.75, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(f.offdiag().mat, Mat::zero(8, 8));
    }

    #[test]
    fn test_perturbation() {
        let basis = basis();
        let x = perturbation(&basis, 0.1);
        assert!(x.is_hermitian());
        let y = x.antisymmetrize();
        for (a, b) in x.mat.as_slice().iter().zip(y.mat.as_slice()) {
            toler_assert_eq!(TOLER, *a, *b);
        }
        for (i, &y) in x.mat.as_slice().iter().enumerate() {
            let (pq, rs) = (i / x.mat.num_cols(), i % x.mat.num_cols());
            assert_eq!(y, x.mat[(rs, pq)]);
        }
        // spin is conserved
        let spins = basis.spins();
        let n = basis.len();
        for p in 0 .. n {
            for q in 0 .. n {
                for r in 0 .. n {
                    for s in 0 .. n {
                        if spins[p] + spins[q] != spins[r] + spins[s] {
                            assert_eq!(x.at(p, q, r, s), 0.0);
                        }
                    }
                }
            }
        }

        let (h1, h2) = hamiltonian(&basis, 0.5);
        let h2 = h2.try_add(&x).unwrap();
        let (e, f, _) = normord(&h1, &h2).unwrap();
        assert_eq!(e, 1.5);
        assert!(f.offdiag().mat.as_slice().iter().any(|&y| y != 0.0));
    }
}
