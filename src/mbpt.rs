//! Many-body perturbation theory for the ground-state energy.
//!
//! All routines take the normal-ordered one-body operator `F` and two-body
//! operator `Γ` in the basis that defines the occupancies.  The unperturbed
//! energies are the diagonal of `F`; the off-diagonal part of `F` enters as
//! the one-body perturbation `X` in the non-canonical terms.
//!
//! Inputs are not validated here: they are expected to come straight out of
//! `hf::normord`.
use super::basis::occ;
use super::mat::Mat;
use super::op::{Op1, Op2};

/// ```text
/// D[i a] = 1 / (ε[i] − ε[a])
/// ```
///
/// Entries outside of the hole-particle block are left as zero and are
/// never read.
pub fn e_denom_1b(f: &Op1) -> Mat<f64> {
    let n = f.dim();
    let e = f.diag();
    let mut d = Mat::zero(n, n);
    for &i in f.basis.states_in(occ::I) {
        for &a in f.basis.states_in(occ::A) {
            d[(i, a)] = 1.0 / (e[i] - e[a]);
        }
    }
    d
}

/// ```text
/// D[i j a b] = 1 / (ε[i] + ε[j] − ε[a] − ε[b])
/// ```
///
/// Stored as an `N² × N²` matrix over `(i j, a b)`.  Entries outside of the
/// hole-hole-particle-particle block are left as zero and are never read.
pub fn e_denom_2b(f: &Op1) -> Mat<f64> {
    let n = f.dim();
    let e = f.diag();
    let mut d = Mat::zero(n * n, n * n);
    for &i in f.basis.states_in(occ::I) {
        for &j in f.basis.states_in(occ::I) {
            for &a in f.basis.states_in(occ::A) {
                for &b in f.basis.states_in(occ::A) {
                    d[(i * n + j, a * n + b)] =
                        1.0 / (e[i] + e[j] - e[a] - e[b]);
                }
            }
        }
    }
    d
}

/// Precomputed denominators and index lists shared by the diagrams.
struct Denoms<'a> {
    n: usize,
    holes: &'a [usize],
    particles: &'a [usize],
    d1: Mat<f64>,
    d2: Mat<f64>,
}

impl<'a> Denoms<'a> {
    fn new(f: &'a Op1) -> Self {
        Self {
            n: f.dim(),
            holes: f.basis.states_in(occ::I),
            particles: f.basis.states_in(occ::A),
            d1: e_denom_1b(f),
            d2: e_denom_2b(f),
        }
    }

    #[inline]
    fn d1(&self, i: usize, a: usize) -> f64 {
        self.d1[(i, a)]
    }

    #[inline]
    fn d2(&self, i: usize, j: usize, a: usize, b: usize) -> f64 {
        self.d2[(i * self.n + j, a * self.n + b)]
    }
}

/// Second-order energy, split into the one-body and two-body parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mp2 {
    pub e1b: f64,
    pub e2b: f64,
}

impl Mp2 {
    pub fn total(&self) -> f64 {
        self.e1b + self.e2b
    }
}

/// Canonical third-order energy: particle-particle ladder, hole-hole ladder,
/// and particle-hole ring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mp3Canonical {
    pub pp: f64,
    pub hh: f64,
    pub ph: f64,
}

impl Mp3Canonical {
    pub fn total(&self) -> f64 {
        self.pp + self.hh + self.ph
    }
}

/// The eleven non-canonical third-order terms, numbered 4 to 14.  All of
/// them vanish when `F` is diagonal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mp3Noncanonical(pub [f64; 11]);

impl Mp3Noncanonical {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Term number `k`, or `None` unless `4 ≤ k ≤ 14`.
    pub fn term(&self, k: usize) -> Option<f64> {
        self.0.get(k.wrapping_sub(4)).cloned()
    }
}

/// Second-order Møller–Plesset perturbation theory.
///
/// ```text
/// E1 = ∑[i a] F[a i] F[i a] / Δ[i a]
/// E2 = 1/4 ∑[i j a b] Γ[a b i j] Γ[i j a b] / Δ[i j a b]
/// ```
pub fn mp2(f: &Op1, gamma: &Op2) -> Mp2 {
    let d = Denoms::new(f);
    let mut e1b = 0.0;
    for &i in d.holes {
        for &a in d.particles {
            e1b += d.d1(i, a) * f.at(a, i) * f.at(i, a);
        }
    }
    let mut e2b = 0.0;
    for &i in d.holes {
        for &j in d.holes {
            for &a in d.particles {
                for &b in d.particles {
                    e2b += d.d2(i, j, a, b)
                        * gamma.at(a, b, i, j)
                        * gamma.at(i, j, a, b);
                }
            }
        }
    }
    Mp2 { e1b, e2b: e2b / 4.0 }
}

/// Third-order terms that survive in a canonical basis.
///
/// ```text
/// Epp = 1/8 ∑[i j a b c d] Γ[i j a b] Γ[a b c d] Γ[c d i j]
///                          / (Δ[i j a b] Δ[i j c d])
/// Ehh = 1/8 ∑[i j k l a b] Γ[i j a b] Γ[a b k l] Γ[k l i j]
///                          / (Δ[i j a b] Δ[k l a b])
/// Eph = −∑[i j k a b c] Γ[i j a b] Γ[k b i c] Γ[a c k j]
///                       / (Δ[i j a b] Δ[k j a c])
/// ```
pub fn mp3_canonical(f: &Op1, gamma: &Op2) -> Mp3Canonical {
    let d = Denoms::new(f);
    let (holes, particles) = (d.holes, d.particles);

    let mut pp = 0.0;
    for &i in holes {
        for &j in holes {
            for &a in particles {
                for &b in particles {
                    let x = d.d2(i, j, a, b) * gamma.at(i, j, a, b);
                    for &c in particles {
                        for &dd in particles {
                            pp += x
                                * d.d2(i, j, c, dd)
                                * gamma.at(a, b, c, dd)
                                * gamma.at(c, dd, i, j);
                        }
                    }
                }
            }
        }
    }

    let mut hh = 0.0;
    for &i in holes {
        for &j in holes {
            for &a in particles {
                for &b in particles {
                    let x = d.d2(i, j, a, b) * gamma.at(i, j, a, b);
                    for &k in holes {
                        for &l in holes {
                            hh += x
                                * d.d2(k, l, a, b)
                                * gamma.at(a, b, k, l)
                                * gamma.at(k, l, i, j);
                        }
                    }
                }
            }
        }
    }

    let mut ph = 0.0;
    for &i in holes {
        for &j in holes {
            for &a in particles {
                for &b in particles {
                    let x = d.d2(i, j, a, b) * gamma.at(i, j, a, b);
                    for &k in holes {
                        for &c in particles {
                            ph += x
                                * d.d2(k, j, a, c)
                                * gamma.at(k, b, i, c)
                                * gamma.at(a, c, k, j);
                        }
                    }
                }
            }
        }
    }

    Mp3Canonical { pp: pp / 8.0, hh: hh / 8.0, ph: -ph }
}

/// Third-order terms involving the off-diagonal part `X` of `F`.
///
/// ```text
/// E4  =  1/2 ∑ Γ[a b i j] Γ[a b c j] X[c i] / (Δ[i j a b] Δ[i c])
/// E5  = −1/2 ∑ Γ[a b i j] Γ[i j k b] X[a k] / (Δ[i j a b] Δ[k a])
/// E6  = −1/2 ∑ Γ[a b i j] X[i k] Γ[a b k j] / (Δ[i j a b] Δ[j k a b])
/// E7  =  1/2 ∑ Γ[a b i j] X[a c] Γ[c b i j] / (Δ[i j a b] Δ[i j c b])
/// E8  =  1/2 ∑ X[a i] Γ[a j c b] Γ[c b i j] / (Δ[i a] Δ[i j b c])
/// E9  =  1/2 ∑ X[a i] Γ[i b j k] Γ[a b k j] / (Δ[i a] Δ[j k a b])
/// E10 =      ∑ Γ[a b i j] X[j b] X[a i] / (Δ[i j a b] Δ[i a])
/// E11 =      ∑ X[a i] X[p b] Γ[a b i p] / (Δ[i a] Δ[i b])
/// E12 =      ∑ X[a i] X[j b] Γ[a b i j] / (Δ[i a] Δ[i j a b])
/// E13 =      ∑ X[a i] X[a b] X[b i] / (Δ[i a] Δ[i b])
/// E14 =     −∑ X[a j] X[i j] X[a i] / (Δ[i a] Δ[j a])
/// ```
///
/// In `E11` the index `p` is not pinned by any denominator and runs over
/// all states.
pub fn mp3_noncanonical(f: &Op1, gamma: &Op2) -> Mp3Noncanonical {
    let d = Denoms::new(f);
    let (holes, particles) = (d.holes, d.particles);
    let h1_pert = f.offdiag();
    let g = |p, q, r, s| gamma.at(p, q, r, s);
    let x = |p, q| h1_pert.at(p, q);
    let mut e = [0.0; 11];

    // terms with three hole indices
    for &i in holes {
        for &j in holes {
            for &k in holes {
                for &a in particles {
                    for &b in particles {
                        e[1] += d.d2(i, j, a, b) * d.d1(k, a)
                            * g(a, b, i, j) * g(i, j, k, b) * x(a, k);
                        e[2] += d.d2(i, j, a, b) * d.d2(j, k, a, b)
                            * g(a, b, i, j) * x(i, k) * g(a, b, k, j);
                        e[5] += d.d1(i, a) * d.d2(j, k, a, b)
                            * x(a, i) * g(i, b, j, k) * g(a, b, k, j);
                    }
                }
            }
        }
    }

    // terms with three particle indices
    for &i in holes {
        for &j in holes {
            for &a in particles {
                for &b in particles {
                    for &c in particles {
                        e[0] += d.d2(i, j, a, b) * d.d1(i, c)
                            * g(a, b, i, j) * g(a, b, c, j) * x(c, i);
                        e[3] += d.d2(i, j, a, b) * d.d2(i, j, c, b)
                            * g(a, b, i, j) * x(a, c) * g(c, b, i, j);
                        e[4] += d.d1(i, a) * d.d2(i, j, b, c)
                            * x(a, i) * g(a, j, c, b) * g(c, b, i, j);
                    }
                }
            }
        }
    }

    // terms with two hole and two particle indices
    for &i in holes {
        for &j in holes {
            for &a in particles {
                for &b in particles {
                    e[6] += d.d2(i, j, a, b) * d.d1(i, a)
                        * g(a, b, i, j) * x(j, b) * x(a, i);
                    e[8] += d.d1(i, a) * d.d2(i, j, a, b)
                        * x(a, i) * x(j, b) * g(a, b, i, j);
                }
            }
        }
    }

    // the spectator of the two one-body vertices is unrestricted
    for &i in holes {
        for &a in particles {
            for &b in particles {
                let y = d.d1(i, a) * d.d1(i, b) * x(a, i);
                for p in 0 .. d.n {
                    e[7] += y * x(p, b) * g(a, b, i, p);
                }
            }
        }
    }

    // purely one-body terms
    for &i in holes {
        for &a in particles {
            for &b in particles {
                e[9] += d.d1(i, a) * d.d1(i, b) * x(a, i) * x(a, b) * x(b, i);
            }
            for &j in holes {
                e[10] += d.d1(i, a) * d.d1(j, a) * x(a, j) * x(i, j) * x(a, i);
            }
        }
    }

    e[0] *= 0.5;
    e[1] *= -0.5;
    e[2] *= -0.5;
    e[3] *= 0.5;
    e[4] *= 0.5;
    e[5] *= 0.5;
    e[10] *= -1.0;
    Mp3Noncanonical(e)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use super::*;
    use super::super::basis::Basis;
    use super::super::hf::normord;
    use super::super::op::{rand_op1, rand_op2};
    use super::super::utils::Toler;

    const RNG_SEED: [u8; 16] = [
        0x0c, 0xd5, 0x3e, 0x81, 0x47, 0xfa, 0x29, 0x6b,
        0x93, 0x10, 0x5c, 0xe7, 0x38, 0xa2, 0x74, 0x1f,
    ];

    const TOLER: Toler = Toler { relerr: 1e-12, abserr: 1e-12 };

    /// Random model with a gap of one between holes and particles.
    fn model(rng: &mut XorShiftRng) -> (Op1, Op2) {
        let basis = Arc::new(Basis::new(3, 1).unwrap());
        let mut h1 = 0.05 * rand_op1(&basis, rng);
        for x in basis.states() {
            h1.add(x.index, x.index, x.n as f64);
        }
        let h2 = 0.1 * rand_op2(&basis, rng);
        let (_, f, gamma) = normord(&h1, &h2).unwrap();
        (f, gamma)
    }

    #[test]
    fn test_denoms() {
        let mut rng = XorShiftRng::from_seed(RNG_SEED);
        let (f, _) = model(&mut rng);
        let e = f.diag();
        let n = f.dim();
        let d1 = e_denom_1b(&f);
        let d2 = e_denom_2b(&f);
        toler_assert_eq!(TOLER, d1[(1, 4)], 1.0 / (e[1] - e[4]));
        toler_assert_eq!(TOLER, d2[(1, 3 * n + 5)],
                         1.0 / (e[0] + e[1] - e[3] - e[5]));
        assert_eq!(d1[(4, 1)], 0.0);
        assert_eq!(d2[(3, n + 5)], 0.0);
    }

    #[test]
    fn test_noncanonical_vanish_when_diagonal() {
        let mut rng = XorShiftRng::from_seed(RNG_SEED);
        let (f, gamma) = model(&mut rng);
        let mut fd = Op1::new(f.basis.clone());
        for (p, e) in f.diag().into_iter().enumerate() {
            fd.set(p, p, e);
        }
        let r = mp3_noncanonical(&fd, &gamma);
        for k in 4 ..= 14 {
            assert_eq!(r.term(k), Some(0.0), "term {}", k);
        }
        assert_eq!(r.term(3), None);
        assert_eq!(r.term(15), None);
        assert_eq!(mp2(&fd, &gamma).e1b, 0.0);

        // and they generally do not vanish otherwise
        let r = mp3_noncanonical(&f, &gamma);
        assert!(r.0.iter().all(|x| x.is_finite()));
        assert!(r.0.iter().any(|&x| x != 0.0));
    }

    #[test]
    fn test_mp3_noncanonical_explicit() {
        // every index runs over the whole basis; the denominators vanish
        // outside of their hole/particle domain and do the restricting
        let mut rng = XorShiftRng::from_seed(RNG_SEED);
        let (f, gamma) = model(&mut rng);
        let n = f.dim();
        let dm1 = e_denom_1b(&f);
        let dm2 = e_denom_2b(&f);
        let xo = f.offdiag();
        let d1 = |p: usize, q: usize| dm1[(p, q)];
        let d2 = |p: usize, q: usize, r: usize, s: usize| dm2[(p * n + q, r * n + s)];
        let h = |p, q, r, s| gamma.at(p, q, r, s);
        let x = |p, q| xo.at(p, q);
        let mut e = [0.0; 11];
        for i in 0 .. n {
            for j in 0 .. n {
                for a in 0 .. n {
                    for b in 0 .. n {
                        for c in 0 .. n {
                            e[0] += 0.5 * d2(i, j, a, b) * d1(i, c)
                                * h(a, b, i, j) * h(a, b, c, j) * x(c, i);
                            e[1] -= 0.5 * d2(i, j, a, b) * d1(c, a)
                                * h(a, b, i, j) * h(i, j, c, b) * x(a, c);
                            e[2] -= 0.5 * d2(i, j, a, b) * d2(j, c, a, b)
                                * h(a, b, i, j) * x(i, c) * h(a, b, c, j);
                            e[3] += 0.5 * d2(i, j, a, b) * d2(i, j, c, b)
                                * h(a, b, i, j) * x(a, c) * h(c, b, i, j);
                            e[4] += 0.5 * d1(i, a) * d2(i, j, b, c)
                                * x(a, i) * h(a, j, c, b) * h(c, b, i, j);
                            e[5] += 0.5 * d1(i, a) * d2(j, c, a, b)
                                * x(a, i) * h(i, b, j, c) * h(a, b, c, j);
                        }
                        e[6] += d2(i, j, a, b) * d1(i, a)
                            * h(a, b, i, j) * x(j, b) * x(a, i);
                        e[7] += d1(i, a) * d1(i, b)
                            * x(a, i) * x(j, b) * h(a, b, i, j);
                        e[8] += d1(i, a) * d2(i, j, a, b)
                            * x(a, i) * x(j, b) * h(a, b, i, j);
                    }
                }
            }
        }
        for i in 0 .. n {
            for a in 0 .. n {
                for b in 0 .. n {
                    e[9] += d1(i, a) * d1(i, b) * x(a, i) * x(a, b) * x(b, i);
                    e[10] -= d1(i, a) * d1(b, a) * x(a, b) * x(i, b) * x(a, i);
                }
            }
        }

        let r = mp3_noncanonical(&f, &gamma);
        let toler = Toler { relerr: 1e-10, abserr: 1e-12 };
        for k in 4 ..= 14 {
            toler_assert_eq!(toler, r.term(k).unwrap(), e[k - 4]);
        }

        // the spectator index of E11 is not confined to holes
        let occs = f.basis.occs();
        let mut e11_holes = 0.0;
        for i in 0 .. n {
            for j in 0 .. n {
                for a in 0 .. n {
                    for b in 0 .. n {
                        if occs[j] == 1 {
                            e11_holes += d1(i, a) * d1(i, b)
                                * x(a, i) * x(j, b) * h(a, b, i, j);
                        }
                    }
                }
            }
        }
        assert!((r.term(11).unwrap() - e11_holes).abs() > 1e-8);
    }

    #[test]
    fn test_mp2_explicit() {
        let mut rng = XorShiftRng::from_seed(RNG_SEED);
        let (f, gamma) = model(&mut rng);
        let e = f.diag();
        let n = f.dim();
        let occs = f.basis.occs();
        let mut e1b = 0.0;
        let mut e2b = 0.0;
        for p in 0 .. n {
            for q in 0 .. n {
                if occs[p] == 1 && occs[q] == 0 {
                    e1b += f.at(p, q).powi(2) / (e[p] - e[q]);
                }
                for r in 0 .. n {
                    for s in 0 .. n {
                        if occs[p] == 1 && occs[q] == 1
                            && occs[r] == 0 && occs[s] == 0
                        {
                            e2b += gamma.at(p, q, r, s).powi(2)
                                / (e[p] + e[q] - e[r] - e[s]) / 4.0;
                        }
                    }
                }
            }
        }
        let r = mp2(&f, &gamma);
        toler_assert_eq!(TOLER, r.e1b, e1b);
        toler_assert_eq!(TOLER, r.e2b, e2b);
        toler_assert_eq!(TOLER, r.total(), e1b + e2b);
        assert!(r.e2b < 0.0);
    }

    #[test]
    fn test_mp3_canonical_explicit() {
        let mut rng = XorShiftRng::from_seed(RNG_SEED);
        let (f, gamma) = model(&mut rng);
        let e = f.diag();
        let n = f.dim();
        let occs = f.basis.occs();
        let h = |p: usize| occs[p] == 1;
        let pt = |p: usize| occs[p] == 0;
        let d = |p: usize, q: usize, r: usize, s: usize| {
            1.0 / (e[p] + e[q] - e[r] - e[s])
        };
        let g = |p, q, r, s| gamma.at(p, q, r, s);
        let (mut pp, mut hh, mut ph) = (0.0, 0.0, 0.0);
        for p in 0 .. n {
            for q in 0 .. n {
                for r in 0 .. n {
                    for s in 0 .. n {
                        if !(h(p) && h(q) && pt(r) && pt(s)) {
                            continue;
                        }
                        let x = d(p, q, r, s) * g(p, q, r, s);
                        for t in 0 .. n {
                            for u in 0 .. n {
                                if pt(t) && pt(u) {
                                    pp += x * d(p, q, t, u)
                                        * g(r, s, t, u) * g(t, u, p, q);
                                }
                                if h(t) && h(u) {
                                    hh += x * d(t, u, r, s)
                                        * g(r, s, t, u) * g(t, u, p, q);
                                }
                                if h(t) && pt(u) {
                                    ph -= x * d(t, q, r, u)
                                        * g(t, s, p, u) * g(r, u, t, q);
                                }
                            }
                        }
                    }
                }
            }
        }
        let r = mp3_canonical(&f, &gamma);
        toler_assert_eq!(TOLER, r.pp, pp / 8.0);
        toler_assert_eq!(TOLER, r.hh, hh / 8.0);
        toler_assert_eq!(TOLER, r.ph, ph);
        toler_assert_eq!(TOLER, r.total(), r.pp + r.hh + r.ph);
    }
}
