//! Normal ordering and Hartree–Fock.
use std::mem;
use super::basis::occ;
use super::linalg::{self, Part};
use super::mat::Mat;
use super::op::{self, Op1, Op2};

quick_error! {
    /// Error type for `Run`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        Op(err: op::Error) {
            from()
            display("{}", err)
            source(err)
        }
        /// Diagonalization of the Fock matrix failed with the given LAPACK
        /// `info` code.
        Heevr(info: i32) {
            display("dsyevr failed (info = {})", info)
        }
        /// The iteration limit was reached.  The run is left in whatever
        /// state was last reached and may still be used.
        NotConverged(num_iter: usize) {
            display("HF did not converge after {} iterations", num_iter)
        }
    }
}

/// ```text
/// E = ∑[i] H[i i] + ½ ∑[i j] V[i j i j]
/// ```
pub fn hf_energy(h1: &Op1, h2: &Op2) -> f64 {
    let holes = h1.basis.states_in(occ::I);
    let mut r = 0.0;
    for &i in holes {
        r += h1.at(i, i);
    }
    for &i in holes {
        for &j in holes {
            r += h2.at(i, j, i, j) / 2.0;
        }
    }
    r
}

/// ```text
/// F[p q] = H[p q] + ∑[i] V[p i q i]
/// ```
pub fn fock(h1: &Op1, h2: &Op2) -> Op1 {
    let n = h1.dim();
    let mut f = h1.clone();
    for p in 0 .. n {
        for q in 0 .. n {
            for &i in h1.basis.states_in(occ::I) {
                f.add(p, q, h2.at(p, i, q, i));
            }
        }
    }
    f
}

/// Normal order `(H, V)` with respect to the reference state defined by the
/// occupancies of the basis.  Returns `(E, F, Γ)`: the reference energy, the
/// normal-ordered one-body operator (Fock), and the normal-ordered two-body
/// operator, which is just `V`.
pub fn normord(h1: &Op1, h2: &Op2) -> Result<(f64, Op1, Op2), op::Error> {
    if !op::same_basis(&h1.basis, &h2.basis) {
        return Err(op::Error::IncompatibleBasis);
    }
    if !h1.is_hermitian() || !h2.is_hermitian() {
        return Err(op::Error::NotHermitian);
    }
    Ok((hf_energy(h1, h2), fock(h1, h2), h2.clone()))
}

/// Hartree–Fock by repeated diagonalization of the Fock matrix.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    pub max_iter: usize,
    /// Convergence threshold for `∑[p] |ε[p] − ε_old[p]|`.
    pub toler: f64,
    pub heevr_abstol: f64,
}

/// `{ max_iter: 100, toler: 1e-6, heevr_abstol: 0.0 }`
impl Default for Conf {
    fn default() -> Self {
        Self {
            max_iter: 100,
            toler: 1e-6,
            heevr_abstol: 0.0,
        }
    }
}

impl Conf {
    pub fn make_run(self, h1: &Op1, h2: &Op2) -> Result<Run, op::Error> {
        let (_, f, _) = normord(h1, h2)?;
        let n = h1.dim();
        Ok(Run {
            conf: self,
            h1: h1.clone(),
            h2: h2.clone(),
            energies: f.diag(),
            coeff: Mat::identity(n),
            num_iter: 0,
            status: Status::Initialized,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Initialized,
    Iterating,
    Converged,
}

/// Outcome of a single iteration.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    /// Reference energy in the basis at the start of the iteration.
    pub hf_energy: f64,
    /// `∑[p] |ε[p] − ε_old[p]|`
    pub energy_change: f64,
    pub converged: bool,
}

#[derive(Clone, Debug)]
pub struct Run {
    pub conf: Conf,
    /// Working one-body operator, in the current basis.
    pub h1: Op1,
    /// Working two-body operator, in the current basis.
    pub h2: Op2,
    /// Single-particle energies from the latest iteration.
    pub energies: Vec<f64>,
    /// Accumulated basis transformation: columns are the current
    /// single-particle states expanded in the original basis.
    pub coeff: Mat<f64>,
    pub num_iter: usize,
    pub status: Status,
}

impl Run {
    /// Diagonalize the Fock matrix and rotate the working operators into
    /// its eigenbasis.  Does not log anything.
    pub fn step(&mut self) -> Result<Step, Error> {
        let (hf_energy, f, _) = normord(&self.h1, &self.h2)?;

        // solve the HF eigenvalue problem.
        // ∑[q] F[p q] U[q g] = ε[g] U[p g]
        let n = f.dim();
        let mut energies = vec![0.0; n];
        let mut u = Mat::zero(n, n);
        linalg::heevr(
            Part::Lower,
            &f.mat,
            self.conf.heevr_abstol,
            &mut energies,
            &mut u,
        ).map_err(Error::Heevr)?;

        self.h1 = self.h1.unitary_transform(&u);
        self.h2 = self.h2.unitary_transform(&u);
        let mut coeff = Mat::zero(n, n);
        linalg::gemm(
            linalg::Transpose::None,
            linalg::Transpose::None,
            1.0,
            &self.coeff,
            &u,
            0.0,
            &mut coeff,
        );
        self.coeff = coeff;

        let old_energies = mem::replace(&mut self.energies, energies);
        let energy_change = self.energies.iter()
            .zip(&old_energies)
            .map(|(e, e_old)| (e - e_old).abs())
            .sum::<f64>();
        let converged = energy_change < self.conf.toler;
        self.num_iter += 1;
        self.status = if converged {
            Status::Converged
        } else {
            Status::Iterating
        };
        Ok(Step { hf_energy, energy_change, converged })
    }

    /// Iterate until convergence or until `max_iter` iterations have been
    /// done, calling `observe` after every iteration.
    pub fn do_run_with<F>(&mut self, mut observe: F) -> Result<(), Error>
        where F: FnMut(usize, &Step, &Self),
    {
        for i in 0 .. self.conf.max_iter {
            let step = self.step()?;
            observe(i, &step, self);
            if step.converged {
                return Ok(());
            }
        }
        Err(Error::NotConverged(self.num_iter))
    }

    /// Iterates until the convergence criterion has been met.
    pub fn do_run(&mut self) -> Result<(), Error> {
        let result = self.do_run_with(|i, step, run| {
            debug!("hf: {{iter: {}, hf_energy: {}, energy_change: {}}}",
                   i, step.hf_energy, step.energy_change);
            debug!("hf_energies: {:?}", run.energies);
        });
        match result {
            Ok(()) => info!("hf_converged: {} iterations", self.num_iter),
            Err(Error::NotConverged(n)) => {
                warn!("hf_converged: false after {} iterations", n)
            }
            Err(ref e) => error!("hf failed: {}", e),
        }
        result
    }

    /// Normal-ordered Hamiltonian in the current basis.
    pub fn normord(&self) -> Result<(f64, Op1, Op2), op::Error> {
        normord(&self.h1, &self.h2)
    }

    /// Reference energy in the current basis.
    pub fn energy(&self) -> f64 {
        hf_energy(&self.h1, &self.h2)
    }
}
