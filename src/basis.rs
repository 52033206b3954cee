//! Single-particle basis of the pairing model.
//!
//! Each state is labeled by a level `n` and a spin projection `s = ±1`.  The
//! enumeration order is
//!
//! ```text
//! (n = 0, s = −1), (n = 0, s = +1), (n = 1, s = −1), …
//! ```
//!
//! and the position in this list is the state index.  The lowest
//! `num_filled` levels are occupied in the reference state.
//!
//! Naming convention, used throughout the crate:
//!
//!   - `i`, `j`, `k`, `l` = occupied ("hole") states
//!   - `a`, `b`, `c`, `d` = unoccupied ("particle") states
//!   - `p`, `q`, `r`, `s` = arbitrary states
//!
use std::fmt;
use super::utils::cast;

quick_error! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        TooManyFilled(num_filled: usize, num_levels: usize) {
            display("cannot fill {} levels out of {}", num_filled, num_levels)
        }
    }
}

/// Occupancy of a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Occ {
    /// Occupied ("hole") state
    I,
    /// Unoccupied ("particle") state
    A,
}

impl Occ {
    /// `1` if occupied, `0` otherwise.
    pub fn bit(self) -> u8 {
        match self {
            Occ::I => 1,
            Occ::A => 0,
        }
    }
}

pub mod occ {
    //! Convenient aliases for occupancies.
    pub use super::Occ::I;
    pub use super::Occ::A;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct State {
    pub index: usize,
    /// Level
    pub n: i32,
    /// Spin projection (`−1` or `+1`)
    pub spin: i32,
    pub occ: Occ,
}

/// Equality is structural: two bases are equal if and only if they
/// enumerate the same states in the same order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Basis {
    states: Vec<State>,
    holes: Vec<usize>,
    particles: Vec<usize>,
}

impl Basis {
    pub fn new(num_levels: usize, num_filled: usize) -> Result<Self, Error> {
        if num_filled > num_levels {
            return Err(Error::TooManyFilled(num_filled, num_levels));
        }
        let mut states = Vec::with_capacity(2 * num_levels);
        for n in 0 .. num_levels {
            for &spin in &[-1, 1] {
                states.push(State {
                    index: states.len(),
                    n: cast(n),
                    spin,
                    occ: if n < num_filled { occ::I } else { occ::A },
                });
            }
        }
        let holes = states.iter()
            .filter(|x| x.occ == occ::I)
            .map(|x| x.index)
            .collect();
        let particles = states.iter()
            .filter(|x| x.occ == occ::A)
            .map(|x| x.index)
            .collect();
        Ok(Self { states, holes, particles })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, p: usize) -> Option<&State> {
        self.states.get(p)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn occ(&self, p: usize) -> Occ {
        self.states[p].occ
    }

    /// Indices of the states with the given occupancy, in ascending order.
    pub fn states_in(&self, x: Occ) -> &[usize] {
        match x {
            Occ::I => &self.holes,
            Occ::A => &self.particles,
        }
    }

    pub fn indices(&self) -> Vec<usize> {
        self.states.iter().map(|x| x.index).collect()
    }

    pub fn ns(&self) -> Vec<i32> {
        self.states.iter().map(|x| x.n).collect()
    }

    pub fn spins(&self) -> Vec<i32> {
        self.states.iter().map(|x| x.spin).collect()
    }

    pub fn occs(&self) -> Vec<u8> {
        self.states.iter().map(|x| x.occ.bit()).collect()
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "#{:>4} {:>4} {:>4} {:>4}", "idx", "n", "s", "occ")?;
        for x in &self.states {
            writeln!(f, "{:>5} {:>4} {:>4} {:>4}",
                     x.index, x.n, x.spin, x.occ.bit())?;
        }
        Ok(())
    }
}
