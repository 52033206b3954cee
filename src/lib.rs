extern crate cblas;
extern crate conv;
extern crate lapacke;
#[macro_use]
extern crate log;
extern crate netlib_src;
extern crate num;
#[macro_use]
extern crate quick_error;
extern crate rand;
extern crate rand_distr;
#[cfg(test)]
extern crate rand_xorshift;
extern crate serde;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;

pub mod basis;
pub mod hf;
pub mod linalg;
pub mod mat;
pub mod mbpt;
pub mod op;
pub mod pairing;
pub mod utils;
