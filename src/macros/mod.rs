//! Helper macros shared by the modules and tests of this crate.

#[macro_use]
pub mod cplx;
#[macro_use]
pub mod assert_approx_eq;
pub mod util;
