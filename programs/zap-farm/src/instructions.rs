#![allow(ambiguous_glob_reexports)]

pub mod initialize_farm;
pub mod deposit;
pub mod harvest;
pub mod withdraw;
pub mod reward_math;
pub mod zap;

pub use initialize_farm::*;
pub use deposit::*;
pub use harvest::*;
pub use withdraw::*;
pub use zap::ZapParams;
