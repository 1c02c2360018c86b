mod profile;
mod salon;

pub use profile::*;
pub use salon::*;
