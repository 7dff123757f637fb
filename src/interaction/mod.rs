pub mod palette_cycle;
pub mod pointer;
pub mod session;
