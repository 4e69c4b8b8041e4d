// src/drivers/mod.rs
// Concrete DispmanxDriver implementations.

pub mod mock;
#[cfg(have_bcm_host)]
pub mod vc;

pub use mock::MockDriver;
#[cfg(have_bcm_host)]
pub use vc::VideoCoreDriver;
