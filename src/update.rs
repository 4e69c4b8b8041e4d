//! The begin/submit update transaction.
//!
//! Every compositor mutation happens between `vc_dispmanx_update_start` and
//! `vc_dispmanx_update_submit_sync`; the compositor applies everything in
//! between atomically. The guard here enforces the pairing: after a
//! successful start, exactly one submit runs — on the success path, on the
//! mutation-failure path inside [`Update::scope`], and as a last resort in
//! `Drop` if a guard is abandoned. A failed start opens nothing and nothing
//! is submitted.

use crate::driver::DispmanxDriver;
use crate::error::{DispmanxError, Result};
use crate::handle::UpdateHandle;
use log::{trace, warn};

/// Priority passed to `vc_dispmanx_update_start`; the binding always uses 0.
const UPDATE_PRIORITY: i32 = 0;

/// An open update transaction.
#[derive(Debug)]
pub struct Update<'d, D: DispmanxDriver> {
    driver: &'d D,
    handle: UpdateHandle,
    submitted: bool,
}

impl<'d, D: DispmanxDriver> Update<'d, D> {
    /// Starts a transaction. A zero handle from the native call is an
    /// irrecoverable runtime error; no transaction is open in that case.
    pub fn start(driver: &'d D) -> Result<Self> {
        let handle = UpdateHandle::from_raw(driver.update_start(UPDATE_PRIORITY))
            .ok_or(DispmanxError::UpdateStart)?;
        trace!("Started update transaction {}", handle.get());
        Ok(Self {
            driver,
            handle,
            submitted: false,
        })
    }

    /// The raw handle to pass to mutation calls made inside the transaction.
    pub fn handle(&self) -> u32 {
        self.handle.get()
    }

    /// Submits synchronously, blocking until the compositor has applied the
    /// batched mutations.
    pub fn submit_sync(mut self) -> Result<()> {
        self.submitted = true;
        if self.driver.update_submit_sync(self.handle.get()) != 0 {
            return Err(DispmanxError::UpdateSubmit);
        }
        trace!("Submitted update transaction {}", self.handle.get());
        Ok(())
    }

    /// Runs `mutate` inside a transaction and always submits afterwards,
    /// even when `mutate` fails — the transaction is closed, not abandoned.
    /// A mutation error takes precedence over a submit error.
    pub fn scope<T>(driver: &'d D, mutate: impl FnOnce(&Update<'d, D>) -> Result<T>) -> Result<T> {
        let update = Update::start(driver)?;
        let outcome = mutate(&update);
        let submitted = update.submit_sync();
        match outcome {
            Ok(value) => submitted.map(|()| value),
            Err(err) => {
                if let Err(submit_err) = submitted {
                    warn!(
                        "Submit after failed mutation also failed: {} (mutation error: {})",
                        submit_err, err
                    );
                }
                Err(err)
            }
        }
    }
}

impl<D: DispmanxDriver> Drop for Update<'_, D> {
    fn drop(&mut self) {
        if !self.submitted {
            // Abandoned guard: close the transaction so no handle leaks.
            if self.driver.update_submit_sync(self.handle.get()) != 0 {
                warn!(
                    "Submit of abandoned update transaction {} failed",
                    self.handle.get()
                );
            }
        }
    }
}
