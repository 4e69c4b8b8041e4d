// src/bin/noise.rs
//! Static-noise demo: lists the attached displays, then fills the default
//! one with random pixels as fast as the compositor will take them.
//!
//! Flags: `--list` prints the display catalog and exits; `--json` prints it
//! as JSON.

use anyhow::Result;

fn main() -> Result<()> {
    // Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}

#[cfg(have_bcm_host)]
fn run() -> Result<()> {
    use anyhow::Context;
    use dispmanx::{DispmanX, Options};
    use log::info;
    use std::time::Instant;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let list_only = args.iter().any(|a| a == "--list");
    let as_json = args.iter().any(|a| a == "--json");

    let displays = dispmanx::list_displays().context("Failed to list displays")?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&displays)?);
    } else {
        println!("Found displays:");
        for display in &displays {
            println!(" * {}", display);
        }
    }
    if list_only {
        return Ok(());
    }

    let mut session =
        DispmanX::with_options(Options::default()).context("Failed to open display session")?;
    info!(
        "Using display {} with {} format",
        session.display()?,
        session.pixel_format()?
    );
    info!("Running, ^C to quit");

    let mut rng = Xorshift::from_clock();
    let mut frames = 0u32;
    let mut window = Instant::now();
    loop {
        rng.fill(session.buffer_mut()?.as_bytes_mut());
        session.update()?;

        frames += 1;
        if window.elapsed().as_secs() >= 5 {
            info!(
                "{:.1} FPS",
                f64::from(frames) / window.elapsed().as_secs_f64()
            );
            frames = 0;
            window = Instant::now();
        }
    }
}

#[cfg(not(have_bcm_host))]
fn run() -> Result<()> {
    anyhow::bail!(
        "built without the VideoCore driver; run on a Raspberry Pi with \
         the userland libraries (libraspberrypi-bin) installed"
    )
}

/// Plain xorshift32; plenty for simulated static.
#[cfg(have_bcm_host)]
struct Xorshift(u32);

#[cfg(have_bcm_host)]
impl Xorshift {
    fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        // The state must never be zero.
        Self(nanos | 1)
    }

    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }

    fn fill(&mut self, bytes: &mut [u8]) {
        for chunk in bytes.chunks_mut(4) {
            let word = self.next().to_ne_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}
