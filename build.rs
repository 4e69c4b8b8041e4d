// build.rs

use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Declare the custom cfg name to avoid warnings on newer toolchains.
    println!("cargo::rustc-check-cfg=cfg(have_bcm_host)");

    // --- Link against the VideoCore host library ---
    // We try pkg-config first; Raspberry Pi OS ships bcm_host.pc with the
    // userland packages. If that fails, fall back to the stock /opt/vc
    // install location. When the library is missing entirely (building on a
    // non-Pi host), the real driver is compiled out and the crate builds
    // against the mock driver only.
    if pkg_config::probe_library("bcm_host").is_ok() {
        println!("cargo:rustc-cfg=have_bcm_host");
        return;
    }

    let fallback = Path::new("/opt/vc/lib");
    if fallback.join("libbcm_host.so").exists() {
        eprintln!("pkg-config failed for 'bcm_host'. Falling back to /opt/vc/lib.");
        println!("cargo:rustc-link-search=native=/opt/vc/lib");
        println!("cargo:rustc-link-lib=bcm_host");
        println!("cargo:rustc-cfg=have_bcm_host");
        return;
    }

    eprintln!(
        "bcm_host library not found; building without the VideoCore driver. \
         Install the Raspberry Pi userland libraries (libraspberrypi-dev) to enable it."
    );
}
