// SPDX-License-Identifier: Apache-2.0

fn main() {
    use std::path::Path;

    // Register the custom cfg flag for `has_rawrabbit`.
    println!("cargo:rustc-check-cfg=cfg(has_rawrabbit)");

    // If the device driver is loaded, set the cfg flag
    if cfg!(feature = "hw_tests") || Path::new("/dev/rawrabbit").exists() {
        println!("cargo:rustc-cfg=has_rawrabbit");
    }
}
