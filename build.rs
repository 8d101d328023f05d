//! Retrieves information about the version of the engine from Git and the build
//! environment. The version is embedded by `shadow-rs`, the build flavor is
//! written to a file in the output directory and included by the library.

use std::path::Path;
use std::{env, fs};

fn generate_file(filename: &str, contents: &str) {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join(filename);
    fs::write(dest_path, contents).unwrap();
}

fn generate_build_info() {
    let profile = env::var("PROFILE").unwrap_or_else(|_| String::from("unknown"));
    let flavor = format!(
        "{profile} ({}debug-assertions)",
        if env::var_os("CARGO_CFG_DEBUG_ASSERTIONS").is_some() {
            "+"
        } else {
            "-"
        }
    );
    generate_file("flavor", &flavor);
}

fn main() -> shadow_rs::SdResult<()> {
    generate_build_info();
    shadow_rs::new()
}
