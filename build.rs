//! Build script to copy the config.ini template next to the executable.
//! The binary embeds the same file, this copy is for reference when editing.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=config.ini");

    let out_dir = env::var("OUT_DIR").unwrap_or_default();

    // OUT_DIR is target/{profile}/build/<pkg>/out, the profile dir is three levels up.
    let out_path = Path::new(&out_dir);
    let Some(target_profile_dir) = out_path.ancestors().nth(3) else {
        return;
    };

    let config_src = Path::new("config.ini");
    if !config_src.exists() {
        return;
    }

    let config_dst = target_profile_dir.join("config.ini");
    if let Err(e) = fs::copy(config_src, &config_dst) {
        println!("cargo:warning=failed to copy config.ini to {}: {}", config_dst.display(), e);
    }
}
