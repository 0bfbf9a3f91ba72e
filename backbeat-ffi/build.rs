// Generates `backbeat.h` with `cbindgen` when it is installed. Otherwise the
// checked-in `include/backbeat.h` is copied to $OUT_DIR, and if that is missing
// too a placeholder is written so downstream build scripts still find a file.

use std::{env, fs, path::PathBuf, process::Command};

const HEADER: &str = "backbeat.h";

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/{HEADER}");

    let (Some(crate_dir), Some(out_dir)) = (env::var_os("CARGO_MANIFEST_DIR"), env::var_os("OUT_DIR")) else {
        println!("cargo:warning=backbeat-ffi: cargo did not set the manifest or out dir; skipping header");
        return;
    };
    let crate_dir = PathBuf::from(crate_dir);
    let header_repo = crate_dir.join("include").join(HEADER);
    let header_out = PathBuf::from(out_dir).join(HEADER);

    let generated = Command::new("cbindgen")
        .args(["--crate", "backbeat-ffi", "--lang", "C", "--output"])
        .arg(&header_out)
        .current_dir(&crate_dir)
        .status()
        .map(|s| s.success())
        .unwrap_or(false);

    if generated {
        if let Some(parent) = header_repo.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::copy(&header_out, &header_repo);
        return;
    }
    println!("cargo:warning=backbeat-ffi: cbindgen unavailable; using checked-in header");

    let copied = header_repo.exists() && fs::copy(&header_repo, &header_out).is_ok();
    if !copied {
        let placeholder = "/* backbeat.h placeholder: install cbindgen or check in include/backbeat.h */\n";
        if let Err(e) = fs::write(&header_out, placeholder) {
            println!("cargo:warning=backbeat-ffi: could not write {}: {e}", header_out.display());
        }
    }
}
