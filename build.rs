//! Embeds a build counter and the compile time into the binary.
//!
//! The counter lives in `build_number.txt` at the crate root and goes up by
//! one whenever anything under `src/` changes.

use std::fs;
use std::io;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn read_counter(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new(COUNTER_FILE);
    let build_number = read_counter(counter) + 1;
    fs::write(counter, build_number.to_string())?;

    let compiled_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    println!("cargo:rustc-env=FITTRACK_BUILD_NUMBER={build_number}");
    println!("cargo:rustc-env=FITTRACK_BUILD_TIMESTAMP={compiled_at}");
    Ok(())
}
