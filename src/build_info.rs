//! Version and build metadata
//!
//! `build.rs` supplies the build counter and compile time through
//! `FITTRACK_BUILD_NUMBER` / `FITTRACK_BUILD_TIMESTAMP`.

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("FITTRACK_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("FITTRACK_BUILD_TIMESTAMP");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// 0 when built without the build script
    pub build_number: u64,
    pub build_timestamp: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: VERSION,
            build_number: parse_build_number(RAW_BUILD_NUMBER),
            build_timestamp: RAW_BUILD_TIMESTAMP.unwrap_or("unknown"),
        }
    }

    /// One-line identifier, e.g. `fittrack 1.0.0 (build 12)`
    pub fn label(&self) -> String {
        format!("{} {} (build {})", self.name, self.version, self.build_number)
    }
}

fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Startup banner; stdout belongs to the MCP transport, so this goes to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    let rule = "=".repeat(47);
    eprintln!("{rule}");
    eprintln!("  FitTrack | {}", info.label());
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!("{rule}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_number() {
        assert_eq!(parse_build_number(Some("42")), 42);
        assert_eq!(parse_build_number(Some(" 7\n")), 7);
        assert_eq!(parse_build_number(Some("12a")), 0);
        assert_eq!(parse_build_number(None), 0);
    }

    #[test]
    fn test_label_names_the_package() {
        let info = BuildInfo::current();
        assert!(info.label().starts_with("fittrack "));
        assert_eq!(info.version, VERSION);
    }
}
