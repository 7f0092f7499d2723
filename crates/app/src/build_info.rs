use std::fmt;

/// Facts about this binary captured by the build script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub package_version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub target: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        package_version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("DROPKEY_REPO_VERSION"),
        build_profile: env!("DROPKEY_BUILD_PROFILE"),
        build_timestamp: env!("DROPKEY_BUILD_TIMESTAMP"),
        rust_version: env!("DROPKEY_RUST_VERSION"),
        target: env!("DROPKEY_BUILD_TARGET"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "dropkey {} ({})",
            self.package_version, self.repo_version
        )?;
        writeln!(f, "profile: {}", self.build_profile)?;
        writeln!(f, "built:   {}", self.build_timestamp)?;
        writeln!(f, "target:  {}", self.target)?;
        write!(f, "rustc:   {}", self.rust_version)
    }
}
