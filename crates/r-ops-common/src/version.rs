//! ---
//! ops_section: "01-core-functionality"
//! ops_subsection: "module"
//! ops_type: "source"
//! ops_scope: "code"
//! ops_description: "Shared primitives and utilities for the console runtime."
//! ops_version: "v0.0.0-prealpha"
//! ops_owner: "tbd"
//! ---

/// Build metadata surfaced by `-V` on the console binaries.
#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub semver: &'static str,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            semver: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Short form for clap-style version strings.
    pub fn cli_string(&self) -> String {
        format!("v{}", self.semver)
    }

    /// Extended form printed by the explicit `--version` flag.
    pub fn extended(&self) -> String {
        format!("R-OPS v{} (reactor fleet operations console)", self.semver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_includes_semver() {
        let info = VersionInfo::current();
        assert!(info.extended().contains(info.semver));
    }
}
