/// Identifies the binary and its version metadata.
///
/// Filled in from `CARGO_PKG_*` by `main` so the `version` command can
/// print build information without touching the rest of the stack.
#[derive(Clone, Copy, Debug)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

impl AppInfo {
    #[must_use]
    pub const fn new(name: &'static str, version: &'static str, description: &'static str) -> Self {
        Self {
            name,
            version,
            description,
        }
    }
}
