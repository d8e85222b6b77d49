//! Build identifiers stamped into the binary at compile time.

/// Crate version of the service.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Git commit the binary was built from, empty when unknown.
pub const COMMIT_HASH: &str = env!("RPC_COMMIT_HASH");
/// Git branch the binary was built from, empty when unknown.
pub const BRANCH: &str = env!("RPC_BRANCH");
/// UTC build time in RFC 3339 format, empty when unknown.
pub const BUILD_TIMESTAMP: &str = env!("RPC_BUILD_TIMESTAMP");
/// Version string of the compiler used for the build.
pub const RUSTC_VERSION: &str = env!("RPC_RUSTC_VERSION");

/// Static build identifiers, passed to components that report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
	pub version: String,
	pub commit_hash: String,
	pub branch: String,
	pub build_timestamp: String,
	pub rustc_version: String,
}

impl BuildInfo {
	/// Identifiers of the running binary.
	pub fn current() -> Self {
		Self {
			version: VERSION.to_string(),
			commit_hash: COMMIT_HASH.to_string(),
			branch: BRANCH.to_string(),
			build_timestamp: BUILD_TIMESTAMP.to_string(),
			rustc_version: RUSTC_VERSION.to_string(),
		}
	}
}
