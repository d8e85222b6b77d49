//! Captures build identifiers reported by the version info endpoint.

use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> Option<String> {
	let output = Command::new(program).args(args).output().ok()?;
	if !output.status.success() {
		return None;
	}
	let text = String::from_utf8(output.stdout).ok()?;
	let text = text.trim();
	(!text.is_empty()).then(|| text.to_string())
}

fn main() {
	let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
	let rustc_version = command_output(&rustc, &["--version"]).unwrap_or_default();
	println!("cargo:rustc-env=RPC_RUSTC_VERSION={}", rustc_version);

	// Explicit values win so release pipelines can stamp builds outside a git checkout.
	for (var, args) in [
		("RPC_COMMIT_HASH", &["rev-parse", "HEAD"][..]),
		("RPC_BRANCH", &["rev-parse", "--abbrev-ref", "HEAD"][..]),
	] {
		println!("cargo:rerun-if-env-changed={}", var);
		let value = std::env::var(var)
			.ok()
			.or_else(|| command_output("git", args))
			.unwrap_or_default();
		println!("cargo:rustc-env={}={}", var, value);
	}

	println!("cargo:rerun-if-env-changed=RPC_BUILD_TIMESTAMP");
	let timestamp = std::env::var("RPC_BUILD_TIMESTAMP")
		.ok()
		.or_else(|| command_output("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]))
		.unwrap_or_default();
	println!("cargo:rustc-env=RPC_BUILD_TIMESTAMP={}", timestamp);
}
