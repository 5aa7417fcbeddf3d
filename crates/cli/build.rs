use std::env;
use std::process::Command;

/// Short commit hash shown by `nftcheck --version`. Release tarballs carry
/// no `.git`, so packagers can pin it with `NFTCHECK_GIT_HASH`.
fn git_hash() -> String {
    if let Ok(pinned) = env::var("NFTCHECK_GIT_HASH") {
        let pinned = pinned.trim();
        if !pinned.is_empty() {
            return pinned.to_string();
        }
    }

    let Ok(output) = Command::new("git").args(["rev-parse", "--short=7", "HEAD"]).output() else {
        return "unknown".into();
    };
    if !output.status.success() {
        return "unknown".into();
    }
    match String::from_utf8(output.stdout) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_string(),
        _ => "unknown".into(),
    }
}

fn main() {
    println!("cargo:rerun-if-env-changed=NFTCHECK_GIT_HASH");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");

    println!("cargo:rustc-env=NFTCHECK_GIT_HASH={}", git_hash());
    println!(
        "cargo:rustc-env=NFTCHECK_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".into())
    );
}
