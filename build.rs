use std::path::Path;

/// Resolves a ref name through loose refs and then `packed-refs`.
fn resolve_ref(git_dir: &Path, name: &str) -> Option<String> {
    let loose = git_dir.join(name);
    if let Ok(hash) = std::fs::read_to_string(&loose) {
        println!("cargo::rerun-if-changed={}", loose.display());
        return Some(hash.trim().to_string());
    }

    let packed = git_dir.join("packed-refs");
    println!("cargo::rerun-if-changed={}", packed.display());
    std::fs::read_to_string(packed).ok()?.lines().find_map(|line| {
        let (hash, refname) = line.split_once(' ')?;
        (refname.trim() == name).then(|| hash.to_string())
    })
}

fn git_short_hash() -> Option<String> {
    let git_dir = Path::new(".git");
    let head = std::fs::read_to_string(git_dir.join("HEAD")).ok()?;
    println!("cargo::rerun-if-changed=.git/HEAD");

    let hash = match head.trim().strip_prefix("ref: ") {
        Some(name) => resolve_ref(git_dir, name)?,
        None => head.trim().to_string(),
    };

    (hash.len() == 40).then(|| hash[..7].to_string())
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    let hash = git_short_hash().unwrap_or_else(|| "unknown".into());
    println!("cargo::rustc-env=GIT_SHORT_HASH={hash}");
}
