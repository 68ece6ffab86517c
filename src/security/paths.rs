//! File path admission.
//!
//! Decides whether a file path may appear in a captured record at all.
//! Rejection is silent by design: logging an excluded path would itself leak
//! which files were excluded.

/// Extensions that typically hold key material or certificates.
const KEY_MATERIAL_EXTENSIONS: &[&str] = &["pem", "key", "crt", "cer", "der", "p12", "pfx"];

/// Substrings that mark a path segment as sensitive.
const SENSITIVE_SEGMENT_WORDS: &[&str] = &["secret", "password", "credential", "token", "private"];

/// Version-control metadata directories.
const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg"];

/// Returns true iff `path` may be captured.
///
/// The path is normalized (backslashes folded to forward slashes) and
/// rejected when it is a dotenv file or variant, sits under a
/// version-control metadata directory, carries a certificate/key extension,
/// or has any segment containing a sensitive word (case-insensitive).
#[must_use]
pub fn admits_path(path: &str) -> bool {
    let normalized = path.replace('\\', "/").to_lowercase();
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    let Some(file_name) = segments.last() else {
        return false;
    };

    // Dotenv file or any dotenv variant (.env, .env.local, .env.staging.local)
    if *file_name == ".env" || file_name.starts_with(".env.") {
        return false;
    }

    if segments.iter().any(|s| VCS_DIRS.contains(s)) {
        return false;
    }

    if let Some((_, ext)) = file_name.rsplit_once('.') {
        if KEY_MATERIAL_EXTENSIONS.contains(&ext) {
            return false;
        }
    }

    if segments
        .iter()
        .any(|s| SENSITIVE_SEGMENT_WORDS.iter().any(|w| s.contains(w)))
    {
        return false;
    }

    true
}
