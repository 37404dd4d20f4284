//! Sandboxed path resolution.
//!
//! Every path a client names goes through [`resolve`] before it reaches the
//! filesystem. Resolution is pure string work: no I/O, no symlink lookup, and
//! no failure mode. Whatever the input, the result is `root` or a descendant
//! of it.

/// Maps `(root, current_dir, param)` to an absolute path inside `root`.
///
/// * An absent or empty `param` resolves to `current_dir`.
/// * A `param` starting with `/` is taken relative to `root`, anything else
///   relative to `current_dir`.
/// * Empty and `.` segments are dropped, `..` pops the previous segment but
///   never climbs above `root`.
///
/// A `current_dir` outside `root` is treated as `root`.
pub fn resolve(root: &str, current_dir: &str, param: Option<&str>) -> String {
    let root = normalize_root(root);
    let param = param.unwrap_or("");

    let base = if param.starts_with('/') {
        ""
    } else {
        relative_to_root(&root, current_dir).unwrap_or("")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(param.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    join_under_root(&root, &segments)
}

/// Path shown to the client: `absolute` with the root stripped, always
/// starting with `/`.
pub fn virtual_path(root: &str, absolute: &str) -> String {
    let root = normalize_root(root);
    match relative_to_root(&root, absolute) {
        Some("") | None => "/".to_string(),
        Some(rest) => format!("/{}", rest),
    }
}

/// Canonical form of the root itself: leading `/`, no trailing `/`, no
/// `.`/`..`/empty segments. `/` stays `/`.
fn normalize_root(root: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in root.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    join_under_root("/", &segments)
}

/// The part of `path` below `root`, without a leading `/`, or `None` when
/// `path` is not inside `root`.
fn relative_to_root<'a>(root: &str, path: &'a str) -> Option<&'a str> {
    if root == "/" {
        return path.strip_prefix('/');
    }
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}

fn join_under_root(root: &str, segments: &[&str]) -> String {
    let mut path = if root == "/" {
        String::new()
    } else {
        root.to_string()
    };
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}
