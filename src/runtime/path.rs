//! Path utility functions for normalization and validation.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` if there is nothing to pop (e.g. at root)
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Check that a `/`-separated name is made only of plain segments.
///
/// Rejects empty names, empty segments, `.`/`..`, backslashes and anything
/// that would be treated as absolute, so `base.join(name)` stays under `base`.
pub fn is_plain_relative(name: &str) -> bool {
    if name.is_empty() || name.contains('\\') {
        return false;
    }

    name.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && matches!(
                Path::new(segment).components().next(),
                Some(Component::Normal(_))
            )
            && Path::new(segment).components().count() == 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_simple() {
        assert_eq!(
            normalize_path(Path::new("/usr/local/bin")),
            PathBuf::from("/usr/local/bin")
        );
    }

    #[test]
    fn test_normalize_path_dots() {
        assert_eq!(
            normalize_path(Path::new("/work/app/./vendor/../vendor/acme")),
            PathBuf::from("/work/app/vendor/acme")
        );
    }

    #[test]
    fn test_normalize_path_parent_at_start() {
        assert_eq!(
            normalize_path(Path::new("../src/widget")),
            PathBuf::from("../src/widget")
        );
    }

    #[test]
    fn test_plain_relative_accepts_package_names() {
        assert!(is_plain_relative("acme/widget"));
        assert!(is_plain_relative("laravel/framework"));
        assert!(is_plain_relative("single"));
        assert!(is_plain_relative("vendor-name/package.name"));
    }

    #[test]
    fn test_plain_relative_rejects_escapes() {
        assert!(!is_plain_relative(""));
        assert!(!is_plain_relative("/etc/passwd"));
        assert!(!is_plain_relative("../outside"));
        assert!(!is_plain_relative("acme/../../outside"));
        assert!(!is_plain_relative("acme/./widget"));
        assert!(!is_plain_relative("acme//widget"));
        assert!(!is_plain_relative("acme/widget/"));
        assert!(!is_plain_relative("acme\\widget"));
    }
}
