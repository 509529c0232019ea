use std::ffi::OsStr;
use std::fs::FileType;
use crate::config::WatchConfig;

/// Decides which walked entries are watched.
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Sorted, lower-cased
    file_types: Vec<String>,
    include_no_extension: bool,
    exclude_dot_dirs: bool,
}

impl PathFilter {
    pub fn new(file_types: &[String], include_no_extension: bool, exclude_dot_dirs: bool) -> Self {
        let mut file_types: Vec<String> = file_types.iter().map(|t| t.to_lowercase()).collect();
        file_types.sort();
        Self {
            file_types,
            include_no_extension,
            exclude_dot_dirs,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(&config.file_types, config.include_no_extension, config.exclude_dot_dirs)
    }

    /// Whether a directory should be entered. A rejected directory skips its whole subtree.
    pub fn should_enter<S: AsRef<OsStr>>(&self, name: S) -> bool {
        let name = name.as_ref().to_string_lossy();
        !(self.exclude_dot_dirs && name.starts_with('.'))
    }

    /// Whether a file entry should be watched.
    pub fn should_watch<S: AsRef<OsStr>>(&self, name: S, file_type: FileType) -> bool {
        if !file_type.is_file() {
            return false;
        }
        self.matches_name(name)
    }

    /// Extension check alone, for callers that have already verified the entry is a regular file.
    pub fn matches_name<S: AsRef<OsStr>>(&self, name: S) -> bool {
        match extension_of(name) {
            None => self.include_no_extension,
            Some(ext) => self.allows(&ext),
        }
    }

    /// Binary search in the sorted allow-list, exact match only.
    pub fn allows(&self, ext: &str) -> bool {
        self.file_types
            .binary_search_by(|t| t.as_str().cmp(ext))
            .is_ok()
    }
}

/// Lower-cased text after the last `.` of a file name, `None` when empty.
///
/// Unlike `Path::extension`, a leading dot counts: `.bashrc` has extension `bashrc`.
pub fn extension_of<S: AsRef<OsStr>>(name: S) -> Option<String> {
    let name = name.as_ref().to_string_lossy();
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filter(types: &[&str], none: bool, no_dot: bool) -> PathFilter {
        let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        PathFilter::new(&types, none, no_dot)
    }

    #[test]
    fn test_allow_list_lookup() {
        let f = filter(&["css", "go", "html"], false, true);

        assert!(f.matches_name("main.go"));
        assert!(f.matches_name("site.css"));
        assert!(!f.matches_name("app.rb"));
        // sorts before and after every entry
        assert!(!f.matches_name("a.aaa"));
        assert!(!f.matches_name("a.zzz"));
        assert!(!f.matches_name("a.htm"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let f = filter(&["Go"], false, true);
        assert!(f.matches_name("MAIN.GO"));
        assert!(f.matches_name("main.go"));
    }

    #[test]
    fn test_no_extension_mode() {
        let without = filter(&["go"], false, true);
        let with = filter(&["go"], true, true);

        assert!(!without.matches_name("Makefile"));
        assert!(with.matches_name("Makefile"));
        assert!(with.matches_name("trailing."));
        assert!(with.matches_name("main.go"));
        assert!(!with.matches_name("main.rb"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("main.go").as_deref(), Some("go"));
        assert_eq!(extension_of("archive.tar.GZ").as_deref(), Some("gz"));
        assert_eq!(extension_of(".bashrc").as_deref(), Some("bashrc"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of("dot."), None);
    }

    #[test]
    fn test_dot_dir_exclusion() {
        let excluding = filter(&["go"], false, true);
        let entering = filter(&["go"], false, false);

        assert!(!excluding.should_enter(".git"));
        assert!(excluding.should_enter("src"));
        assert!(entering.should_enter(".git"));
    }

    #[test]
    fn test_rejects_non_regular_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("pkg.go");
        std::fs::create_dir(&dir).unwrap();
        let file = temp_dir.path().join("main.go");
        std::fs::write(&file, "package main").unwrap();

        let f = filter(&["go"], false, true);
        let dir_type = std::fs::symlink_metadata(&dir).unwrap().file_type();
        let file_type = std::fs::symlink_metadata(&file).unwrap().file_type();

        assert!(!f.should_watch("pkg.go", dir_type));
        assert!(f.should_watch("main.go", file_type));
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.go");
        let link = temp_dir.path().join("link.go");
        std::fs::write(&file, "package main").unwrap();
        std::os::unix::fs::symlink(&file, &link).unwrap();

        let f = filter(&["go"], false, true);
        let link_type = std::fs::symlink_metadata(&link).unwrap().file_type();
        assert!(!f.should_watch("link.go", link_type));
    }
}
