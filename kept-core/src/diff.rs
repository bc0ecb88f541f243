use crate::scan::FileSet;
use std::path::PathBuf;

/// `current - known`, by exact `Path` equality.
///
/// Equality is component-wise and case-sensitive on every platform.
pub fn new_files<'a, I>(current: I, known: &FileSet) -> FileSet
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    current.into_iter().filter(|p| !known.contains(*p)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_known_keeps_rest() {
        let current: FileSet = ["/s/a", "/s/b", "/s/c"].iter().map(PathBuf::from).collect();
        let known: FileSet = ["/s/b", "/s/zzz"].iter().map(PathBuf::from).collect();
        let out = new_files(&current, &known);
        let want: FileSet = ["/s/a", "/s/c"].iter().map(PathBuf::from).collect();
        assert_eq!(out, want);
    }

    #[test]
    fn redundant_separators_compare_equal() {
        let current: FileSet = [PathBuf::from("/s//a/b")].into_iter().collect();
        let known: FileSet = [PathBuf::from("/s/a/b")].into_iter().collect();
        assert!(new_files(&current, &known).is_empty());
    }
}
