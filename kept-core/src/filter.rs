use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Include/exclude globs matched against slash-separated relative paths.
/// No include patterns means everything is included.
#[derive(Clone, Debug, Default)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    pub fn new(includes: &[String], excludes: &[String]) -> Result<Self> {
        Ok(Self { include: build_set(includes)?, exclude: build_set(excludes)? })
    }

    pub fn allows(&self, rel: &str) -> bool {
        let included = self.include.as_ref().map_or(true, |set| set.is_match(rel));
        let excluded = self.exclude.as_ref().is_some_and(|set| set.is_match(rel));
        included && !excluded
    }
}

fn build_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for g in patterns {
        b.add(Glob::new(g)?);
    }
    Ok(Some(b.build()?))
}
