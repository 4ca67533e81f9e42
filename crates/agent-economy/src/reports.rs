//! Importance ranking for economic releases

use crate::api::fred::{Release, SourceReleases};
use serde::Serialize;
use std::cmp::Reverse;

/// Keywords that mark a release as important
pub const DEFAULT_KEYWORDS: [&str; 10] = [
    "inflation",
    "gdp",
    "unemployment",
    "interest rate",
    "federal reserve",
    "monetary policy",
    "recession",
    "economic outlook",
    "fomc",
    "cpi",
];

const KEYWORD_POINTS: u32 = 5;
const PRESS_RELEASE_POINTS: u32 = 3;

/// A release tagged with the source it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedRelease {
    pub source: String,
    #[serde(flatten)]
    pub release: Release,
}

/// Flatten per-source release lists, keeping source order
pub fn flatten_releases(groups: &[SourceReleases]) -> Vec<SourcedRelease> {
    groups
        .iter()
        .flat_map(|group| {
            group.releases.iter().map(|release| SourcedRelease {
                source: group.source.clone(),
                release: release.clone(),
            })
        })
        .collect()
}

/// Five points per keyword found in the name, three for a press release
pub fn score(release: &Release, keywords: &[&str]) -> u32 {
    let name = release.name.to_lowercase();
    let keyword_points: u32 = keywords
        .iter()
        .filter(|keyword| name.contains(&keyword.to_lowercase()))
        .map(|_| KEYWORD_POINTS)
        .sum();

    keyword_points + if release.press_release { PRESS_RELEASE_POINTS } else { 0 }
}

/// Highest score first; equal scores keep their input order
pub fn rank_reports(mut reports: Vec<SourcedRelease>, keywords: &[&str]) -> Vec<SourcedRelease> {
    reports.sort_by_key(|r| Reverse(score(&r.release, keywords)));
    reports
}
