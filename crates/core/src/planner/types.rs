//! Types for the planner module.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::config::EncodingConfig;
use crate::converter::ConversionSpec;
use crate::formats::{MediaKind, StreamInfo};
use crate::rewriter::fold_case;

/// One pending conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: MediaKind,
    pub streams: StreamInfo,
}

impl PlanEntry {
    /// Whether the container already matches and only the codec changes.
    pub fn is_in_place(&self) -> bool {
        self.source == self.target
    }

    /// Converter job description for this entry.
    pub fn conversion_spec(&self, encoding: &EncodingConfig) -> ConversionSpec {
        match self.kind {
            MediaKind::Audio => ConversionSpec::Audio {
                quality: encoding.audio_quality,
            },
            MediaKind::Video => ConversionSpec::Video {
                video_quality: encoding.video_quality,
                audio_quality: encoding.audio_quality,
                with_audio: self.streams.has_audio,
            },
            MediaKind::Image | MediaKind::Unclassified => ConversionSpec::Image,
        }
    }
}

/// A target claimed by more than one distinct source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub target: PathBuf,
    pub sources: Vec<PathBuf>,
}

/// All pending conversions of a run, indexed by target.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    entries: Vec<PlanEntry>,
    by_target: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry; re-adding the same source/target pair is a no-op.
    pub fn insert(&mut self, entry: PlanEntry) {
        let sources = self.by_target.entry(entry.target.clone()).or_default();
        if sources.insert(entry.source.clone()) {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Targets claimed by more than one distinct source.
    ///
    /// Targets are grouped ignoring letter case, since `Photo.png` and
    /// `photo.png` are one file on case-insensitive filesystems. A target that
    /// is itself the source of another pending entry counts as claimed by that
    /// file too: writing it would clobber an input not converted yet.
    pub fn collisions(&self) -> Vec<Collision> {
        let mut groups: BTreeMap<String, (PathBuf, BTreeSet<PathBuf>)> = BTreeMap::new();
        for (target, sources) in &self.by_target {
            let (_, claimants) = groups
                .entry(fold_case(target))
                .or_insert_with(|| (target.clone(), BTreeSet::new()));
            claimants.extend(sources.iter().cloned());
        }
        for entry in &self.entries {
            if let Some((_, claimants)) = groups.get_mut(&fold_case(&entry.source)) {
                claimants.insert(entry.source.clone());
            }
        }

        groups
            .into_values()
            .filter(|(_, claimants)| claimants.len() > 1)
            .map(|(target, claimants)| Collision {
                target,
                sources: claimants.into_iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, target: &str, kind: MediaKind) -> PlanEntry {
        PlanEntry {
            source: PathBuf::from(source),
            target: PathBuf::from(target),
            kind,
            streams: StreamInfo::default(),
        }
    }

    #[test]
    fn test_no_collisions_for_distinct_targets() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/a.jpg", "/s/a.png", MediaKind::Image));
        plan.insert(entry("/s/b.jpg", "/s/b.png", MediaKind::Image));
        assert_eq!(plan.len(), 2);
        assert!(plan.collisions().is_empty());
    }

    #[test]
    fn test_two_sources_one_target_collide() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/a.jpg", "/s/c.png", MediaKind::Image));
        plan.insert(entry("/s/b.jpg", "/s/c.png", MediaKind::Image));

        let collisions = plan.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].target, PathBuf::from("/s/c.png"));
        assert_eq!(
            collisions[0].sources,
            vec![PathBuf::from("/s/a.jpg"), PathBuf::from("/s/b.jpg")]
        );
    }

    #[test]
    fn test_same_source_twice_is_not_a_collision() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/a.jpg", "/s/a.png", MediaKind::Image));
        plan.insert(entry("/s/a.jpg", "/s/a.png", MediaKind::Image));
        assert_eq!(plan.len(), 1);
        assert!(plan.collisions().is_empty());
    }

    #[test]
    fn test_in_place_entry_is_not_a_collision() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/x.ogg", "/s/x.ogg", MediaKind::Audio));
        assert!(plan.entries()[0].is_in_place());
        assert!(plan.collisions().is_empty());
    }

    #[test]
    fn test_target_that_is_another_pending_source_collides() {
        let mut plan = Plan::new();
        // Mislabeled video and audio swapping containers.
        plan.insert(entry("/s/y.ogg", "/s/y.ogv", MediaKind::Video));
        plan.insert(entry("/s/y.ogv", "/s/y.ogg", MediaKind::Audio));

        let collisions = plan.collisions();
        assert_eq!(collisions.len(), 2);
        assert!(collisions.iter().all(|c| c.sources.len() == 2));
    }

    #[test]
    fn test_targets_differing_only_in_case_collide() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/Photo.jpg", "/s/Photo.png", MediaKind::Image));
        plan.insert(entry("/s/photo.gif", "/s/photo.png", MediaKind::Image));
        plan.insert(entry("/s/other.gif", "/s/other.png", MediaKind::Image));

        let collisions = plan.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].target, PathBuf::from("/s/Photo.png"));
        assert_eq!(
            collisions[0].sources,
            vec![PathBuf::from("/s/Photo.jpg"), PathBuf::from("/s/photo.gif")]
        );
    }

    #[test]
    fn test_target_matching_pending_source_case_insensitively_collides() {
        let mut plan = Plan::new();
        plan.insert(entry("/s/Movie.ogg", "/s/Movie.ogv", MediaKind::Video));
        plan.insert(entry("/s/movie.OGV", "/s/movie.OGV", MediaKind::Video));

        let collisions = plan.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].sources.len(), 2);
    }

    #[test]
    fn test_conversion_spec_follows_kind() {
        let encoding = EncodingConfig::default();
        let mut video = entry("/s/v.mp4", "/s/v.ogv", MediaKind::Video);
        video.streams.has_audio = false;
        assert_eq!(
            video.conversion_spec(&encoding),
            ConversionSpec::Video {
                video_quality: 7,
                audio_quality: 5,
                with_audio: false
            }
        );
        assert_eq!(
            entry("/s/a.mp3", "/s/a.ogg", MediaKind::Audio).conversion_spec(&encoding),
            ConversionSpec::Audio { quality: 5 }
        );
        assert_eq!(
            entry("/s/i.gif", "/s/i.png", MediaKind::Image).conversion_spec(&encoding),
            ConversionSpec::Image
        );
    }
}
