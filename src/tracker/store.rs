//! Ordered collection of tracks for one run.

use crate::error::{Result, TrackError};
use crate::tracker::geometry::Rect;
use crate::tracker::track::Track;

/// Owns every track created during a run.
///
/// Tracks are never removed, so a track's position is stable for the
/// lifetime of the store. Ids come from a counter owned by the store and
/// are never reused, even if the track that claimed one was never pushed.
#[derive(Debug, Default)]
pub struct TrackStore {
    tracks: Vec<Track>,
    next_id: u64,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the next track id.
    pub(crate) fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a track and return its position.
    pub(crate) fn push(&mut self, track: Track) -> usize {
        debug_assert!(
            self.tracks.last().is_none_or(|last| last.id() < track.id()),
            "track ids must increase in creation order"
        );
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Track> {
        self.tracks.get(index).ok_or(TrackError::TrackNotFound(index))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Result<&mut Track> {
        self.tracks
            .get_mut(index)
            .ok_or(TrackError::TrackNotFound(index))
    }

    /// Look a track up by id. Ids increase with position.
    pub fn find_by_id(&self, id: u64) -> Option<&Track> {
        self.tracks
            .binary_search_by_key(&id, Track::id)
            .ok()
            .map(|i| &self.tracks[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Most recent box of every track, in store order.
    pub fn latest_boxes(&self) -> Vec<Rect> {
        self.tracks.iter().map(Track::latest_box).collect()
    }
}

impl<'a> IntoIterator for &'a TrackStore {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
