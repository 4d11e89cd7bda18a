use std::fmt;

use shared::Waypoint;
use uuid::Uuid;

/// Stable identity of a point row, independent of its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointId(Uuid);

impl PointId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// DOM id of the row's text input.
    pub fn input_id(&self) -> String {
        format!("point-input-{}", self.0)
    }
}

impl Default for PointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointEntry {
    pub id: PointId,
    pub address: String,
    /// `(lat, lng)` once the row has been resolved.
    pub coords: Option<(f64, f64)>,
}

impl PointEntry {
    fn empty() -> Self {
        Self {
            id: PointId::new(),
            address: String::new(),
            coords: None,
        }
    }

    fn resolved(waypoint: Waypoint) -> Self {
        Self {
            id: PointId::new(),
            coords: Some((waypoint.lat, waypoint.lng)),
            address: waypoint.address,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.address.trim().is_empty()
    }

    pub fn waypoint(&self) -> Option<Waypoint> {
        self.coords
            .map(|(lat, lng)| Waypoint::new(self.address.clone(), lat, lng))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PointListError {
    #[error("the last remaining point cannot be removed")]
    LastPoint,
    #[error("unknown point {0}")]
    UnknownPoint(PointId),
}

/// Ordered point rows. Never empty: there is always at least one row to type
/// into.
#[derive(Debug, Clone, PartialEq)]
pub struct PointList {
    entries: Vec<PointEntry>,
}

impl Default for PointList {
    fn default() -> Self {
        Self {
            entries: vec![PointEntry::empty()],
        }
    }
}

impl PointList {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: PointId) -> Option<&PointEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn get_mut(&mut self, id: PointId) -> Result<&mut PointEntry, PointListError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(PointListError::UnknownPoint(id))
    }

    /// Remove controls are only enabled while more than one row exists.
    pub fn can_remove(&self) -> bool {
        self.entries.len() > 1
    }

    pub fn add_empty(&mut self) -> PointId {
        let entry = PointEntry::empty();
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn push_resolved(&mut self, waypoint: Waypoint) -> PointId {
        let entry = PointEntry::resolved(waypoint);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn remove(&mut self, id: PointId) -> Result<PointEntry, PointListError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(PointListError::UnknownPoint(id))?;
        if !self.can_remove() {
            return Err(PointListError::LastPoint);
        }
        Ok(self.entries.remove(index))
    }

    /// Replaces the row text. Returns true when the row lost its coordinates.
    pub fn edit_address(&mut self, id: PointId, text: String) -> Result<bool, PointListError> {
        let entry = self.get_mut(id)?;
        if entry.address == text {
            return Ok(false);
        }
        entry.address = text;
        Ok(entry.coords.take().is_some())
    }

    pub fn resolve(&mut self, id: PointId, waypoint: Waypoint) -> Result<(), PointListError> {
        let entry = self.get_mut(id)?;
        entry.coords = Some((waypoint.lat, waypoint.lng));
        entry.address = waypoint.address;
        Ok(())
    }

    /// Fills the last row when it is blank, otherwise appends a new row.
    pub fn apply_reverse_geocode(&mut self, waypoint: Waypoint) -> PointId {
        match self.entries.last_mut() {
            Some(last) if last.is_blank() => {
                last.coords = Some((waypoint.lat, waypoint.lng));
                last.address = waypoint.address;
                last.id
            }
            _ => self.push_resolved(waypoint),
        }
    }

    /// Replaces every row with the given order.
    pub fn replace_all(&mut self, waypoints: Vec<Waypoint>) {
        self.entries = waypoints.into_iter().map(PointEntry::resolved).collect();
        if self.entries.is_empty() {
            self.entries.push(PointEntry::empty());
        }
    }

    /// Resolved rows in order; unresolved rows are skipped.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.entries.iter().filter_map(PointEntry::waypoint).collect()
    }
}
