//! Shape library: the group list, which groups are active, and shape import.

use crate::defaults::default_groups;
use crate::shapes::{ShapeDefinition, ShapeGroup, ShapeId};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the group that receives imported shapes.
pub const UPLOADED_GROUP: &str = "Uploaded";

/// Group name to enabled flag. Groups missing from the map are inactive.
pub type ActiveGroupSet = HashMap<String, bool>;

/// All known shape groups plus the set of groups enabled for stamping.
///
/// Groups and shapes are only ever appended; the active shape list is derived
/// on demand so it always reflects the current groups and active set.
#[derive(Debug, Clone, Default)]
pub struct ShapeLibrary {
    groups: Vec<ShapeGroup>,
    active: ActiveGroupSet,
}

impl ShapeLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library from the built-in groups, all of them active.
    pub fn with_defaults() -> Self {
        let mut library = Self::new();
        for group in default_groups() {
            library.add_group(group, true);
        }
        library
    }

    /// Append a group. A group with the same name is extended instead of
    /// duplicated.
    pub fn add_group(&mut self, group: ShapeGroup, active: bool) {
        let name = group.name.clone();
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(existing) => existing.extend(group.shapes().iter().cloned()),
            None => self.groups.push(group),
        }
        self.active.insert(name, active);
    }

    /// Groups in display order.
    pub fn groups(&self) -> &[ShapeGroup] {
        &self.groups
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&ShapeGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The active-group map.
    pub fn active_groups(&self) -> &ActiveGroupSet {
        &self.active
    }

    pub fn is_group_active(&self, name: &str) -> bool {
        self.active.get(name).copied().unwrap_or(false)
    }

    /// Enable or disable a group. Returns true if the active set changed.
    pub fn set_group_active(&mut self, name: &str, active: bool) -> bool {
        if self.group(name).is_none() || self.is_group_active(name) == active {
            return false;
        }
        self.active.insert(name.to_string(), active);
        true
    }

    /// Flip a group's active flag, returning the new flag, or `None` for an
    /// unknown group.
    pub fn toggle_group(&mut self, name: &str) -> Option<bool> {
        self.group(name)?;
        let active = !self.is_group_active(name);
        self.active.insert(name.to_string(), active);
        Some(active)
    }

    /// Flattened shapes of every active group.
    pub fn active_shapes(&self) -> Vec<ShapeDefinition> {
        self.groups
            .iter()
            .filter(|g| self.is_group_active(&g.name))
            .flat_map(|g| g.shapes().iter().cloned())
            .collect()
    }

    /// Identifiers of the active shapes, in the same order as
    /// [`active_shapes`](Self::active_shapes).
    pub fn active_shape_ids(&self) -> Vec<ShapeId> {
        self.groups
            .iter()
            .filter(|g| self.is_group_active(&g.name))
            .flat_map(|g| g.shapes().iter().map(ShapeDefinition::id))
            .collect()
    }

    /// Import raw SVG payloads into the "Uploaded" group and activate it.
    ///
    /// Each payload gets a fresh identifier. Returns the new identifiers in
    /// input order; an empty input leaves the library untouched.
    pub fn import_shapes<I, S>(&mut self, payloads: I) -> Vec<ShapeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let shapes: Vec<ShapeDefinition> = payloads
            .into_iter()
            .map(|svg| ShapeDefinition::new(Uuid::new_v4(), svg))
            .collect();
        if shapes.is_empty() {
            return Vec::new();
        }

        let ids: Vec<ShapeId> = shapes.iter().map(ShapeDefinition::id).collect();
        let unrecolorable = shapes.iter().filter(|s| !s.is_recolorable()).count();
        if unrecolorable > 0 {
            log::warn!(
                "{} imported shape(s) have no recolor token and will ignore the brush color",
                unrecolorable
            );
        }

        self.add_group(ShapeGroup::new(UPLOADED_GROUP, shapes), true);
        log::info!("Imported {} shape(s) into {:?}", ids.len(), UPLOADED_GROUP);
        ids
    }
}
