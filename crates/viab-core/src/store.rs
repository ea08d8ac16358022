//! Keyed project store with update-by-id semantics.

use std::collections::BTreeMap;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::error::{ViabError, ViabResult};
use crate::project::{ProjectRecord, Stage};

/// Persistence seam for project records.
pub trait ProjectStore: Send + Sync {
    /// Stores a new project under one past the largest id in use and returns
    /// it with that id.
    fn create(&self, project: ProjectRecord) -> ViabResult<ProjectRecord>;

    fn get(&self, id: u64) -> ViabResult<ProjectRecord>;

    /// Replaces the record with the same id.
    fn update(&self, project: ProjectRecord) -> ViabResult<()>;

    fn delete(&self, id: u64) -> ViabResult<ProjectRecord>;

    /// Every record, ordered by id.
    fn list(&self) -> Vec<ProjectRecord>;

    /// How many projects sit in each stage. Every stage is present.
    fn stage_counts(&self) -> BTreeMap<Stage, usize> {
        let mut counts: BTreeMap<Stage, usize> = Stage::ALL.into_iter().map(|s| (s, 0)).collect();
        for project in self.list() {
            *counts.entry(project.stage).or_insert(0) += 1;
        }
        counts
    }
}

/// In-memory store backed by a concurrent map.
///
/// The next id is one past the largest id currently stored, so deleting the
/// newest project frees its id.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: DashMap<u64, ProjectRecord>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads existing records, keeping their ids.
    pub fn with_projects(projects: impl IntoIterator<Item = ProjectRecord>) -> Self {
        Self { projects: projects.into_iter().map(|p| (p.id, p)).collect() }
    }

    fn next_id(&self) -> u64 {
        self.projects.iter().map(|entry| *entry.key()).max().unwrap_or(0) + 1
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn create(&self, mut project: ProjectRecord) -> ViabResult<ProjectRecord> {
        loop {
            let id = self.next_id();
            if let Entry::Vacant(slot) = self.projects.entry(id) {
                project.id = id;
                slot.insert(project.clone());
                info!(project_id = id, name = %project.name, "Created project");
                return Ok(project);
            }
            // Taken by a concurrent create.
            debug!(project_id = id, "Id claimed concurrently, retrying");
        }
    }

    fn get(&self, id: u64) -> ViabResult<ProjectRecord> {
        self.projects
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ViabError::not_found(id))
    }

    fn update(&self, project: ProjectRecord) -> ViabResult<()> {
        let id = project.id;
        match self.projects.get_mut(&id) {
            Some(mut entry) => {
                *entry = project;
                debug!(project_id = id, "Updated project");
                Ok(())
            }
            None => Err(ViabError::not_found(id)),
        }
    }

    fn delete(&self, id: u64) -> ViabResult<ProjectRecord> {
        let (_, project) = self.projects.remove(&id).ok_or_else(|| ViabError::not_found(id))?;
        info!(project_id = id, "Deleted project");
        Ok(project)
    }

    fn list(&self) -> Vec<ProjectRecord> {
        let mut projects: Vec<ProjectRecord> =
            self.projects.iter().map(|entry| entry.value().clone()).collect();
        projects.sort_by_key(|p| p.id);
        projects
    }
}
