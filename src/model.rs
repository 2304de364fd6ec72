//! Dashboard entity types.
//!
//! Plain records, one per screen. Drafts are the same types with `id: None`;
//! the backend assigns ids on creation. Statuses and priorities are kept as
//! strings because the backend owns the vocabulary and list screens filter
//! on exact values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A project: the top-level container for epics, issues and sprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
  pub id: Option<String>,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub status: String,
  #[serde(default)]
  pub owner: Option<String>,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated: Option<DateTime<Utc>>,
}

/// Field replacements for a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectPatch {
  pub name: Option<String>,
  pub description: Option<String>,
  pub status: Option<String>,
  pub owner: Option<String>,
}

impl Resource for Project {
  type Patch = ProjectPatch;

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn resource_type() -> &'static str {
    "project"
  }

  fn search_text(&self) -> Vec<&str> {
    let mut fields = vec![self.name.as_str()];
    if let Some(description) = &self.description {
      fields.push(description);
    }
    fields
  }

  fn status(&self) -> Option<&str> {
    Some(&self.status)
  }

  fn missing_required_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.name.trim().is_empty() {
      missing.push("name");
    }
    missing
  }

  fn apply_patch(&mut self, patch: &ProjectPatch) {
    if let Some(name) = &patch.name {
      self.name = name.clone();
    }
    if let Some(description) = &patch.description {
      self.description = Some(description.clone());
    }
    if let Some(status) = &patch.status {
      self.status = status.clone();
    }
    if let Some(owner) = &patch.owner {
      self.owner = Some(owner.clone());
    }
  }
}

/// An epic: a large body of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub status: String,
  #[serde(default)]
  pub priority: Option<String>,
  /// Owning project.
  #[serde(default)]
  pub project_id: Option<String>,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated: Option<DateTime<Utc>>,
}

/// Field replacements for an epic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpicPatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub status: Option<String>,
  pub priority: Option<String>,
}

impl Resource for Epic {
  type Patch = EpicPatch;

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn resource_type() -> &'static str {
    "epic"
  }

  fn search_text(&self) -> Vec<&str> {
    let mut fields = vec![self.title.as_str()];
    if let Some(description) = &self.description {
      fields.push(description);
    }
    fields
  }

  fn status(&self) -> Option<&str> {
    Some(&self.status)
  }

  fn priority(&self) -> Option<&str> {
    self.priority.as_deref()
  }

  fn missing_required_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.title.trim().is_empty() {
      missing.push("title");
    }
    missing
  }

  fn apply_patch(&mut self, patch: &EpicPatch) {
    if let Some(title) = &patch.title {
      self.title = title.clone();
    }
    if let Some(description) = &patch.description {
      self.description = Some(description.clone());
    }
    if let Some(status) = &patch.status {
      self.status = status.clone();
    }
    if let Some(priority) = &patch.priority {
      self.priority = Some(priority.clone());
    }
  }
}

/// An issue: the unit of work list screens and boards revolve around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub status: String,
  #[serde(default)]
  pub priority: Option<String>,
  #[serde(default)]
  pub assignee: Option<String>,
  /// Owning project.
  #[serde(default)]
  pub project_id: Option<String>,
  /// Parent epic, if the issue belongs to one.
  #[serde(default)]
  pub epic_id: Option<String>,
  #[serde(default)]
  pub created: Option<DateTime<Utc>>,
  #[serde(default)]
  pub updated: Option<DateTime<Utc>>,
}

/// Field replacements for an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuePatch {
  pub title: Option<String>,
  pub description: Option<String>,
  pub status: Option<String>,
  pub priority: Option<String>,
  pub assignee: Option<String>,
  pub epic_id: Option<String>,
}

impl Resource for Issue {
  type Patch = IssuePatch;

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn resource_type() -> &'static str {
    "issue"
  }

  fn search_text(&self) -> Vec<&str> {
    let mut fields = vec![self.title.as_str()];
    if let Some(description) = &self.description {
      fields.push(description);
    }
    if let Some(assignee) = &self.assignee {
      fields.push(assignee);
    }
    fields
  }

  fn status(&self) -> Option<&str> {
    Some(&self.status)
  }

  fn priority(&self) -> Option<&str> {
    self.priority.as_deref()
  }

  fn missing_required_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.title.trim().is_empty() {
      missing.push("title");
    }
    if self.status.trim().is_empty() {
      missing.push("status");
    }
    missing
  }

  fn apply_patch(&mut self, patch: &IssuePatch) {
    if let Some(title) = &patch.title {
      self.title = title.clone();
    }
    if let Some(description) = &patch.description {
      self.description = Some(description.clone());
    }
    if let Some(status) = &patch.status {
      self.status = status.clone();
    }
    if let Some(priority) = &patch.priority {
      self.priority = Some(priority.clone());
    }
    if let Some(assignee) = &patch.assignee {
      self.assignee = Some(assignee.clone());
    }
    if let Some(epic_id) = &patch.epic_id {
      self.epic_id = Some(epic_id.clone());
    }
  }
}

/// A sprint: a time-boxed iteration within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
  pub id: Option<String>,
  pub name: String,
  pub status: String,
  #[serde(default)]
  pub goal: Option<String>,
  #[serde(default)]
  pub project_id: Option<String>,
  #[serde(default)]
  pub starts: Option<DateTime<Utc>>,
  #[serde(default)]
  pub ends: Option<DateTime<Utc>>,
}

/// Field replacements for a sprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintPatch {
  pub name: Option<String>,
  pub status: Option<String>,
  pub goal: Option<String>,
  pub starts: Option<DateTime<Utc>>,
  pub ends: Option<DateTime<Utc>>,
}

impl Resource for Sprint {
  type Patch = SprintPatch;

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn resource_type() -> &'static str {
    "sprint"
  }

  fn search_text(&self) -> Vec<&str> {
    let mut fields = vec![self.name.as_str()];
    if let Some(goal) = &self.goal {
      fields.push(goal);
    }
    fields
  }

  fn status(&self) -> Option<&str> {
    Some(&self.status)
  }

  fn missing_required_fields(&self) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if self.name.trim().is_empty() {
      missing.push("name");
    }
    missing
  }

  fn apply_patch(&mut self, patch: &SprintPatch) {
    if let Some(name) = &patch.name {
      self.name = name.clone();
    }
    if let Some(status) = &patch.status {
      self.status = status.clone();
    }
    if let Some(goal) = &patch.goal {
      self.goal = Some(goal.clone());
    }
    if let Some(starts) = patch.starts {
      self.starts = Some(starts);
    }
    if let Some(ends) = patch.ends {
      self.ends = Some(ends);
    }
  }
}
