//! Filter, search and pagination state for list controllers.

use crate::resource::Resource;

/// Exact-match filter over one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldFilter {
  /// Pass everything; the filter is skipped.
  #[default]
  All,
  /// Pass entities whose field equals this value exactly.
  Value(String),
}

impl FieldFilter {
  pub fn value(v: impl Into<String>) -> Self {
    FieldFilter::Value(v.into())
  }

  fn matches(&self, actual: Option<&str>) -> bool {
    match self {
      FieldFilter::All => true,
      FieldFilter::Value(wanted) => actual == Some(wanted.as_str()),
    }
  }
}

/// Partial filter update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
  pub search_term: Option<String>,
  pub status: Option<FieldFilter>,
  pub priority: Option<FieldFilter>,
}

/// Per-controller filter and pagination state.
///
/// Filtering is applied in a fixed order: substring search over the entity's
/// designated text fields (case-insensitive), exact-match status, exact-match
/// priority, then pagination. Given the same collection and state the output
/// is always identical; insertion order is the tie-break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  search_term: String,
  status: FieldFilter,
  priority: FieldFilter,
  /// 1-based.
  page: usize,
  page_size: usize,
}

impl FilterState {
  pub fn new(page_size: usize) -> Self {
    Self {
      search_term: String::new(),
      status: FieldFilter::All,
      priority: FieldFilter::All,
      page: 1,
      page_size: page_size.max(1),
    }
  }

  pub fn search_term(&self) -> &str {
    &self.search_term
  }

  pub fn status(&self) -> &FieldFilter {
    &self.status
  }

  pub fn priority(&self) -> &FieldFilter {
    &self.priority
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub(crate) fn merge(&mut self, update: FilterUpdate) {
    if let Some(term) = update.search_term {
      self.search_term = term;
    }
    if let Some(status) = update.status {
      self.status = status;
    }
    if let Some(priority) = update.priority {
      self.priority = priority;
    }
  }

  pub(crate) fn set_page(&mut self, page: usize) {
    self.page = page.max(1);
  }

  pub(crate) fn set_page_size(&mut self, page_size: usize) {
    self.page_size = page_size.max(1);
  }

  /// Re-clamp the stored page to 1 when the filtered count no longer
  /// reaches it.
  pub(crate) fn clamp_page(&mut self, filtered_count: usize) {
    if filtered_count <= (self.page - 1) * self.page_size {
      self.page = 1;
    }
  }

  fn matches_item<T: Resource>(&self, item: &T) -> bool {
    if !self.search_term.is_empty() {
      let needle = self.search_term.to_lowercase();
      let hit = item
        .search_text()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }
    self.status.matches(item.status()) && self.priority.matches(item.priority())
  }

  /// Count of entities passing the filters, before pagination.
  pub(crate) fn matching_count<T: Resource>(&self, items: &[T]) -> usize {
    items.iter().filter(|i| self.matches_item(*i)).count()
  }

  /// Apply filters and pagination. Fully recomputed on each call; never
  /// panics on an out-of-range page (it falls back to page 1).
  pub(crate) fn apply<'a, T: Resource>(&self, items: &'a [T]) -> Vec<&'a T> {
    let matching: Vec<&T> = items.iter().filter(|i| self.matches_item(*i)).collect();

    let page = if matching.len() <= (self.page - 1) * self.page_size {
      1
    } else {
      self.page
    };

    matching
      .into_iter()
      .skip((page - 1) * self.page_size)
      .take(self.page_size)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Issue;

  fn issue(id: &str, title: &str, status: &str, priority: Option<&str>) -> Issue {
    Issue {
      id: Some(id.to_string()),
      title: title.to_string(),
      description: None,
      status: status.to_string(),
      priority: priority.map(String::from),
      assignee: None,
      project_id: None,
      epic_id: None,
      created: None,
      updated: None,
    }
  }

  fn sample() -> Vec<Issue> {
    vec![
      issue("1", "Fix login crash", "todo", Some("high")),
      issue("2", "Update docs", "done", Some("low")),
      issue("3", "Login page styling", "todo", Some("low")),
      issue("4", "Crash on resize", "in_progress", None),
    ]
  }

  #[test]
  fn search_is_case_insensitive_substring() {
    let items = sample();
    let mut filter = FilterState::new(10);
    filter.merge(FilterUpdate {
      search_term: Some("LOGIN".to_string()),
      ..FilterUpdate::default()
    });

    let view = filter.apply(&items);
    let ids: Vec<_> = view.iter().map(|i| i.id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["1", "3"]);
  }

  #[test]
  fn filters_compose_search_then_status_then_priority() {
    let items = sample();
    let mut filter = FilterState::new(10);
    filter.merge(FilterUpdate {
      search_term: Some("login".to_string()),
      status: Some(FieldFilter::value("todo")),
      priority: Some(FieldFilter::value("low")),
    });

    let view = filter.apply(&items);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id.as_deref(), Some("3"));
  }

  #[test]
  fn all_sentinel_skips_the_field() {
    let items = sample();
    let filter = FilterState::new(10);
    assert_eq!(filter.apply(&items).len(), 4);
  }

  #[test]
  fn pagination_slices_in_insertion_order() {
    let items = sample();
    let mut filter = FilterState::new(2);
    assert_eq!(
      filter.apply(&items).iter().map(|i| i.id.as_deref().unwrap()).collect::<Vec<_>>(),
      vec!["1", "2"]
    );

    filter.set_page(2);
    assert_eq!(
      filter.apply(&items).iter().map(|i| i.id.as_deref().unwrap()).collect::<Vec<_>>(),
      vec!["3", "4"]
    );
  }

  #[test]
  fn out_of_range_page_falls_back_to_first_page() {
    let items = sample();
    let mut filter = FilterState::new(10);
    filter.set_page(3);

    // Only 4 items match; page 3 starts at index 20. Must not panic, must
    // serve page 1.
    let view = filter.apply(&items);
    assert_eq!(view.len(), 4);
    assert_eq!(view[0].id.as_deref(), Some("1"));
  }

  #[test]
  fn clamp_resets_stored_page_when_results_shrink() {
    let mut filter = FilterState::new(10);
    filter.set_page(3);
    filter.clamp_page(5);
    assert_eq!(filter.page(), 1);

    filter.set_page(2);
    filter.clamp_page(15);
    assert_eq!(filter.page(), 2);
  }

  #[test]
  fn apply_is_pure_and_repeatable() {
    let items = sample();
    let mut filter = FilterState::new(2);
    filter.merge(FilterUpdate {
      search_term: Some("crash".to_string()),
      ..FilterUpdate::default()
    });

    let first: Vec<_> = filter.apply(&items).iter().map(|i| i.id.clone()).collect();
    let second: Vec<_> = filter.apply(&items).iter().map(|i| i.id.clone()).collect();
    assert_eq!(first, second);
  }
}
