use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskdeck_types::api::{CreateStatusRequest, CreateTodoRequest, UpdateStatusRequest, UpdateTodoRequest};
use taskdeck_types::models::{Priority, Status, Todo};

use crate::api::{ClientError, TodoApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Date,
    Alphabetical,
    Priority,
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Board,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The persisted slice of the store. The host application serializes
/// [`ClientStore::preferences`] on change and hands the value back to
/// [`ClientStore::new`] on the next start; everything else is reloaded from
/// the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub filter: FilterMode,
    pub priority_filter: Option<Priority>,
    pub category_filter: Option<String>,
    pub tag_filter: Option<String>,
    pub status_filter: Option<Uuid>,
    pub sort: SortMode,
    pub view: ViewMode,
    pub theme: Theme,
    pub onboarding_dismissed: bool,
    /// Ad-hoc category suggestions collected from the user's own input.
    pub custom_categories: Vec<String>,
}

/// One column of the board view. `status` is `None` for the synthetic
/// trailing group that collects todos with a null or unknown status.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardGroup {
    pub status: Option<Status>,
    pub todos: Vec<Todo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

/// Session mirror of the user's todos and statuses. Every mutating action
/// calls the server first and applies only the server-confirmed record; a
/// failed call leaves the mirror untouched and surfaces the error.
pub struct ClientStore<A: TodoApi> {
    api: A,
    todos: Vec<Todo>,
    statuses: Vec<Status>,
    prefs: Preferences,
}

impl<A: TodoApi> ClientStore<A> {
    pub fn new(api: A, prefs: Preferences) -> Self {
        Self {
            api,
            todos: Vec::new(),
            statuses: Vec::new(),
            prefs,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }

    // -- Loading --

    pub async fn load_todos(&mut self) -> Result<(), ClientError> {
        self.todos = self.api.list_todos().await?;
        Ok(())
    }

    pub async fn load_statuses(&mut self) -> Result<(), ClientError> {
        self.statuses = self.api.list_statuses().await?;
        self.statuses.sort_by_key(|s| s.sort_order);
        Ok(())
    }

    // -- Todo actions --

    pub async fn add_todo(&mut self, req: CreateTodoRequest) -> Result<Todo, ClientError> {
        let todo = self.api.create_todo(&req).await?;
        // Server list order is newest first.
        self.todos.insert(0, todo.clone());
        Ok(todo)
    }

    pub async fn edit_todo(
        &mut self,
        id: Uuid,
        req: UpdateTodoRequest,
    ) -> Result<Todo, ClientError> {
        let todo = self.api.update_todo(id, &req).await?;
        self.replace_todo(todo.clone());
        Ok(todo)
    }

    pub async fn toggle_todo(&mut self, id: Uuid) -> Result<Todo, ClientError> {
        let current = self
            .todos
            .iter()
            .find(|t| t.id == id)
            .ok_or(ClientError::NotLoaded(id))?;
        let req = UpdateTodoRequest {
            completed: Some(!current.completed),
            ..Default::default()
        };
        self.edit_todo(id, req).await
    }

    /// Drag-and-drop between board columns; `status_id = None` drops the
    /// todo into the no-status group.
    pub async fn set_todo_status(
        &mut self,
        id: Uuid,
        status_id: Option<Uuid>,
    ) -> Result<Todo, ClientError> {
        let req = UpdateTodoRequest {
            status_id: Some(status_id),
            ..Default::default()
        };
        self.edit_todo(id, req).await
    }

    pub async fn delete_todo(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete_todo(id).await?;
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    fn replace_todo(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        } else {
            self.todos.insert(0, todo);
        }
    }

    // -- Status actions --

    pub async fn create_status(&mut self, req: CreateStatusRequest) -> Result<Status, ClientError> {
        let status = self.api.create_status(&req).await?;
        self.statuses.push(status.clone());
        self.statuses.sort_by_key(|s| s.sort_order);
        Ok(status)
    }

    pub async fn update_status(
        &mut self,
        id: Uuid,
        req: UpdateStatusRequest,
    ) -> Result<Status, ClientError> {
        let status = self.api.update_status(id, &req).await?;
        if let Some(slot) = self.statuses.iter_mut().find(|s| s.id == id) {
            *slot = status.clone();
        }
        self.statuses.sort_by_key(|s| s.sort_order);
        Ok(status)
    }

    pub async fn delete_status(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete_status(id).await?;
        self.statuses.retain(|s| s.id != id);
        Ok(())
    }

    pub fn status_by_id(&self, id: Uuid) -> Option<&Status> {
        self.statuses.iter().find(|s| s.id == id)
    }

    /// The status that counts as completion, if the user has one.
    pub fn done_status(&self) -> Option<&Status> {
        self.statuses.iter().find(|s| s.is_done)
    }

    // -- Preference actions --

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.prefs.filter = filter;
    }

    pub fn set_priority_filter(&mut self, priority: Option<Priority>) {
        self.prefs.priority_filter = priority;
    }

    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.prefs.category_filter = category;
    }

    pub fn set_tag_filter(&mut self, tag: Option<String>) {
        self.prefs.tag_filter = tag;
    }

    pub fn set_status_filter(&mut self, status_id: Option<Uuid>) {
        self.prefs.status_filter = status_id;
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.prefs.sort = sort;
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.prefs.view = view;
    }

    pub fn toggle_theme(&mut self) {
        self.prefs.theme = match self.prefs.theme {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
    }

    pub fn dismiss_onboarding(&mut self) {
        self.prefs.onboarding_dismissed = true;
    }

    pub fn add_custom_category(&mut self, category: &str) {
        let category = category.trim();
        if category.is_empty() {
            return;
        }
        if !self.prefs.custom_categories.iter().any(|c| c == category) {
            self.prefs.custom_categories.push(category.to_string());
        }
    }

    // -- Derived views --

    /// Completion filter intersected with the optional equality filters,
    /// then sorted by the active mode.
    pub fn filtered_todos(&self) -> Vec<Todo> {
        let mut out: Vec<Todo> = self
            .todos
            .iter()
            .filter(|t| match self.prefs.filter {
                FilterMode::All => true,
                FilterMode::Active => !t.completed,
                FilterMode::Completed => t.completed,
            })
            .filter(|t| {
                self.prefs
                    .priority_filter
                    .is_none_or(|p| t.priority == p)
            })
            .filter(|t| {
                self.prefs
                    .category_filter
                    .as_deref()
                    .is_none_or(|c| t.category.as_deref() == Some(c))
            })
            .filter(|t| {
                self.prefs
                    .tag_filter
                    .as_deref()
                    .is_none_or(|tag| t.tags.iter().any(|x| x == tag))
            })
            .filter(|t| {
                self.prefs
                    .status_filter
                    .is_none_or(|s| t.status_id == Some(s))
            })
            .cloned()
            .collect();

        match self.prefs.sort {
            SortMode::Date => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortMode::Alphabetical => out.sort_by(|a, b| a.text.cmp(&b.text)),
            SortMode::Priority => out.sort_by(|a, b| b.priority.cmp(&a.priority)),
            // Missing deadlines sort after all present ones; the sort is
            // stable, so two deadline-less todos keep their relative order.
            SortMode::Deadline => out.sort_by(|a, b| match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
        }

        out
    }

    /// Board view: one group per status ordered by `sort_order`, plus a
    /// trailing no-status group for null or unknown status ids. Respects the
    /// active filters.
    pub fn board(&self) -> Vec<BoardGroup> {
        let todos = self.filtered_todos();
        let mut groups: Vec<BoardGroup> = self
            .statuses
            .iter()
            .map(|s| BoardGroup {
                status: Some(s.clone()),
                todos: Vec::new(),
            })
            .collect();
        let mut orphans = BoardGroup {
            status: None,
            todos: Vec::new(),
        };

        for todo in todos {
            let slot = todo.status_id.and_then(|sid| {
                groups
                    .iter_mut()
                    .find(|g| g.status.as_ref().is_some_and(|s| s.id == sid))
            });
            match slot {
                Some(group) => group.todos.push(todo),
                None => orphans.todos.push(todo),
            }
        }

        groups.push(orphans);
        groups
    }

    pub fn stats(&self) -> Stats {
        let completed = self.todos.iter().filter(|t| t.completed).count();
        Stats {
            total: self.todos.len(),
            completed,
            active: self.todos.len() - completed,
        }
    }
}
