//! Captured todo items and the views built over them.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Layout of `Task::timestamp`: local date, a space, local time.
const TIMESTAMP_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";

/// Page a piece of text was copied from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// A captured text selection.
///
/// Field names serialize in camelCase to stay compatible with the stored
/// objects written by the browser extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Capture time in milliseconds since the Unix epoch, unique within a list.
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// `"<date> <time>"` in local time, may be empty for imported tasks.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Task {
    /// Date part of the timestamp, `None` when the task has no timestamp.
    pub fn date(&self) -> Option<&str> {
        self.timestamp.split(' ').next().filter(|d| !d.is_empty())
    }

    /// Time part of the timestamp, empty when absent.
    pub fn time(&self) -> &str {
        self.timestamp.split(' ').nth(1).unwrap_or("")
    }

    /// Render the task text as markdown.
    pub fn render_body(&self) -> String {
        crate::render_markdown(&self.text)
    }

    fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self
                .source_title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(needle))
    }

    fn checklist_line(&self, local_source_label: &str) -> String {
        let mark = if self.completed { 'x' } else { ' ' };
        let source = match (&self.source_title, &self.source_url) {
            (Some(title), Some(url)) => format!("[{title}]({url})"),
            (Some(title), None) => title.clone(),
            (None, _) => local_source_label.to_string(),
        };
        format!(
            "- [{mark}] {} (Source: {source} | Time: {})",
            self.text, self.timestamp
        )
    }
}

/// Tasks that share a capture date
#[derive(Debug, PartialEq, Eq)]
pub struct DateGroup<'a> {
    pub date: String,
    pub tasks: Vec<&'a Task>,
}

/// Ordered task list, newest capture first.
///
/// Serializes as `{ "tasks": [...] }`, the shape of the extension's storage object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Record a copied selection at the front of the list.
    ///
    /// The text is trimmed; blank selections are ignored and return `None`.
    pub fn capture(
        &mut self,
        text: &str,
        source: Option<Source>,
        now: DateTime<Local>,
    ) -> Option<&Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        // Two captures in the same millisecond must still get distinct ids
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let next_free = self.tasks.iter().map(|t| t.id.saturating_add(1)).max().unwrap_or(0);
        let mut id = millis.max(next_free);
        if self.get(id).is_some() {
            // Only reachable once u64::MAX is taken
            id = (0..=u64::MAX)
                .find(|candidate| self.get(*candidate).is_none())
                .unwrap_or_default();
        }

        let (source_title, source_url) = match source {
            Some(Source { title, url }) => (Some(title), Some(url)),
            None => (None, None),
        };

        self.tasks.insert(
            0,
            Task {
                id,
                text: text.to_string(),
                completed: false,
                timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
                source_title,
                source_url,
            },
        );
        debug!(id, "captured task");
        self.tasks.first()
    }

    /// Flip the completed flag. Returns `false` if no task has this id.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Replace a task's text with the trimmed `new_text`.
    ///
    /// Blank or unchanged text leaves the task alone and returns `false`.
    pub fn update_text(&mut self, id: u64, new_text: &str) -> bool {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return false;
        }
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.text != new_text => {
                task.text = new_text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Remove a task. Returns `false` if no task has this id.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Move the task `from_id` to the position `to_id` currently occupies.
    ///
    /// The target index is taken before the moved task is removed, so moving
    /// down lands just after the target and moving up lands just before it.
    pub fn move_task(&mut self, from_id: u64, to_id: u64) -> bool {
        if from_id == to_id {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(from_id), self.position(to_id)) else {
            return false;
        };
        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        true
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Tasks whose text or source title contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&Task> {
        let needle = term.to_lowercase();
        self.tasks.iter().filter(|t| t.matches(&needle)).collect()
    }

    /// Render the whole list as a markdown checklist, one task per line.
    pub fn to_checklist(&self, local_source_label: &str) -> String {
        self.tasks
            .iter()
            .map(|t| t.checklist_line(local_source_label))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Group tasks by capture date, keeping the order in which dates first appear.
pub fn group_by_date<'a>(tasks: &[&'a Task], unknown_date_label: &str) -> Vec<DateGroup<'a>> {
    let mut groups: Vec<DateGroup<'a>> = Vec::new();
    for &task in tasks {
        let date = task.date().unwrap_or(unknown_date_label);
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.tasks.push(task),
            None => groups.push(DateGroup {
                date: date.to_string(),
                tasks: vec![task],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, day, hour, 3, 7).unwrap()
    }

    fn task(id: u64, text: &str, timestamp: &str) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed: false,
            timestamp: timestamp.to_string(),
            source_title: None,
            source_url: None,
        }
    }

    fn ids(list: &TaskList) -> Vec<u64> {
        list.tasks.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_capture_prepends_trimmed_text() {
        let mut list = TaskList::default();
        list.capture("  first \n", None, at(5, 9));
        let source = Source {
            title: "Rust Book".to_string(),
            url: "https://doc.rust-lang.org/book/".to_string(),
        };
        let captured = list.capture("second", Some(source), at(5, 10)).unwrap();
        assert_eq!(captured.timestamp, "2024/1/5 10:03:07");
        assert_eq!(captured.source_title.as_deref(), Some("Rust Book"));

        let texts: Vec<&str> = list.tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert!(!list.tasks[0].completed);
    }

    #[test]
    fn test_capture_ignores_blank_text() {
        let mut list = TaskList::default();
        assert!(list.capture(" \t\n", None, at(5, 9)).is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_capture_ids_are_unique_within_one_millisecond() {
        let mut list = TaskList::default();
        list.capture("a", None, at(5, 9));
        list.capture("b", None, at(5, 9));
        let ids = ids(&list);
        assert_eq!(ids[0], ids[1] + 1);
    }

    #[test]
    fn test_capture_after_largest_possible_id() {
        let mut list = TaskList::new(vec![task(u64::MAX, "last", ""), task(0, "first", "")]);
        let id = list.capture("next", None, at(5, 9)).unwrap().id;
        assert_eq!(id, 1);
        assert_eq!(ids(&list), vec![1, u64::MAX, 0]);
    }

    #[test]
    fn test_toggle() {
        let mut list = TaskList::new(vec![task(1, "a", "")]);
        assert!(list.toggle(1));
        assert!(list.tasks[0].completed);
        assert!(list.toggle(1));
        assert!(!list.tasks[0].completed);
        assert!(!list.toggle(99));
    }

    #[test]
    fn test_update_text() {
        let mut list = TaskList::new(vec![task(1, "old", "")]);
        assert!(!list.update_text(1, "   "));
        assert!(!list.update_text(1, " old "));
        assert!(!list.update_text(2, "new"));
        assert!(list.update_text(1, " new "));
        assert_eq!(list.tasks[0].text, "new");
    }

    #[test]
    fn test_delete() {
        let mut list = TaskList::new(vec![task(1, "a", ""), task(2, "b", "")]);
        assert!(list.delete(1));
        assert!(!list.delete(1));
        assert_eq!(ids(&list), vec![2]);
    }

    #[test]
    fn test_move_task_down_and_up() {
        let tasks = vec![
            task(1, "a", ""),
            task(2, "b", ""),
            task(3, "c", ""),
            task(4, "d", ""),
        ];
        let mut list = TaskList::new(tasks.clone());
        assert!(list.move_task(1, 3));
        assert_eq!(ids(&list), vec![2, 3, 1, 4]);

        let mut list = TaskList::new(tasks);
        assert!(list.move_task(4, 2));
        assert_eq!(ids(&list), vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_move_task_unknown_id_is_noop() {
        let mut list = TaskList::new(vec![task(1, "a", ""), task(2, "b", "")]);
        assert!(!list.move_task(1, 9));
        assert!(!list.move_task(9, 1));
        assert!(!list.move_task(1, 1));
        assert_eq!(ids(&list), vec![1, 2]);
    }

    #[test]
    fn test_search_matches_text_and_title_ignoring_case() {
        let mut titled = task(2, "other", "");
        titled.source_title = Some("Tokio Tutorial".to_string());
        let list = TaskList::new(vec![task(1, "Learn TOKIO", ""), titled, task(3, "x", "")]);

        let found: Vec<u64> = list.search("tokio").iter().map(|t| t.id).collect();
        assert_eq!(found, vec![1, 2]);
        assert_eq!(list.search("").len(), 3);
    }

    #[test]
    fn test_group_by_date_keeps_first_appearance_order() {
        let list = TaskList::new(vec![
            task(1, "a", "2024/1/6 08:00:00"),
            task(2, "b", "2024/1/5 23:00:00"),
            task(3, "c", ""),
            task(4, "d", "2024/1/6 07:00:00"),
        ]);
        let all: Vec<&Task> = list.tasks.iter().collect();
        let groups = group_by_date(&all, "Unknown date");

        let summary: Vec<(&str, Vec<u64>)> = groups
            .iter()
            .map(|g| (g.date.as_str(), g.tasks.iter().map(|t| t.id).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024/1/6", vec![1, 4]),
                ("2024/1/5", vec![2]),
                ("Unknown date", vec![3]),
            ]
        );
    }

    #[test]
    fn test_date_and_time_parts() {
        let t = task(1, "a", "2024/1/6 08:00:00");
        assert_eq!(t.date(), Some("2024/1/6"));
        assert_eq!(t.time(), "08:00:00");

        let t = task(1, "a", "");
        assert_eq!(t.date(), None);
        assert_eq!(t.time(), "");
    }

    #[test]
    fn test_checklist_export() {
        let mut done = task(1, "ship it", "2024/1/6 08:00:00");
        done.completed = true;
        done.source_title = Some("Issue".to_string());
        done.source_url = Some("https://x.com/1".to_string());
        let local = task(2, "local note", "2024/1/5 09:00:00");

        let list = TaskList::new(vec![done, local]);
        assert_eq!(
            list.to_checklist("Local copy"),
            "- [x] ship it (Source: [Issue](https://x.com/1) | Time: 2024/1/6 08:00:00)\n\
             - [ ] local note (Source: Local copy | Time: 2024/1/5 09:00:00)"
        );
        assert_eq!(TaskList::default().to_checklist("Local copy"), "");
    }

    #[test]
    fn test_render_body() {
        let t = task(1, "**todo**\n- a", "");
        assert_eq!(t.render_body(), "<p><strong>todo</strong></p><ul><li>a</li></ul>");
    }

    #[test]
    fn test_deserializes_extension_objects() {
        let json = r#"{"tasks":[{"id":1700000000000,"text":"hi","completed":true,
            "timestamp":"2023/11/14 22:13:20","sourceTitle":"Page","sourceUrl":"https://p"},
            {"id":1,"text":"bare"}]}"#;
        let list: TaskList = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.tasks[0].source_url.as_deref(), Some("https://p"));
        assert_eq!(list.tasks[1].timestamp, "");
        assert!(!list.tasks[1].completed);
    }
}
