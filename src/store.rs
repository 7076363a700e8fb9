//! Local library of saved bundles and scheduled posts, persisted as JSON files
//! under the user data directory. Stores are constructed with an explicit
//! directory so nothing here touches global state.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::content::{ContentBundle, Platform, ScheduledContent};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A generated bundle kept in the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContent {
    pub id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub topic: String,
    pub posts: ContentBundle,
}

/// A post queued for publication at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: Uuid,
    pub platform: Platform,
    pub scheduled_at: DateTime<Utc>,
    pub topic: String,
    pub content: ScheduledContent,
}

/// Default data directory: ~/.local/share/post-studio/
pub fn default_data_dir() -> PathBuf {
    let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("post-studio");
    p
}

/// The default schedule slot when none is given: the next full hour.
pub fn default_schedule_time(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + Duration::hours(1))
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

fn load_entries<T: for<'de> Deserialize<'de>>(path: &Path) -> Vec<T> {
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
        Err(_) => Vec::new(),
    }
}

fn save_entries<T: Serialize>(dir: &Path, path: &Path, entries: &[T]) -> Result<(), BoxError> {
    fs::create_dir_all(dir)?;
    let data = serde_json::to_string_pretty(entries)?;
    fs::write(path, data)?;
    Ok(())
}

/// Resolve a full or prefix id against a set of entries.
fn find_by_prefix<'a, T>(
    entries: &'a [T],
    id_of: impl Fn(&T) -> Uuid,
    prefix: &str,
) -> Result<&'a T, BoxError> {
    let matches: Vec<&T> = entries
        .iter()
        .filter(|e| id_of(e).to_string().starts_with(prefix))
        .collect();
    match matches.len() {
        0 => Err(format!("no entry matches id '{prefix}'").into()),
        1 => Ok(matches[0]),
        n => Err(format!("id '{prefix}' is ambiguous ({n} matches)").into()),
    }
}

/// Repository of saved content bundles, newest first.
pub struct SavedStore {
    dir: PathBuf,
    entries: Vec<SavedContent>,
}

impl SavedStore {
    pub fn open(dir: PathBuf) -> Self {
        let entries = load_entries(&dir.join("saved.json"));
        Self { dir, entries }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("saved.json")
    }

    fn persist(&self) -> Result<(), BoxError> {
        save_entries(&self.dir, &self.path(), &self.entries)
    }

    /// Store a bundle under a fresh id, newest first. Returns the id.
    pub fn add(&mut self, topic: &str, posts: ContentBundle) -> Result<Uuid, BoxError> {
        let entry = SavedContent {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            topic: topic.to_string(),
            posts,
        };
        let id = entry.id;
        self.entries.insert(0, entry);
        self.persist()?;
        Ok(id)
    }

    pub fn list(&self) -> &[SavedContent] {
        &self.entries
    }

    pub fn get(&self, id_prefix: &str) -> Result<&SavedContent, BoxError> {
        find_by_prefix(&self.entries, |e| e.id, id_prefix)
    }

    pub fn delete(&mut self, id_prefix: &str) -> Result<Uuid, BoxError> {
        let id = self.get(id_prefix)?.id;
        self.entries.retain(|e| e.id != id);
        self.persist()?;
        Ok(id)
    }

    /// Replace a stored bundle after editing, keeping id and timestamp.
    pub fn update(&mut self, id_prefix: &str, posts: ContentBundle) -> Result<Uuid, BoxError> {
        let id = self.get(id_prefix)?.id;
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.posts = posts;
        }
        self.persist()?;
        Ok(id)
    }
}

/// Repository of scheduled posts, kept sorted by scheduled time.
pub struct ScheduleStore {
    dir: PathBuf,
    entries: Vec<ScheduledPost>,
}

impl ScheduleStore {
    pub fn open(dir: PathBuf) -> Self {
        let entries = load_entries(&dir.join("scheduled.json"));
        Self { dir, entries }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("scheduled.json")
    }

    fn persist(&self) -> Result<(), BoxError> {
        save_entries(&self.dir, &self.path(), &self.entries)
    }

    pub fn add(
        &mut self,
        platform: Platform,
        scheduled_at: DateTime<Utc>,
        topic: &str,
        content: ScheduledContent,
    ) -> Result<Uuid, BoxError> {
        let entry = ScheduledPost {
            id: Uuid::new_v4(),
            platform,
            scheduled_at,
            topic: topic.to_string(),
            content,
        };
        let id = entry.id;
        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.scheduled_at);
        self.persist()?;
        Ok(id)
    }

    pub fn list(&self) -> &[ScheduledPost] {
        &self.entries
    }

    /// Entries whose time has come (scheduled at or before `now`).
    pub fn due(&self, now: DateTime<Utc>) -> Vec<&ScheduledPost> {
        self.entries.iter().filter(|e| e.scheduled_at <= now).collect()
    }

    pub fn remove(&mut self, id_prefix: &str) -> Result<Uuid, BoxError> {
        let id = find_by_prefix(&self.entries, |e| e.id, id_prefix)?.id;
        self.entries.retain(|e| e.id != id);
        self.persist()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{LinkedInPost, XPost};
    use chrono::TimeZone;

    fn bundle() -> ContentBundle {
        ContentBundle {
            linkedin_post: LinkedInPost {
                title: "Title".into(),
                body: "Body".into(),
                hashtags: vec!["#ai".into()],
            },
            x_post: XPost {
                body: "Short".into(),
                hashtags: vec![],
            },
            image_prompt: "prompt".into(),
            podcast_script: None,
            blog_article: None,
            linkedin_poll: None,
            carousel: None,
            research_report: None,
        }
    }

    #[test]
    fn saved_store_adds_newest_first_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SavedStore::open(dir.path().to_path_buf());
        let first = store.add("topic one", bundle()).unwrap();
        let second = store.add("topic two", bundle()).unwrap();

        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0].id, second);
        assert_eq!(store.list()[1].id, first);

        // Reopen from disk.
        let store = SavedStore::open(dir.path().to_path_buf());
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list()[0].topic, "topic two");
    }

    #[test]
    fn saved_store_resolves_id_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SavedStore::open(dir.path().to_path_buf());
        let id = store.add("topic", bundle()).unwrap();

        let prefix = &id.to_string()[..8];
        assert_eq!(store.get(prefix).unwrap().id, id);
        assert!(store.get("ffffffff-0000").is_err());
    }

    #[test]
    fn saved_store_delete_removes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = SavedStore::open(dir.path().to_path_buf());
        let id = store.add("topic", bundle()).unwrap();
        store.delete(&id.to_string()).unwrap();
        assert!(store.list().is_empty());

        let store = SavedStore::open(dir.path().to_path_buf());
        assert!(store.list().is_empty());
    }

    #[test]
    fn schedule_store_keeps_entries_sorted_by_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ScheduleStore::open(dir.path().to_path_buf());
        let later = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let sooner = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        let post = ScheduledContent::X(XPost {
            body: "x".into(),
            hashtags: vec![],
        });
        store.add(Platform::X, later, "t", post.clone()).unwrap();
        store.add(Platform::Linkedin, sooner, "t", post).unwrap();

        assert_eq!(store.list()[0].scheduled_at, sooner);
        assert_eq!(store.list()[1].scheduled_at, later);
    }

    #[test]
    fn schedule_store_due_filters_by_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ScheduleStore::open(dir.path().to_path_buf());
        let past = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2027, 1, 1, 9, 0, 0).unwrap();
        let post = ScheduledContent::X(XPost {
            body: "x".into(),
            hashtags: vec![],
        });
        store.add(Platform::X, past, "t", post.clone()).unwrap();
        store.add(Platform::X, future, "t", post).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let due = store.due(now);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].scheduled_at, past);
    }

    #[test]
    fn default_schedule_time_is_next_full_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 17, 42).unwrap();
        let slot = default_schedule_time(now);
        assert_eq!(slot, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    }
}
