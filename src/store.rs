use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::core::error::DchatError;
use crate::discussion::Discussion;

const CODE_LEN: usize = 10;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One row of the `!open` listing.
#[derive(Debug, Clone)]
pub struct DiscussionSummary {
    pub id: usize,
    pub code: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Durable mapping from discussion code to a JSON record, one file per
/// discussion under a single root directory. Every operation goes to disk;
/// nothing is cached in memory.
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DchatError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            DchatError::Config(format!(
                "Cannot create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(Self { root })
    }

    fn record_path(&self, code: &str) -> PathBuf {
        self.root.join(format!("{}.json", code))
    }

    /// Summaries of every record, last-modified first, with ordinal IDs
    /// assigned from the sorted position.
    pub fn list(&self) -> Result<Vec<DiscussionSummary>, DchatError> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let contents = fs::read_to_string(&path)?;
            let discussion: Discussion = serde_json::from_str(&contents)?;
            records.push(discussion);
        }

        records.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

        Ok(records
            .into_iter()
            .enumerate()
            .map(|(i, d)| DiscussionSummary {
                id: i + 1,
                code: d.code.clone(),
                title: d.title().to_string(),
                created_at: d.created_at,
                modified_at: d.modified_at,
            })
            .collect())
    }

    pub fn load(&self, code: &str) -> Result<Discussion, DchatError> {
        let path = self.record_path(code);
        if !path.exists() {
            return Err(DchatError::NotFound(code.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Creates or overwrites the record, bumping the modified timestamp.
    pub fn save(&self, discussion: &mut Discussion) -> Result<(), DchatError> {
        discussion.touch();
        let contents = serde_json::to_string_pretty(discussion)?;
        fs::write(self.record_path(&discussion.code), contents)?;
        Ok(())
    }

    pub fn delete(&self, code: &str) -> Result<(), DchatError> {
        let path = self.record_path(code);
        if !path.exists() {
            return Err(DchatError::NotFound(code.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Removes every record. A no-op on an empty store.
    pub fn delete_all(&self) -> Result<(), DchatError> {
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Random code over `A-Z0-9`, regenerated until it collides with no
    /// existing record.
    pub fn generate_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.record_path(&code).exists() {
                return code;
            }
        }
    }

    pub fn next_ordinal(&self) -> Result<usize, DchatError> {
        Ok(self.list()?.len() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discussion::{DEFAULT_MODEL, DEFAULT_TOKEN_LIMIT, Role};
    use tempfile::tempdir;

    fn new_discussion(store: &RecordStore, title: &str) -> Discussion {
        Discussion::new(
            store.generate_code(),
            1,
            title.to_string(),
            DEFAULT_MODEL.to_string(),
            DEFAULT_TOKEN_LIMIT,
        )
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        let mut d = new_discussion(&store, "Demo");
        store.save(&mut d).unwrap();

        let loaded = store.load(&d.code).unwrap();
        assert_eq!(loaded.title(), "Demo");
        assert_eq!(loaded.model(), DEFAULT_MODEL);
        assert_eq!(loaded.token_limit(), DEFAULT_TOKEN_LIMIT);
        assert!(loaded.messages().is_empty());
        assert!(loaded.system_message().is_none());
    }

    #[test]
    fn messages_survive_persistence() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        let mut d = new_discussion(&store, "Demo");
        d.set_system_message("be brief");
        d.add_message(Role::User, "hello");
        d.add_message(Role::Assistant, "hi there");
        store.save(&mut d).unwrap();

        let loaded = store.load(&d.code).unwrap();
        assert_eq!(loaded.system_message(), Some("be brief"));
        assert_eq!(loaded.messages().len(), 2);
        assert_eq!(loaded.messages()[1].content, "hi there");
    }

    #[test]
    fn load_unknown_code_is_not_found() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load("NOSUCHCODE"),
            Err(DchatError::NotFound(_))
        ));
    }

    #[test]
    fn delete_unknown_code_is_not_found() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.delete("NOSUCHCODE"),
            Err(DchatError::NotFound(_))
        ));
    }

    #[test]
    fn delete_all_empties_the_store_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        for title in ["a", "b", "c"] {
            let mut d = new_discussion(&store, title);
            store.save(&mut d).unwrap();
        }
        assert_eq!(store.list().unwrap().len(), 3);

        store.delete_all().unwrap();
        assert!(store.list().unwrap().is_empty());

        store.delete_all().unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_sorts_by_modified_descending_with_fresh_ordinals() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        let mut first = new_discussion(&store, "first");
        store.save(&mut first).unwrap();
        let mut second = new_discussion(&store, "second");
        store.save(&mut second).unwrap();

        // touching "first" again makes it the most recent
        store.save(&mut first).unwrap();

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].code, first.code);
        assert_eq!(summaries[0].id, 1);
        assert_eq!(summaries[1].code, second.code);
        assert_eq!(summaries[1].id, 2);
    }

    #[test]
    fn generated_codes_use_the_expected_alphabet() {
        let dir = tempdir().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();

        let code = store.generate_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
        assert_ne!(code, store.generate_code());
    }
}
