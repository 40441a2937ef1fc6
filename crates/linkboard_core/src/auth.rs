//! Editor flag persisted in the key-value store.

use crate::repo::kv_repo::KeyValueRepository;
use crate::ui::AuthProvider;
use log::{info, warn};

/// Key the login page writes.
pub const EDITOR_FLAG_KEY: &str = "is_editor";

/// Reads `is_editor == "true"` from a key-value repository.
pub struct StoredEditorFlag<R> {
    repo: R,
}

impl<R: KeyValueRepository> StoredEditorFlag<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Grants editor rights, as a successful login does.
    pub fn grant(&self) -> Result<(), String> {
        self.repo
            .set(EDITOR_FLAG_KEY, "true")
            .map_err(|err| err.to_string())?;
        info!("event=auth_login module=auth status=ok");
        Ok(())
    }
}

impl<R: KeyValueRepository> AuthProvider for StoredEditorFlag<R> {
    fn is_editor(&self) -> bool {
        match self.repo.get(EDITOR_FLAG_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                warn!("event=auth_read module=auth status=error error={err}");
                false
            }
        }
    }

    fn logout(&self) -> Result<(), String> {
        self.repo
            .remove(EDITOR_FLAG_KEY)
            .map_err(|err| err.to_string())?;
        info!("event=auth_logout module=auth status=ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{StoredEditorFlag, EDITOR_FLAG_KEY};
    use crate::repo::kv_repo::{KeyValueRepository, SqliteKeyValueRepository};
    use crate::ui::AuthProvider;
    use std::rc::Rc;

    #[test]
    fn only_literal_true_grants_editor() {
        let repo = Rc::new(SqliteKeyValueRepository::in_memory().expect("repo"));
        let flag = StoredEditorFlag::new(Rc::clone(&repo));
        assert!(!flag.is_editor());

        repo.set(EDITOR_FLAG_KEY, "yes").expect("set");
        assert!(!flag.is_editor());

        flag.grant().expect("grant");
        assert!(flag.is_editor());
    }

    #[test]
    fn logout_clears_flag() {
        let flag = StoredEditorFlag::new(SqliteKeyValueRepository::in_memory().expect("repo"));
        flag.grant().expect("grant");
        flag.logout().expect("logout");
        assert!(!flag.is_editor());
        flag.logout().expect("second logout is harmless");
    }
}
