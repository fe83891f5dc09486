use crate::backend::{UserDirectory, HOME_FOLDER};
use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Users are the directories of the data directory that hold a `files` tree.
#[derive(Debug, Clone)]
pub struct DataDirUsers {
    data_dir: PathBuf,
}

impl DataDirUsers {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn home(&self, user: &str) -> PathBuf {
        self.data_dir.join(user).join(HOME_FOLDER)
    }
}

/// A user id must be exactly one plain path component.
fn is_valid_user_id(user: &str) -> bool {
    let mut components = Path::new(user).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == user
    )
}

impl UserDirectory for DataDirUsers {
    fn exists(&self, user: &str) -> Result<bool, Error> {
        Ok(is_valid_user_id(user) && self.home(user).is_dir())
    }

    fn users(&self) -> Result<Vec<String>, Error> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut users = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if entry.path().join(HOME_FOLDER).is_dir() {
                users.push(name);
            }
        }
        users.sort();
        Ok(users)
    }
}
