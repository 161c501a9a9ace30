// The credential store shipped with the dashboard: a JSON list of users.

use serde::Deserialize;

use crate::padron::*;

use voter_analytics::auth::{CredentialStore, StoredUser};

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum UserId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize, Debug, Clone)]
struct UserRow {
    id: UserId,
    name: String,
    /// Hex digest of the salted password.
    password: String,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> StoredUser {
        StoredUser {
            id: match row.id {
                UserId::Number(n) => n.to_string(),
                UserId::Text(s) => s,
            },
            name: row.name,
            password_hash: row.password,
        }
    }
}

/// Reads the users file at every lookup, so that edits are picked up
/// without restarting.
#[derive(Debug, Clone)]
pub struct JsonCredentialStore {
    path: String,
}

impl JsonCredentialStore {
    pub fn new(path: String) -> JsonCredentialStore {
        JsonCredentialStore { path }
    }

    fn read_users(&self) -> PadronResult<Vec<StoredUser>> {
        let contents = fs::read_to_string(&self.path).context(OpeningFileSnafu {
            path: self.path.clone(),
        })?;
        let rows: Vec<UserRow> = serde_json::from_str(&contents).context(ParsingJsonSnafu {
            path: self.path.clone(),
        })?;
        debug!("read_users: {} users in {}", rows.len(), self.path);
        Ok(rows.into_iter().map(StoredUser::from).collect())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn find_user(&self, username: &str) -> Result<Option<StoredUser>, String> {
        let users = self.read_users().map_err(|e| e.to_string())?;
        users.find_user(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voter_analytics::auth::{authenticate, hash_password, AuthError};

    fn write_tmp(name: &str, contents: &str) -> String {
        let dir = std::env::temp_dir().join(format!("padron-credentials-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let p = dir.join(name);
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn lookup() {
        let digest = hash_password("ana", "secreto", "sal");
        let js = format!(
            r#"[{{"id": 1, "name": "ana", "password": "{}"}}, {{"id": "b-2", "name": "beto", "password": "00"}}]"#,
            digest
        );
        let store = JsonCredentialStore::new(write_tmp("users.json", &js));
        let ana = store.find_user("ana").unwrap().unwrap();
        assert_eq!(ana.id, "1");
        assert_eq!(store.find_user("beto").unwrap().unwrap().id, "b-2");
        assert_eq!(store.find_user("carla").unwrap(), None);

        assert!(authenticate(&store, "ana", "secreto", "sal").is_ok());
        assert_eq!(
            authenticate(&store, "ana", "otro", "sal"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn missing_store() {
        let store = JsonCredentialStore::new("/nonexistent/users.json".to_string());
        let res = authenticate(&store, "ana", "secreto", "sal");
        assert!(matches!(res, Err(AuthError::StoreUnavailable(m)) if m.contains("users.json")));
    }
}
