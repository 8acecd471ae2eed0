use std::path::PathBuf;

use color_eyre::eyre::Result;
use heed::{Database, Env, EnvOpenOptions, types::*};
use serde::{Deserialize, Serialize};

use crate::config::get_data_dir;

const SESSION_KEY: &str = "session";

/// What is restored on the next start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub wallet_address: Option<String>,
    pub jetton_master: Option<String>,
}

/// LMDB-backed storage, one environment per network.
#[derive(Clone)]
pub struct Store {
    env: Env,
}

impl Store {
    pub fn new(network: &str) -> Result<Self> {
        Self::with_path(get_data_dir().join(network).join("session.mdb"))
    }

    pub fn with_path(path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&path)?;
        // SAFETY: the environment is opened once per path by this process
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(10 * 1024 * 1024) // 10MB
                .max_dbs(4)
                .open(path)?
        };
        Ok(Self { env })
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.save_metadata(SESSION_KEY, session)
    }

    pub fn load_session(&self) -> Result<Session> {
        Ok(self.load_metadata(SESSION_KEY)?.unwrap_or_default())
    }

    pub fn save_metadata<T: Serialize + 'static>(&self, key: &str, value: &T) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db: Database<Str, SerdeRmp<T>> =
            self.env.create_database(&mut wtxn, Some("metadata"))?;
        db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn load_metadata<T: for<'de> Deserialize<'de> + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        let rtxn = self.env.read_txn()?;
        let db: Option<Database<Str, SerdeRmp<T>>> =
            self.env.open_database(&rtxn, Some("metadata"))?;

        match db {
            Some(db) => Ok(db.get(&rtxn, key)?),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = Store::with_path(dir.path().join("session.mdb")).unwrap();
        assert_eq!(store.load_session().unwrap(), Session::default());

        let session = Session {
            wallet_address: Some("0:".to_string() + &"ab".repeat(32)),
            jetton_master: Some("EQBvW8Z5huBkMJYdnfAEM5JqTNkuWX3diqYENkWsIL0XggGG".to_string()),
        };
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().unwrap(), session);
    }
}
