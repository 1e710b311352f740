//! In-memory account store for tests

use labgest_core::{Account, AccountStore, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<i64, (Account, Vec<String>)>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, account: Account, profiles: Vec<String>) {
        let mut accounts = self.accounts.lock().expect("account lock poisoned");
        accounts.insert(account.id, (account, profiles));
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().expect("account lock poisoned");
        Ok(accounts
            .values()
            .find(|(account, _)| account.email == email)
            .map(|(account, _)| account.clone()))
    }

    async fn profiles_for_user(&self, user_id: i64) -> Result<Vec<String>> {
        let accounts = self.accounts.lock().expect("account lock poisoned");
        Ok(accounts
            .get(&user_id)
            .map(|(_, profiles)| profiles.clone())
            .unwrap_or_default())
    }

    async fn set_password(&self, user_id: i64, password_hash: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().expect("account lock poisoned");
        if let Some((account, _)) = accounts.get_mut(&user_id) {
            account.password_hash = password_hash.to_string();
        }
        Ok(())
    }
}
