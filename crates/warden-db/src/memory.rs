//! Process-local [`UserStore`].
//!
//! All state sits behind one async mutex, so every method is atomic with
//! respect to every other. Intended for embedding without a database and for
//! tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use warden_core::StoreError;
use warden_models::{NewUser, SignupMethod, User, UserCredentials, VerificationDetails};

use crate::store::UserStore;

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: Option<String>,
    refresh_token: String,
    verification: Option<VerificationDetails>,
    login_fingerprint: Option<String>,
    image: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_by_email<'a>(
    users: &'a HashMap<Uuid, UserRecord>,
    email: &str,
) -> Option<&'a UserRecord> {
    let email = email.to_lowercase();
    users.values().find(|r| r.user.email == email)
}

fn find_by_username<'a>(
    users: &'a HashMap<Uuid, UserRecord>,
    username: &str,
) -> Option<&'a UserRecord> {
    users.values().find(|r| r.user.username == username)
}

fn credentials(record: &UserRecord) -> UserCredentials {
    UserCredentials {
        id: record.user.id,
        password_hash: record.password_hash.clone(),
    }
}

fn record_mut(
    users: &mut HashMap<Uuid, UserRecord>,
    id: Uuid,
) -> Result<&mut UserRecord, StoreError> {
    users.get_mut(&id).ok_or(StoreError::NotFound)
}

fn record(users: &HashMap<Uuid, UserRecord>, id: Uuid) -> Result<&UserRecord, StoreError> {
    users.get(&id).ok_or(StoreError::NotFound)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn add_user(&self, user: NewUser) -> Result<Uuid, StoreError> {
        let mut users = self.users.lock().await;

        if find_by_username(&users, &user.username).is_some()
            || find_by_email(&users, &user.email).is_some()
        {
            return Err(StoreError::DuplicateKey);
        }

        let id = Uuid::new_v4();
        users.insert(
            id,
            UserRecord {
                user: User {
                    id,
                    username: user.username,
                    email: user.email.to_lowercase(),
                    role: user.role,
                    signup_method: user.signup_method,
                    is_verified: user.is_verified,
                    created_at: Utc::now(),
                },
                password_hash: user.password_hash,
                refresh_token: String::new(),
                verification: None,
                login_fingerprint: None,
                image: None,
            },
        );

        Ok(id)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.get(&id).map(|r| r.user.clone()))
    }

    async fn get_user_password_and_id_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_email(&users, email).map(credentials))
    }

    async fn get_user_password_and_id_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_username(&users, username).map(credentials))
    }

    async fn get_user_password_by_id(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.password_hash.clone())
    }

    async fn set_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn set_user_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if find_by_email(&users, email).is_some_and(|r| r.user.id != id) {
            return Err(StoreError::DuplicateKey);
        }
        record_mut(&mut users, id)?.user.email = email.to_lowercase();
        Ok(())
    }

    async fn set_username(&self, id: Uuid, username: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if find_by_username(&users, username).is_some_and(|r| r.user.id != id) {
            return Err(StoreError::DuplicateKey);
        }
        record_mut(&mut users, id)?.user.username = username.to_string();
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        users.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get_is_verified(&self, id: Uuid) -> Result<bool, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.user.is_verified)
    }

    async fn set_is_verified(&self, id: Uuid, verified: bool) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.user.is_verified = verified;
        Ok(())
    }

    async fn get_signup_method(&self, id: Uuid) -> Result<SignupMethod, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.user.signup_method)
    }

    async fn set_signup_method(&self, id: Uuid, method: SignupMethod) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.user.signup_method = method;
        Ok(())
    }

    async fn get_refresh_token(&self, id: Uuid) -> Result<String, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.refresh_token.clone())
    }

    async fn set_refresh_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.refresh_token = token.to_string();
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        let record = record_mut(&mut users, id)?;
        if current.is_empty() || record.refresh_token != current {
            return Ok(false);
        }
        record.refresh_token = next.to_string();
        Ok(true)
    }

    async fn set_user_verification_details(
        &self,
        id: Uuid,
        details: &VerificationDetails,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        let token_taken = users.values().any(|r| {
            r.user.id != id
                && r.verification
                    .as_ref()
                    .is_some_and(|v| v.token == details.token)
        });
        if token_taken {
            return Err(StoreError::DuplicateKey);
        }
        record_mut(&mut users, id)?.verification = Some(details.clone());
        Ok(())
    }

    async fn get_user_verification_details(
        &self,
        id: Uuid,
    ) -> Result<Option<VerificationDetails>, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.verification.clone())
    }

    async fn get_verification_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(Uuid, VerificationDetails)>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.values().find_map(|r| {
            r.verification
                .as_ref()
                .filter(|v| v.token == token)
                .map(|v| (r.user.id, v.clone()))
        }))
    }

    async fn clear_user_verification_details(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        let Some(record) = users.get_mut(&id) else {
            return Ok(false);
        };
        let matches = match (&record.verification, token) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(v), Some(token)) => v.token == token,
        };
        if matches {
            record.verification = None;
        }
        Ok(matches)
    }

    async fn get_login_fingerprint(&self, id: Uuid) -> Result<Option<String>, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.login_fingerprint.clone())
    }

    async fn set_login_fingerprint(&self, id: Uuid, fingerprint: &str) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.login_fingerprint = Some(fingerprint.to_string());
        Ok(())
    }

    async fn get_user_image(&self, id: Uuid) -> Result<Option<Vec<u8>>, StoreError> {
        let users = self.users.lock().await;
        Ok(record(&users, id)?.image.clone())
    }

    async fn set_user_image(&self, id: Uuid, image: &[u8]) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        record_mut(&mut users, id)?.image = Some(image.to_vec());
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_username(&users, username).is_some())
    }

    async fn user_exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_email(&users, email).is_some())
    }

    async fn get_user_id_by_username(&self, username: &str) -> Result<Option<Uuid>, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_username(&users, username).map(|r| r.user.id))
    }

    async fn get_user_id_by_email(&self, email: &str) -> Result<Option<Uuid>, StoreError> {
        let users = self.users.lock().await;
        Ok(find_by_email(&users, email).map(|r| r.user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warden_models::{Role, VerificationKind};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
            role: Role::User,
            signup_method: SignupMethod::Plain,
            is_verified: true,
        }
    }

    fn details(kind: VerificationKind, token: &str) -> VerificationDetails {
        VerificationDetails {
            kind,
            pending_value: String::new(),
            token: token.to_string(),
            expires_at: Utc::now() + Duration::minutes(15),
        }
    }

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let store = MemoryUserStore::new();
        store.add_user(new_user("alice", "alice@x.com")).await.unwrap();

        assert!(matches!(
            store.add_user(new_user("alice", "other@x.com")).await,
            Err(StoreError::DuplicateKey)
        ));
        assert!(matches!(
            store.add_user(new_user("bob", "ALICE@x.com")).await,
            Err(StoreError::DuplicateKey)
        ));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive_username_is_not() {
        let store = MemoryUserStore::new();
        let id = store.add_user(new_user("Alice", "Alice@X.com")).await.unwrap();

        let creds = store
            .get_user_password_and_id_by_email("ALICE@x.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.id, id);
        assert!(
            store
                .get_user_password_and_id_by_username("alice")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rotate_refresh_token_is_compare_and_swap() {
        let store = MemoryUserStore::new();
        let id = store.add_user(new_user("alice", "alice@x.com")).await.unwrap();
        store.set_refresh_token(id, "rt1").await.unwrap();

        assert!(store.rotate_refresh_token(id, "rt1", "rt2").await.unwrap());
        assert!(!store.rotate_refresh_token(id, "rt1", "rt3").await.unwrap());
        assert_eq!(store.get_refresh_token(id).await.unwrap(), "rt2");

        store.set_refresh_token(id, "").await.unwrap();
        assert!(!store.rotate_refresh_token(id, "", "rt4").await.unwrap());
    }

    #[tokio::test]
    async fn test_verification_slot_overwrite_and_conditional_clear() {
        let store = MemoryUserStore::new();
        let id = store.add_user(new_user("alice", "alice@x.com")).await.unwrap();

        store
            .set_user_verification_details(id, &details(VerificationKind::UpdateEmail, "t1"))
            .await
            .unwrap();
        store
            .set_user_verification_details(id, &details(VerificationKind::DeleteAccount, "t2"))
            .await
            .unwrap();

        assert!(store.get_verification_by_token("t1").await.unwrap().is_none());
        let (owner, found) = store.get_verification_by_token("t2").await.unwrap().unwrap();
        assert_eq!(owner, id);
        assert_eq!(found.kind, VerificationKind::DeleteAccount);

        assert!(!store.clear_user_verification_details(id, Some("t1")).await.unwrap());
        assert!(store.clear_user_verification_details(id, Some("t2")).await.unwrap());
        assert!(!store.clear_user_verification_details(id, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_verification_token_globally_unique() {
        let store = MemoryUserStore::new();
        let a = store.add_user(new_user("alice", "alice@x.com")).await.unwrap();
        let b = store.add_user(new_user("bob", "bob@x.com")).await.unwrap();

        store
            .set_user_verification_details(a, &details(VerificationKind::Signup, "same"))
            .await
            .unwrap();
        assert!(matches!(
            store
                .set_user_verification_details(b, &details(VerificationKind::Signup, "same"))
                .await,
            Err(StoreError::DuplicateKey)
        ));
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let store = MemoryUserStore::new();
        let id = store.add_user(new_user("alice", "alice@x.com")).await.unwrap();
        store
            .set_user_verification_details(id, &details(VerificationKind::DeleteAccount, "t"))
            .await
            .unwrap();

        store.delete_user(id).await.unwrap();

        assert!(store.get_user(id).await.unwrap().is_none());
        assert!(store.get_verification_by_token("t").await.unwrap().is_none());
        assert!(matches!(
            store.get_refresh_token(id).await,
            Err(StoreError::NotFound)
        ));
        assert!(!store.user_exists("alice").await.unwrap());
    }
}
