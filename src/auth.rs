// src/auth.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    error::{AppError, AuthError, StoreError},
    models::student::{Account, LoginForm, SignupForm},
    quiz::identity::{Identity, IdentityPublisher, IdentityWatch, identity_feed},
    storage::Store,
    utils::{
        hash::{hash_password, verify_password},
        ids::new_uid,
        jwt::sign_jwt,
    },
};

/// A successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub identity: Identity,
    pub token: String,
}

/// External authentication service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Creates the account and the student profile.
    async fn sign_up(&self, form: &SignupForm) -> Result<Identity, AuthError>;

    async fn sign_in(&self, form: &LoginForm) -> Result<SignedIn, AuthError>;
}

/// Authenticator backed by the application store: argon2 hashes in the
/// 'accounts' collection and HS256 session tokens.
pub struct LocalAuthenticator {
    store: Arc<dyn Store>,
    jwt_secret: String,
    jwt_expiration: u64,
}

impl LocalAuthenticator {
    pub fn new(store: Arc<dyn Store>, jwt_secret: String, jwt_expiration: u64) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_expiration,
        }
    }
}

fn unexpected(err: StoreError) -> AuthError {
    AuthError::Unexpected(err.to_string())
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn sign_up(&self, form: &SignupForm) -> Result<Identity, AuthError> {
        if self
            .store
            .find_account(&form.email)
            .await
            .map_err(unexpected)?
            .is_some()
        {
            return Err(AuthError::EmailInUse);
        }

        let identity = Identity::new(new_uid());
        let account = Account {
            identity: identity.to_string(),
            email: form.email.clone(),
            password_hash: hash_password(&form.password)?,
        };

        // Profile before account: a failed profile write leaves the email
        // free for a retry.
        self.store
            .put_student(&identity, &form.profile())
            .await
            .map_err(unexpected)?;

        self.store
            .insert_account(&account)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailInUse,
                other => unexpected(other),
            })?;

        tracing::info!(%identity, "student signed up");
        Ok(identity)
    }

    async fn sign_in(&self, form: &LoginForm) -> Result<SignedIn, AuthError> {
        let account = self
            .store
            .find_account(&form.email)
            .await
            .map_err(unexpected)?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&form.password, &account.password_hash)? {
            return Err(AuthError::InvalidCredential);
        }

        let identity = Identity::new(account.identity);
        let token = sign_jwt(&identity, &self.jwt_secret, self.jwt_expiration)?;

        Ok(SignedIn { identity, token })
    }
}

/// One client's authentication state.
///
/// Each client owns its identity feed, so subscribers only ever observe
/// the sign-ins and sign-outs made through that client.
pub struct AuthClient {
    auth: Arc<dyn Authenticator>,
    current: IdentityPublisher,
}

impl AuthClient {
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        let (current, _) = identity_feed();
        Self { auth, current }
    }

    /// Registers a student. The client stays signed out.
    pub async fn sign_up(&self, form: &SignupForm) -> Result<Identity, AuthError> {
        self.auth.sign_up(form).await
    }

    pub async fn sign_in(&self, form: &LoginForm) -> Result<SignedIn, AuthError> {
        let signed_in = self.auth.sign_in(form).await?;
        self.current.sign_in(signed_in.identity.clone());
        Ok(signed_in)
    }

    pub fn sign_out(&self) {
        self.current.sign_out();
    }

    /// Live view of who is signed in on this client.
    pub fn subscribe(&self) -> IdentityWatch {
        self.current.subscribe()
    }
}

/// The two shapes the sign-in page can submit, each with its own rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AuthForm {
    Login(LoginForm),
    Signup(SignupForm),
}

/// What a successful `AuthForm` submission produced.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    SignedUp(Identity),
    SignedIn(SignedIn),
}

impl AuthForm {
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            AuthForm::Login(form) => form.check(),
            AuthForm::Signup(form) => form.check(),
        }
    }

    /// Validates against the variant's schema, then runs its handler.
    pub async fn submit(&self, auth: &dyn Authenticator) -> Result<AuthOutcome, AppError> {
        self.validate()?;
        match self {
            AuthForm::Login(form) => Ok(AuthOutcome::SignedIn(auth.sign_in(form).await?)),
            AuthForm::Signup(form) => Ok(AuthOutcome::SignedUp(auth.sign_up(form).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::{
        models::{
            student::StudentProfile,
            submission::{SubmissionDraft, SubmissionRecord},
        },
        quiz::IdentityProvider,
        storage::{CreateOutcome, MemoryStore},
        utils::jwt::verify_jwt,
    };

    fn authenticator() -> (LocalAuthenticator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let auth = LocalAuthenticator::new(store.clone(), "secret".into(), 600);
        (auth, store)
    }

    fn signup() -> SignupForm {
        SignupForm {
            username: "asha".into(),
            roll_no: "CS1042".into(),
            email: "asha@example.com".into(),
            password: "hunter42!".into(),
            cpassword: "hunter42!".into(),
        }
    }

    fn login(password: &str) -> LoginForm {
        LoginForm {
            email: "asha@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (auth, store) = authenticator();

        let identity = auth.sign_up(&signup()).await.unwrap();
        let profile = store.get_student(&identity).await.unwrap().unwrap();
        assert_eq!(profile.roll_no, "CS1042");

        let signed_in = auth.sign_in(&login("hunter42!")).await.unwrap();
        assert_eq!(signed_in.identity, identity);
        assert_eq!(
            verify_jwt(&signed_in.token, "secret").unwrap().sub,
            identity.as_str()
        );
    }

    fn login_as(email: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: "hunter42!".into(),
        }
    }

    #[tokio::test]
    async fn test_each_client_sees_only_its_own_sign_in() {
        let (auth, _store) = authenticator();
        let auth: Arc<dyn Authenticator> = Arc::new(auth);

        let a = auth.sign_up(&signup()).await.unwrap();
        let mut other = signup();
        other.email = "ravi@example.com".into();
        let b = auth.sign_up(&other).await.unwrap();

        let client_a = AuthClient::new(auth.clone());
        let client_b = AuthClient::new(auth.clone());
        let watch_a = client_a.subscribe();
        let watch_b = client_b.subscribe();

        client_a.sign_in(&login_as("asha@example.com")).await.unwrap();
        client_b.sign_in(&login_as("ravi@example.com")).await.unwrap();

        assert_eq!(watch_a.current_identity(), Some(a));
        assert_eq!(watch_b.current_identity(), Some(b.clone()));

        client_a.sign_out();
        assert_eq!(watch_a.current_identity(), None);
        assert_eq!(watch_b.current_identity(), Some(b));
    }

    #[tokio::test]
    async fn test_client_sign_up_stays_signed_out() {
        let (auth, _store) = authenticator();
        let client = AuthClient::new(Arc::new(auth));
        let watch = client.subscribe();

        let identity = client.sign_up(&signup()).await.unwrap();
        assert_eq!(watch.current_identity(), None);

        client.sign_in(&login("hunter42!")).await.unwrap();
        assert_eq!(watch.current_identity(), Some(identity));

        // A failed sign-in leaves the feed alone.
        assert!(client.sign_in(&login("hunter43!")).await.is_err());
        assert!(watch.current_identity().is_some());
    }

    /// Delegates to a `MemoryStore` but refuses profile writes while `fail_profiles` is set.
    struct ProfileOutage {
        inner: MemoryStore,
        fail_profiles: AtomicBool,
    }

    #[async_trait]
    impl Store for ProfileOutage {
        async fn get_submission(
            &self,
            identity: &Identity,
        ) -> Result<Option<SubmissionRecord>, StoreError> {
            self.inner.get_submission(identity).await
        }
        async fn create_unless_locked(
            &self,
            draft: SubmissionDraft,
            lock_window: chrono::Duration,
        ) -> Result<CreateOutcome, StoreError> {
            self.inner.create_unless_locked(draft, lock_window).await
        }
        async fn delete_if_expired(&self, identity: &Identity) -> Result<bool, StoreError> {
            self.inner.delete_if_expired(identity).await
        }
        async fn purge_expired(&self) -> Result<u64, StoreError> {
            self.inner.purge_expired().await
        }
        async fn get_student(&self, identity: &Identity) -> Result<Option<StudentProfile>, StoreError> {
            self.inner.get_student(identity).await
        }
        async fn put_student(
            &self,
            identity: &Identity,
            profile: &StudentProfile,
        ) -> Result<(), StoreError> {
            if self.fail_profiles.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("profiles offline".into()));
            }
            self.inner.put_student(identity, profile).await
        }
        async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
            self.inner.insert_account(account).await
        }
        async fn find_account(&self, email: &str) -> Result<Option<Account>, StoreError> {
            self.inner.find_account(email).await
        }
    }

    #[tokio::test]
    async fn test_failed_profile_write_leaves_email_free() {
        let store = Arc::new(ProfileOutage {
            inner: MemoryStore::default(),
            fail_profiles: AtomicBool::new(true),
        });
        let auth = LocalAuthenticator::new(store.clone(), "secret".into(), 600);

        assert!(matches!(
            auth.sign_up(&signup()).await,
            Err(AuthError::Unexpected(_))
        ));
        assert!(store.find_account("asha@example.com").await.unwrap().is_none());

        store.fail_profiles.store(false, Ordering::SeqCst);
        let identity = auth.sign_up(&signup()).await.unwrap();
        assert!(store.get_student(&identity).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_auth_error_codes() {
        let (auth, _store) = authenticator();

        assert_eq!(
            auth.sign_in(&login("hunter42!")).await.unwrap_err(),
            AuthError::UserNotFound
        );

        auth.sign_up(&signup()).await.unwrap();
        assert_eq!(auth.sign_up(&signup()).await.unwrap_err(), AuthError::EmailInUse);
        assert_eq!(
            auth.sign_in(&login("hunter43!")).await.unwrap_err(),
            AuthError::InvalidCredential
        );
    }

    #[tokio::test]
    async fn test_form_variant_picks_schema() {
        let (auth, _store) = authenticator();

        // Valid as a login form, but signup requires more fields.
        let form: Result<AuthForm, _> = serde_json::from_value(serde_json::json!({
            "mode": "signup",
            "email": "asha@example.com",
            "password": "hunter42!"
        }));
        assert!(form.is_err());

        let mut short = signup();
        short.username = "as".into();
        assert!(matches!(
            AuthForm::Signup(short).submit(&auth).await,
            Err(AppError::BadRequest(_))
        ));

        let outcome = AuthForm::Signup(signup()).submit(&auth).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::SignedUp(_)));

        let form: AuthForm = serde_json::from_value(serde_json::json!({
            "mode": "login",
            "email": "asha@example.com",
            "password": "hunter42!"
        }))
        .unwrap();
        assert!(matches!(
            form.submit(&auth).await.unwrap(),
            AuthOutcome::SignedIn(_)
        ));
    }
}
