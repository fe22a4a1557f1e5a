//! Accounts, sessions and password management

use super::credentials::{self, PBKDF2_ITERATIONS};
use super::directory::{build_doctor, build_patient};
use crate::adapters::database::{AccountStore, CareStore, DatabaseClient};
use crate::config::SecurityConfig;
use crate::domain::{
    DoctorId, HospitalAdmin, HospitalAdminId, HospitalId, Language, PasswordResetToken, PatientId,
    ResetTokenId, Result, RoleProfile, SessionId, ShasthoError, TestAdmin, TestAdminId, User,
    UserId, UserRole, UserSession, UserStatus,
};
use crate::validation::{rules, FormData, ModelValidator};
use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::sync::Arc;
use zeroize::Zeroizing;

const INVALID_CREDENTIALS: &str = "Invalid username or password";
const INVALID_SESSION: &str = "Session expired or invalid";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

/// Caller identity resolved from a session token
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session_id: SessionId,
}

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

/// Result of a successful login; `token` is only ever returned here
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Freshly issued password reset token
#[derive(Debug, Clone)]
pub struct ResetIssued {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Fails with `Forbidden` unless `user` holds one of `roles`
pub fn require_role(user: &User, roles: &[UserRole]) -> Result<()> {
    if roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ShasthoError::Forbidden(format!(
            "Role '{}' may not access this resource",
            user.role
        )))
    }
}

pub struct AuthService {
    db: Arc<dyn DatabaseClient>,
    session_lifetime: Duration,
    reset_token_lifetime: Duration,
    password_min_length: usize,
    hash_iterations: u32,
    token_key: Zeroizing<Vec<u8>>,
}

impl AuthService {
    pub fn new(db: Arc<dyn DatabaseClient>, security: &SecurityConfig) -> Self {
        Self {
            db,
            session_lifetime: Duration::hours(security.session_lifetime_hours),
            reset_token_lifetime: Duration::hours(security.reset_token_lifetime_hours),
            password_min_length: security.password_min_length,
            hash_iterations: PBKDF2_ITERATIONS,
            token_key: Zeroizing::new(
                security
                    .secret_key
                    .expose_secret()
                    .as_str()
                    .as_bytes()
                    .to_vec(),
            ),
        }
    }

    /// Digest under which a bearer or reset token is stored
    fn digest(&self, token: &str) -> Result<String> {
        credentials::token_digest(&self.token_key, token)
    }

    /// Overrides the PBKDF2 work factor for newly hashed passwords
    pub fn with_hash_iterations(mut self, iterations: u32) -> Self {
        self.hash_iterations = iterations.max(1);
        self
    }

    fn role_rules(role: UserRole) -> Option<ModelValidator> {
        match role {
            UserRole::Patient => Some(rules::patient()),
            UserRole::Doctor => Some(rules::doctor()),
            UserRole::HospitalAdmin => Some(rules::hospital_admin()),
            UserRole::TestAdmin => Some(rules::test_admin()),
            _ => None,
        }
    }

    /// Creates a login account together with its role profile
    ///
    /// Doctors and both kinds of administrator start `inactive` until an
    /// administrator approves them.
    pub async fn register(&self, role: UserRole, form: &FormData) -> Result<User> {
        let mut errors = rules::registration(self.password_min_length).validate(form);
        if let Some(role_rules) = Self::role_rules(role) {
            errors.absorb(role_rules.validate(form));
        }
        errors.into_result()?;

        let username = form.require("username")?.to_lowercase();
        if self.db.find_user_by_username(&username).await?.is_some() {
            return Err(ShasthoError::Conflict(format!(
                "Username '{username}' is already registered"
            )));
        }

        let hospital_id = match role {
            UserRole::HospitalAdmin | UserRole::TestAdmin => {
                let id: HospitalId = form.parse_required("hospital_id")?;
                if self.db.get_hospital(id).await?.is_none() {
                    return Err(ShasthoError::invalid_field(
                        "hospital_id",
                        "Selected hospital does not exist",
                    ));
                }
                Some(id)
            }
            _ => None,
        };

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username,
            password_hash: credentials::hash_password(
                form.require("password")?,
                self.hash_iterations,
            ),
            role,
            status: if role.requires_approval() {
                UserStatus::Inactive
            } else {
                UserStatus::Active
            },
            full_name: form.require("full_name")?.to_string(),
            language: form.parse("language")?.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        // Profile is built before the account is stored so a bad field leaves nothing behind
        let profile = match role {
            UserRole::Patient => RoleProfile::Patient(build_patient(
                form,
                PatientId::new(),
                Some(user.id),
                now,
            )?),
            UserRole::Doctor => {
                let doctor = build_doctor(form, DoctorId::new(), Some(user.id), now)?;
                super::directory::DirectoryService::new(self.db.clone())
                    .ensure_assignment(&doctor)
                    .await?;
                RoleProfile::Doctor(doctor)
            }
            UserRole::HospitalAdmin => RoleProfile::HospitalAdmin(HospitalAdmin {
                id: HospitalAdminId::new(),
                user_id: user.id,
                full_name: user.full_name.clone(),
                hospital_id: hospital_id.ok_or_else(|| ShasthoError::required("hospital_id"))?,
                contact_number: form.require("contact_number")?.to_string(),
                created_at: now,
                updated_at: now,
            }),
            UserRole::TestAdmin => RoleProfile::TestAdmin(TestAdmin {
                id: TestAdminId::new(),
                user_id: user.id,
                full_name: user.full_name.clone(),
                hospital_id: hospital_id.ok_or_else(|| ShasthoError::required("hospital_id"))?,
                contact_number: form.require("contact_number")?.to_string(),
                department: form.get_string("department"),
                qualification: form.get_string("qualification"),
                created_at: now,
                updated_at: now,
            }),
            _ => RoleProfile::None,
        };

        self.db.insert_user_with_profile(&user, &profile).await?;

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            status = %user.status,
            "User registered"
        );
        Ok(user)
    }

    /// Creates an active system administrator account
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User> {
        let form = FormData::new()
            .with("username", username)
            .with("password", password)
            .with("full_name", full_name);
        let user = self.register(UserRole::Admin, &form).await?;
        tracing::info!(user_id = %user.id, "Administrator account created");
        Ok(user)
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Result<LoginOutcome> {
        let username = username.trim().to_lowercase();
        let Some(user) = self.db.find_user_by_username(&username).await? else {
            crate::log_request_rejected!("/api/auth/login", "unknown username");
            return Err(ShasthoError::Authentication(INVALID_CREDENTIALS.to_string()));
        };
        if !credentials::verify_password(password, &user.password_hash)? {
            crate::log_request_rejected!("/api/auth/login", "wrong password");
            return Err(ShasthoError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        match user.status {
            UserStatus::Active => {}
            UserStatus::Inactive => {
                return Err(ShasthoError::Forbidden(
                    "Your account is pending approval".to_string(),
                ))
            }
            UserStatus::Suspended => {
                return Err(ShasthoError::Forbidden(
                    "Your account has been suspended".to_string(),
                ))
            }
        }

        let token = credentials::session_token();
        let now = Utc::now();
        let session = UserSession {
            id: SessionId::new(),
            user_id: user.id,
            token_hash: self.digest(&token)?,
            user_agent,
            ip_address,
            expires_at: now + self.session_lifetime,
            ended_at: None,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_session(&session).await?;
        tracing::info!(user_id = %user.id, session_id = %session.id, "User signed in");

        Ok(LoginOutcome {
            token,
            expires_at: session.expires_at,
            user,
        })
    }

    /// Resolves a bearer token to a live session of an active user
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let invalid = || ShasthoError::Authentication(INVALID_SESSION.to_string());
        let session = self
            .db
            .find_session_by_token_hash(&self.digest(token)?)
            .await?
            .ok_or_else(invalid)?;
        if !session.is_live_at(Utc::now()) {
            return Err(invalid());
        }
        let user = self.db.get_user(session.user_id).await?.ok_or_else(invalid)?;
        if !user.is_active() {
            return Err(invalid());
        }
        Ok(AuthenticatedUser {
            user,
            session_id: session.id,
        })
    }

    pub async fn logout(&self, auth: &AuthenticatedUser) -> Result<()> {
        self.db.end_session(auth.session_id, Utc::now()).await?;
        tracing::info!(user_id = %auth.id(), "User signed out");
        Ok(())
    }

    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<UserSession>> {
        self.db.list_sessions(user_id).await
    }

    /// Ends one of the caller's own sessions
    pub async fn terminate_session(&self, user_id: UserId, session_id: SessionId) -> Result<()> {
        let owned = self
            .db
            .list_sessions(user_id)
            .await?
            .iter()
            .any(|s| s.id == session_id);
        if !owned {
            return Err(ShasthoError::NotFound(format!(
                "Session {session_id} not found"
            )));
        }
        self.db.end_session(session_id, Utc::now()).await?;
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| ShasthoError::NotFound(format!("User {user_id} not found")))
    }

    fn check_new_password(&self, field: &str, password: &str) -> Result<()> {
        if password.chars().count() < self.password_min_length {
            return Err(ShasthoError::invalid_field(
                field,
                format!(
                    "Must be at least {} characters",
                    self.password_min_length
                ),
            ));
        }
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new_password: &str,
    ) -> Result<()> {
        let mut user = self.get_user(user_id).await?;
        if !credentials::verify_password(current, &user.password_hash)? {
            return Err(ShasthoError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }
        self.check_new_password("new_password", new_password)?;
        user.password_hash = credentials::hash_password(new_password, self.hash_iterations);
        user.updated_at = Utc::now();
        self.db.update_user(&user).await?;
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Issues a reset token; `None` when no such account exists
    pub async fn request_reset(&self, username: &str) -> Result<Option<ResetIssued>> {
        let username = username.trim().to_lowercase();
        let Some(user) = self.db.find_user_by_username(&username).await? else {
            return Ok(None);
        };

        let token = credentials::reset_token();
        let now = Utc::now();
        let record = PasswordResetToken {
            id: ResetTokenId::new(),
            user_id: user.id,
            token_hash: self.digest(&token)?,
            expires_at: now + self.reset_token_lifetime,
            used: false,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_reset_token(&record).await?;
        tracing::info!(user_id = %user.id, "Password reset token issued");

        Ok(Some(ResetIssued {
            token,
            expires_at: record.expires_at,
        }))
    }

    pub async fn verify_reset(&self, token: &str) -> Result<PasswordResetToken> {
        let record = self
            .db
            .find_reset_token(&self.digest(token)?)
            .await?
            .filter(|r| r.is_valid_at(Utc::now()))
            .ok_or_else(|| ShasthoError::Authentication(INVALID_RESET_TOKEN.to_string()))?;
        Ok(record)
    }

    /// Sets a new password, burns the token and ends every live session
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.check_new_password("password", new_password)?;
        let record = self.verify_reset(token).await?;
        let mut user = self.get_user(record.user_id).await?;

        // Only one reset may claim a given token
        let now = Utc::now();
        if !self.db.mark_reset_token_used(&record.token_hash, now).await? {
            return Err(ShasthoError::Authentication(INVALID_RESET_TOKEN.to_string()));
        }

        user.password_hash = credentials::hash_password(new_password, self.hash_iterations);
        user.updated_at = now;
        self.db.update_user(&user).await?;

        for session in self.db.list_sessions(user.id).await? {
            if session.ended_at.is_none() {
                self.db.end_session(session.id, now).await?;
            }
        }
        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    pub async fn change_language(&self, user_id: UserId, language: Language) -> Result<User> {
        let mut user = self.get_user(user_id).await?;
        user.language = language;
        user.updated_at = Utc::now();
        self.db.update_user(&user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{Hospital, HospitalId};

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let db = Arc::new(MemoryStore::new());
        let svc = AuthService::new(db.clone(), &SecurityConfig::default()).with_hash_iterations(10);
        (svc, db)
    }

    fn patient_form(username: &str) -> FormData {
        FormData::new()
            .with("username", username)
            .with("password", "s3cure-pass")
            .with("full_name", "Nadia Rahman")
            .with("date_of_birth", "1990-05-14")
            .with("gender", "female")
            .with("contact_number", "+8801712345678")
            .with("address", "House 12, Road 5, Dhanmondi")
            .with("emergency_contact_name", "Karim Rahman")
            .with("emergency_contact_number", "01812345678")
    }

    async fn hospital(db: &MemoryStore) -> HospitalId {
        let now = Utc::now();
        let hospital = Hospital {
            id: HospitalId::new(),
            name: "Dhaka Medical College Hospital".into(),
            address: "Secretariat Road".into(),
            city: "Dhaka".into(),
            state: "Dhaka".into(),
            postal_code: "1000".into(),
            phone: "+8802556677".into(),
            email: None,
            website: None,
            created_at: now,
            updated_at: now,
        };
        db.insert_hospital(&hospital).await.unwrap();
        hospital.id
    }

    #[tokio::test]
    async fn test_patient_registration_creates_active_user_and_profile() {
        let (svc, db) = service();
        let user = svc
            .register(UserRole::Patient, &patient_form("Nadia@Example.com"))
            .await
            .unwrap();
        assert_eq!(user.username, "nadia@example.com");
        assert_eq!(user.status, UserStatus::Active);
        let patient = db.find_patient_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(patient.full_name, "Nadia Rahman");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (svc, _) = service();
        svc.register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let err = svc
            .register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_registration_reports_every_missing_field() {
        let (svc, _) = service();
        let err = svc
            .register(
                UserRole::Patient,
                &FormData::new().with("username", "not-an-email"),
            )
            .await
            .unwrap_err();
        let ShasthoError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.message_for("username"), Some("Invalid email format"));
        assert_eq!(errors.message_for("password"), Some("This field is required"));
        assert_eq!(errors.message_for("gender"), Some("This field is required"));
    }

    #[tokio::test]
    async fn test_test_admin_starts_inactive_and_cannot_log_in() {
        let (svc, db) = service();
        let hospital_id = hospital(&db).await;
        let form = FormData::new()
            .with("username", "lab@example.com")
            .with("password", "s3cure-pass")
            .with("full_name", "Rafiq Islam")
            .with("hospital_id", hospital_id.to_string())
            .with("contact_number", "01712345678");
        let user = svc.register(UserRole::TestAdmin, &form).await.unwrap();
        assert_eq!(user.status, UserStatus::Inactive);
        assert!(db.find_test_admin_by_user(user.id).await.unwrap().is_some());

        let err = svc
            .login("lab@example.com", "s3cure-pass", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_login_authenticate_logout() {
        let (svc, _) = service();
        svc.register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();

        let bad = svc
            .login("nadia@example.com", "wrong-pass", None, None)
            .await
            .unwrap_err();
        assert_eq!(
            bad.to_string(),
            "Authentication error: Invalid username or password"
        );

        let outcome = svc
            .login("nadia@example.com", "s3cure-pass", None, None)
            .await
            .unwrap();
        let auth = svc.authenticate(&outcome.token).await.unwrap();
        assert_eq!(auth.role(), UserRole::Patient);

        svc.logout(&auth).await.unwrap();
        assert!(svc.authenticate(&outcome.token).await.is_err());
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let (svc, _) = service();
        svc.register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let session = svc
            .login("nadia@example.com", "s3cure-pass", None, None)
            .await
            .unwrap();

        assert!(svc.request_reset("nobody@example.com").await.unwrap().is_none());
        let issued = svc
            .request_reset("nadia@example.com")
            .await
            .unwrap()
            .unwrap();
        svc.verify_reset(&issued.token).await.unwrap();
        svc.reset_password(&issued.token, "brand-new-pass")
            .await
            .unwrap();

        // token is single use and old sessions are gone
        assert!(svc.verify_reset(&issued.token).await.is_err());
        assert!(svc.authenticate(&session.token).await.is_err());
        svc.login("nadia@example.com", "brand-new-pass", None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_racing_resets_with_one_token_only_one_wins() {
        let (svc, _) = service();
        svc.register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let issued = svc
            .request_reset("nadia@example.com")
            .await
            .unwrap()
            .unwrap();

        let (first, second) = tokio::join!(
            svc.reset_password(&issued.token, "first-new-pass"),
            svc.reset_password(&issued.token, "second-new-pass"),
        );
        assert!(first.is_ok() != second.is_ok());
        let loser = first.err().or(second.err()).unwrap();
        assert_eq!(loser.to_string(), format!("Authentication error: {INVALID_RESET_TOKEN}"));
    }

    #[tokio::test]
    async fn test_claimed_token_rejects_late_reset() {
        let (svc, db) = service();
        svc.register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let issued = svc
            .request_reset("nadia@example.com")
            .await
            .unwrap()
            .unwrap();
        let digest = svc.digest(&issued.token).unwrap();

        // another reset claims the token after this one has verified it
        svc.verify_reset(&issued.token).await.unwrap();
        assert!(db.mark_reset_token_used(&digest, Utc::now()).await.unwrap());

        let err = svc
            .reset_password(&issued.token, "brand-new-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Authentication(_)));
        svc.login("nadia@example.com", "s3cure-pass", None, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (svc, db) = service();
        let user = svc
            .register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let token = credentials::session_token();
        let now = Utc::now();
        db.insert_session(&UserSession {
            id: SessionId::new(),
            user_id: user.id,
            token_hash: svc.digest(&token).unwrap(),
            user_agent: None,
            ip_address: None,
            expires_at: now - Duration::minutes(1),
            ended_at: None,
            created_at: now - Duration::hours(25),
            updated_at: now - Duration::hours(25),
        })
        .await
        .unwrap();

        let err = svc.authenticate(&token).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Authentication error: {INVALID_SESSION}")
        );
    }

    #[tokio::test]
    async fn test_terminate_session_only_touches_own_sessions() {
        let (svc, _) = service();
        let nadia = svc
            .register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        svc.register(UserRole::Patient, &patient_form("arif@example.com"))
            .await
            .unwrap();
        let nadia_login = svc
            .login("nadia@example.com", "s3cure-pass", None, None)
            .await
            .unwrap();
        let arif_login = svc
            .login("arif@example.com", "s3cure-pass", None, None)
            .await
            .unwrap();
        let arif_session = svc.authenticate(&arif_login.token).await.unwrap().session_id;

        let err = svc
            .terminate_session(nadia.id, arif_session)
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::NotFound(_)));
        assert!(svc.authenticate(&arif_login.token).await.is_ok());

        let nadia_session = svc.authenticate(&nadia_login.token).await.unwrap().session_id;
        svc.terminate_session(nadia.id, nadia_session).await.unwrap();
        assert!(svc.authenticate(&nadia_login.token).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_profile_insert_leaves_no_account() {
        let (svc, db) = service();
        let hospital_id = hospital(&db).await;
        let form = FormData::new()
            .with("username", "lab@example.com")
            .with("password", "s3cure-pass")
            .with("full_name", "Rafiq Islam")
            .with("hospital_id", hospital_id.to_string())
            .with("contact_number", "01712345678");
        let user = User {
            id: UserId::new(),
            username: "lab@example.com".into(),
            password_hash: "x".into(),
            role: UserRole::TestAdmin,
            status: UserStatus::Inactive,
            full_name: "Rafiq Islam".into(),
            language: Language::English,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let orphan = RoleProfile::TestAdmin(TestAdmin {
            id: TestAdminId::new(),
            user_id: user.id,
            full_name: user.full_name.clone(),
            hospital_id: HospitalId::new(),
            contact_number: "01712345678".into(),
            department: None,
            qualification: None,
            created_at: user.created_at,
            updated_at: user.created_at,
        });

        let err = db.insert_user_with_profile(&user, &orphan).await.unwrap_err();
        assert!(matches!(err, ShasthoError::NotFound(_)));
        assert!(db
            .find_user_by_username("lab@example.com")
            .await
            .unwrap()
            .is_none());

        // the username is still free for a valid registration
        svc.register(UserRole::TestAdmin, &form).await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let (svc, _) = service();
        let user = svc
            .register(UserRole::Patient, &patient_form("nadia@example.com"))
            .await
            .unwrap();
        let err = svc
            .change_password(user.id, "nope", "another-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Authentication(_)));
        let err = svc
            .change_password(user.id, "s3cure-pass", "short")
            .await
            .unwrap_err();
        assert!(matches!(err, ShasthoError::Validation(_)));
        svc.change_password(user.id, "s3cure-pass", "another-pass")
            .await
            .unwrap();
    }

    #[test]
    fn test_require_role() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: "dr@example.com".into(),
            password_hash: String::new(),
            role: UserRole::Doctor,
            status: UserStatus::Active,
            full_name: "Dr. Farhana Akter".into(),
            language: Language::English,
            created_at: now,
            updated_at: now,
        };
        assert!(require_role(&user, &[UserRole::Doctor, UserRole::Admin]).is_ok());
        assert!(matches!(
            require_role(&user, &[UserRole::Patient]),
            Err(ShasthoError::Forbidden(_))
        ));
    }
}
