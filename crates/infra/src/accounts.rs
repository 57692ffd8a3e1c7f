//! Account workflows: signup, login, admin request review, admin bootstrap.
//!
//! This is the orchestration boundary. Every collaborator failure is logged
//! here with full detail and surfaced as a typed error whose
//! `user_message()` never leaks that detail.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use rolegate_auth::{
    AdminRequest, DeniedReason, Destination, Password, Profile, RequestStatus, ReviewDecision,
    Role, SessionContext, SignupForm, ValidationErrors, WorkflowError, resolve_login_destination,
    resolve_signup_role, resolve_stored_role,
};
use rolegate_core::{Email, UserUid};

use crate::directory::{DirectoryStore, StoreError};
use crate::identity::{IdentityError, IdentityProvider};

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const BAD_LOGIN: &str = "Invalid email or password.";

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes and errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    /// Student or lecturer; can log in right away.
    Active { uid: UserUid, role: Role },
    /// Admin nomination recorded for review.
    PendingReview { uid: UserUid },
}

impl SignupOutcome {
    pub fn uid(&self) -> UserUid {
        match self {
            SignupOutcome::Active { uid, .. } | SignupOutcome::PendingReview { uid } => *uid,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            SignupOutcome::Active { .. } => "Account created successfully. Please log in.",
            SignupOutcome::PendingReview { .. } => "Account created. Admin request submitted for review.",
        }
    }
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("identity lookup failed: {0}")]
    IdentityLookupFailed(IdentityError),

    #[error("identity creation failed: {0}")]
    IdentityCreationFailed(IdentityError),

    #[error("profile write failed: {0}")]
    ProfileWriteFailed(StoreError),
}

impl SignupError {
    pub fn user_message(&self) -> String {
        match self {
            SignupError::Validation(e) => e.user_message(),
            SignupError::DuplicateAccount => {
                "An account with that email already exists. Please log in.".to_string()
            }
            SignupError::IdentityLookupFailed(_)
            | SignupError::IdentityCreationFailed(_)
            | SignupError::ProfileWriteFailed(_) => "Registration failed. Please try again.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub session: SessionContext,
    pub destination: Destination,
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("account not found")]
    AccountNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    /// Identity exists but has no profile (data-integrity fault).
    #[error("profile missing for {0}")]
    ProfileMissing(UserUid),

    #[error("login denied: {0:?}")]
    Denied(DeniedReason),

    #[error("login backend failure: {0}")]
    Unavailable(String),
}

impl LoginError {
    /// Not-found, wrong password and missing profile read the same to the
    /// user so the form cannot be used to discover which accounts exist.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoginError::AccountNotFound | LoginError::InvalidCredentials | LoginError::ProfileMissing(_) => BAD_LOGIN,
            LoginError::Denied(reason) => reason.user_message(),
            LoginError::Unavailable(_) => GENERIC_FAILURE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("no admin request for {0}")]
    NotFound(UserUid),

    #[error("admin request is already {0}")]
    NotPending(RequestStatus),

    #[error("reviewer {0} cannot review their own request")]
    SelfReview(UserUid),

    #[error("review store failure: {0}")]
    Store(StoreError),
}

impl ReviewError {
    pub fn user_message(&self, decision: ReviewDecision) -> &'static str {
        match (self, decision) {
            (ReviewError::NotFound(_), _) => "Admin request not found.",
            (ReviewError::NotPending(_), _) => "That request has already been reviewed.",
            (ReviewError::SelfReview(_), _) => "You cannot review your own request.",
            (ReviewError::Store(_), ReviewDecision::Approve) => "Could not approve user.",
            (ReviewError::Store(_), ReviewDecision::Reject) => "Could not reject request.",
        }
    }
}

impl From<WorkflowError> for ReviewError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::NotPending { status, .. } => ReviewError::NotPending(status),
            other => ReviewError::Store(StoreError::Backend(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn DirectoryStore>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn DirectoryStore>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            identity,
            directory,
            session_ttl,
        }
    }

    pub fn directory(&self) -> &Arc<dyn DirectoryStore> {
        &self.directory
    }

    /// Register a new account.
    ///
    /// Steps: validate, duplicate check, create identity, then write the
    /// profile (and admin request) as one unit. A failed profile write
    /// deletes the identity it just created.
    #[instrument(skip(self, form), fields(email = %form.email.trim(), role = %form.role))]
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupOutcome, SignupError> {
        let valid = form.validate(Utc::now().date_naive())?;

        match self.identity.find_by_email(&valid.email).await {
            Ok(Some(_)) => return Err(SignupError::DuplicateAccount),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "signup: identity lookup failed");
                return Err(SignupError::IdentityLookupFailed(e));
            }
        }

        let identity = match self.identity.create(&valid.email, &valid.password).await {
            Ok(identity) => identity,
            Err(IdentityError::AlreadyExists) => return Err(SignupError::DuplicateAccount),
            Err(e) => {
                error!(error = %e, "signup: identity creation failed");
                return Err(SignupError::IdentityCreationFailed(e));
            }
        };

        let decision = resolve_signup_role(valid.requested_role);
        let now = Utc::now();
        let profile = Profile {
            uid: identity.uid,
            email: valid.email.clone(),
            role: decision.stored_role,
            gender: Some(valid.gender),
            date_of_birth: Some(valid.date_of_birth),
            created_at: now,
        };
        let request = decision
            .needs_admin_request
            .then(|| AdminRequest::pending(identity.uid, valid.email.clone(), now));

        if let Err(e) = self.directory.create_profile(profile, request).await {
            error!(uid = %identity.uid, error = %e, "signup: profile write failed");
            self.discard_orphan(identity.uid).await;
            return Err(SignupError::ProfileWriteFailed(e));
        }

        self.log_verification_link(&valid.email).await;

        let outcome = if decision.needs_admin_request {
            SignupOutcome::PendingReview { uid: identity.uid }
        } else {
            SignupOutcome::Active {
                uid: identity.uid,
                role: decision.stored_role,
            }
        };
        info!(uid = %identity.uid, role = %decision.stored_role, "signup: account created");
        Ok(outcome)
    }

    async fn discard_orphan(&self, uid: UserUid) {
        match self.identity.delete(uid).await {
            Ok(()) => warn!(uid = %uid, "signup: removed identity left without a profile"),
            Err(e) => error!(uid = %uid, error = %e, "signup: orphaned identity could not be removed"),
        }
    }

    async fn log_verification_link(&self, email: &Email) {
        match self.identity.email_verification_link(email).await {
            Ok(link) => info!(email = %email, link = %link, "signup: email verification link issued"),
            Err(e) => warn!(email = %email, error = %e, "signup: could not generate verification link"),
        }
    }

    /// Authenticate and resolve the landing page. No session is produced for
    /// pending or rejected nominations.
    #[instrument(skip(self, password), fields(email = %email.trim()))]
    pub async fn login(&self, email: &str, password: &Password) -> Result<LoginSuccess, LoginError> {
        let email = Email::parse(email).map_err(|_| LoginError::AccountNotFound)?;

        let identity = match self.identity.verify_password(&email, password).await {
            Ok(identity) => identity,
            Err(IdentityError::NotFound) => return Err(LoginError::AccountNotFound),
            Err(IdentityError::InvalidCredentials) => return Err(LoginError::InvalidCredentials),
            Err(e) => {
                error!(error = %e, "login: identity provider failure");
                return Err(LoginError::Unavailable(e.to_string()));
            }
        };

        let profile = match self.directory.get_profile(identity.uid).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(uid = %identity.uid, "login: identity has no profile");
                return Err(LoginError::ProfileMissing(identity.uid));
            }
            Err(StoreError::UnrecognizedRole { uid, role }) => {
                warn!(uid = %uid, role = %role, "login: stored role not recognised");
                let reason = resolve_stored_role(&role).err().unwrap_or(DeniedReason::Unauthorized);
                return Err(LoginError::Denied(reason));
            }
            Err(e) => {
                error!(uid = %identity.uid, error = %e, "login: profile read failed");
                return Err(LoginError::Unavailable(e.to_string()));
            }
        };

        let destination = resolve_login_destination(profile.role).map_err(|reason| {
            info!(uid = %profile.uid, role = %profile.role, ?reason, "login: denied");
            LoginError::Denied(reason)
        })?;

        let session = SessionContext::for_profile(&profile, Utc::now(), self.session_ttl);
        info!(uid = %profile.uid, role = %profile.role, "login: authenticated");
        Ok(LoginSuccess { session, destination })
    }

    pub async fn approve(&self, uid: UserUid, reviewer: &SessionContext) -> Result<AdminRequest, ReviewError> {
        self.review(uid, ReviewDecision::Approve, reviewer).await
    }

    pub async fn reject(&self, uid: UserUid, reviewer: &SessionContext) -> Result<AdminRequest, ReviewError> {
        self.review(uid, ReviewDecision::Reject, reviewer).await
    }

    #[instrument(skip(self, reviewer), fields(uid = %uid, reviewer = %reviewer.uid, ?decision))]
    pub async fn review(
        &self,
        uid: UserUid,
        decision: ReviewDecision,
        reviewer: &SessionContext,
    ) -> Result<AdminRequest, ReviewError> {
        if reviewer.uid == uid {
            return Err(ReviewError::SelfReview(uid));
        }

        let request = self
            .directory
            .get_admin_request(uid)
            .await
            .map_err(|e| {
                error!(error = %e, "review: request read failed");
                ReviewError::Store(e)
            })?
            .ok_or(ReviewError::NotFound(uid))?;

        let outcome = request.review(decision, reviewer.uid, Utc::now())?;

        match self.directory.record_review(&outcome).await {
            Ok(()) => {
                info!(status = %outcome.request.status, role = %outcome.profile_role, "review: recorded");
                Ok(outcome.request)
            }
            Err(StoreError::Conflict(msg)) => {
                warn!(%msg, "review: request was reviewed concurrently");
                let status = self
                    .directory
                    .get_admin_request(uid)
                    .await
                    .ok()
                    .flatten()
                    .map(|r| r.status)
                    .unwrap_or(decision.resulting_status());
                Err(ReviewError::NotPending(status))
            }
            Err(e) => {
                error!(error = %e, "review: write failed");
                Err(ReviewError::Store(e))
            }
        }
    }

    pub async fn list_pending_requests(&self) -> Result<Vec<AdminRequest>, StoreError> {
        self.directory.list_pending_requests().await
    }

    pub async fn profile(&self, uid: UserUid) -> Result<Option<Profile>, StoreError> {
        self.directory.get_profile(uid).await
    }

    /// Profile of `uid` only if it currently holds `role`.
    pub async fn profile_with_role(&self, uid: UserUid, role: Role) -> Result<Option<Profile>, StoreError> {
        Ok(self.directory.get_profile(uid).await?.filter(|p| p.role == role))
    }

    pub async fn admin_request(&self, uid: UserUid) -> Result<Option<(AdminRequest, Option<Profile>)>, StoreError> {
        let Some(request) = self.directory.get_admin_request(uid).await? else {
            return Ok(None);
        };
        let profile = self.directory.get_profile(uid).await?;
        Ok(Some((request, profile)))
    }

    /// Seed an admin account outside the review workflow. Idempotent for an
    /// existing admin; refuses to promote any other existing account.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn bootstrap_admin(&self, email: &Email, password: &Password) -> Result<UserUid, SignupError> {
        if let Some(existing) = self
            .identity
            .find_by_email(email)
            .await
            .map_err(SignupError::IdentityLookupFailed)?
        {
            return match self.directory.get_profile(existing.uid).await {
                Ok(Some(p)) if p.role == Role::Admin => Ok(existing.uid),
                Ok(_) => {
                    warn!(uid = %existing.uid, "bootstrap: email belongs to a non-admin account");
                    Err(SignupError::DuplicateAccount)
                }
                Err(e) => Err(SignupError::ProfileWriteFailed(e)),
            };
        }

        let identity = self
            .identity
            .create(email, password)
            .await
            .map_err(SignupError::IdentityCreationFailed)?;
        let profile = Profile {
            uid: identity.uid,
            email: email.clone(),
            role: Role::Admin,
            gender: None,
            date_of_birth: None,
            created_at: Utc::now(),
        };
        if let Err(e) = self.directory.create_profile(profile, None).await {
            self.discard_orphan(identity.uid).await;
            return Err(SignupError::ProfileWriteFailed(e));
        }

        info!(uid = %identity.uid, "bootstrap: admin account created");
        Ok(identity.uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::identity::InMemoryIdentityProvider;
    use async_trait::async_trait;
    use rolegate_auth::ReviewOutcome;

    struct Harness {
        identity: Arc<InMemoryIdentityProvider>,
        directory: Arc<InMemoryDirectory>,
        service: AccountService,
    }

    fn harness() -> Harness {
        let identity = Arc::new(InMemoryIdentityProvider::default());
        let directory = Arc::new(InMemoryDirectory::new());
        let service = AccountService::new(identity.clone(), directory.clone(), Duration::hours(1));
        Harness {
            identity,
            directory,
            service,
        }
    }

    fn form(email: &str, role: &str) -> SignupForm {
        SignupForm {
            email: email.to_string(),
            password: "secret1".to_string(),
            confirm: "secret1".to_string(),
            role: role.to_string(),
            gender: "female".to_string(),
            date_of_birth: "1999-04-02".to_string(),
        }
    }

    fn pw() -> Password {
        Password::new("secret1")
    }

    async fn admin_session(h: &Harness) -> SessionContext {
        let email = Email::parse("root@uni.edu").unwrap();
        h.service.bootstrap_admin(&email, &Password::new("rootpw1")).await.unwrap();
        h.service.login("root@uni.edu", &Password::new("rootpw1")).await.unwrap().session
    }

    #[tokio::test]
    async fn student_signup_then_login_lands_on_student_dashboard() {
        let h = harness();
        let outcome = h.service.signup(&form("A@Uni.edu", "student")).await.unwrap();
        assert!(matches!(outcome, SignupOutcome::Active { role: Role::Student, .. }));
        assert_eq!(h.directory.admin_request_count(), 0);

        let ok = h.service.login("a@uni.edu", &pw()).await.unwrap();
        assert_eq!(ok.destination, Destination::StudentDashboard);
        assert_eq!(ok.session.role, Role::Student);
        assert_eq!(ok.session.uid, outcome.uid());
    }

    #[tokio::test]
    async fn lecturer_signup_lands_on_lecturer_dashboard() {
        let h = harness();
        h.service.signup(&form("l@uni.edu", "lecturer")).await.unwrap();
        let ok = h.service.login("l@uni.edu", &pw()).await.unwrap();
        assert_eq!(ok.destination, Destination::LecturerDashboard);
    }

    #[tokio::test]
    async fn admin_signup_is_pending_and_cannot_log_in() {
        let h = harness();
        let outcome = h.service.signup(&form("b@uni.edu", "admin")).await.unwrap();
        let uid = outcome.uid();
        assert_eq!(outcome, SignupOutcome::PendingReview { uid });

        let profile = h.service.profile(uid).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::PendingAdmin);
        let request = h.directory.get_admin_request(uid).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.requested_by, uid);

        let err = h.service.login("b@uni.edu", &pw()).await.unwrap_err();
        assert!(matches!(err, LoginError::Denied(DeniedReason::ApprovalPending)));
    }

    #[tokio::test]
    async fn approval_promotes_and_enables_admin_login() {
        let h = harness();
        let reviewer = admin_session(&h).await;
        let uid = h.service.signup(&form("b@uni.edu", "admin")).await.unwrap().uid();

        let request = h.service.approve(uid, &reviewer).await.unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.approved_by, Some(reviewer.uid));
        assert!(request.approved_at.is_some());
        assert!(h.service.list_pending_requests().await.unwrap().is_empty());

        let ok = h.service.login("b@uni.edu", &pw()).await.unwrap();
        assert_eq!(ok.destination, Destination::AdminDashboard);
    }

    #[tokio::test]
    async fn rejection_is_terminal() {
        let h = harness();
        let reviewer = admin_session(&h).await;
        let uid = h.service.signup(&form("c@uni.edu", "admin")).await.unwrap().uid();

        let request = h.service.reject(uid, &reviewer).await.unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
        assert_eq!(request.rejected_by, Some(reviewer.uid));

        let err = h.service.login("c@uni.edu", &pw()).await.unwrap_err();
        assert!(matches!(err, LoginError::Denied(DeniedReason::Unauthorized)));

        let again = h.service.approve(uid, &reviewer).await.unwrap_err();
        assert!(matches!(again, ReviewError::NotPending(RequestStatus::Rejected)));
        let profile = h.service.profile(uid).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::RejectedAdmin);
    }

    #[tokio::test]
    async fn review_of_unknown_uid_is_not_found() {
        let h = harness();
        let reviewer = admin_session(&h).await;
        let err = h.service.approve(UserUid::new(), &reviewer).await.unwrap_err();
        assert!(matches!(err, ReviewError::NotFound(_)));
        assert_eq!(err.user_message(ReviewDecision::Approve), "Admin request not found.");
    }

    #[tokio::test]
    async fn duplicate_email_is_refused_without_new_records() {
        let h = harness();
        h.service.signup(&form("a@uni.edu", "student")).await.unwrap();
        let err = h.service.signup(&form(" A@UNI.EDU ", "lecturer")).await.unwrap_err();
        assert!(matches!(err, SignupError::DuplicateAccount));
        assert_eq!(h.identity.len(), 1);
        assert_eq!(h.directory.profile_count(), 1);
    }

    #[tokio::test]
    async fn invalid_form_creates_nothing() {
        let h = harness();
        let mut bad = form("a@uni.edu", "student");
        bad.confirm = "different".to_string();
        bad.gender = String::new();
        let err = h.service.signup(&bad).await.unwrap_err();
        match err {
            SignupError::Validation(v) => {
                assert!(v.has("confirm"));
                assert!(v.has("gender"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(h.identity.is_empty());
        assert_eq!(h.directory.profile_count(), 0);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_read_the_same() {
        let h = harness();
        h.service.signup(&form("a@uni.edu", "student")).await.unwrap();

        let wrong = h.service.login("a@uni.edu", &Password::new("nope123")).await.unwrap_err();
        let missing = h.service.login("ghost@uni.edu", &pw()).await.unwrap_err();
        assert!(matches!(wrong, LoginError::InvalidCredentials));
        assert!(matches!(missing, LoginError::AccountNotFound));
        assert_eq!(wrong.user_message(), missing.user_message());
    }

    #[tokio::test]
    async fn identity_without_profile_is_reported_generically() {
        let h = harness();
        let email = Email::parse("orphan@uni.edu").unwrap();
        h.identity.create(&email, &pw()).await.unwrap();

        let err = h.service.login("orphan@uni.edu", &pw()).await.unwrap_err();
        assert!(matches!(err, LoginError::ProfileMissing(_)));
        assert_eq!(err.user_message(), BAD_LOGIN);
    }

    #[tokio::test]
    async fn signup_logs_verification_without_failing() {
        let h = harness();
        h.service.signup(&form("v@uni.edu", "student")).await.unwrap();
        let email = Email::parse("v@uni.edu").unwrap();
        assert!(h.identity.verification_token(&email).is_some());
    }

    #[tokio::test]
    async fn profile_with_role_filters_on_current_role() {
        let h = harness();
        let uid = h.service.signup(&form("s@uni.edu", "student")).await.unwrap().uid();
        assert!(h.service.profile_with_role(uid, Role::Student).await.unwrap().is_some());
        assert!(h.service.profile_with_role(uid, Role::Lecturer).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn admin_request_view_includes_profile() {
        let h = harness();
        let uid = h.service.signup(&form("b@uni.edu", "admin")).await.unwrap().uid();
        let (request, profile) = h.service.admin_request(uid).await.unwrap().unwrap();
        assert_eq!(request.uid, uid);
        assert_eq!(profile.map(|p| p.role), Some(Role::PendingAdmin));
        assert!(h.service.admin_request(UserUid::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bootstrap_admin_is_idempotent() {
        let h = harness();
        let email = Email::parse("root@uni.edu").unwrap();
        let first = h.service.bootstrap_admin(&email, &pw()).await.unwrap();
        let second = h.service.bootstrap_admin(&email, &pw()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(h.identity.len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_admin_refuses_to_promote_existing_student() {
        let h = harness();
        h.service.signup(&form("a@uni.edu", "student")).await.unwrap();
        let email = Email::parse("a@uni.edu").unwrap();
        let err = h.service.bootstrap_admin(&email, &pw()).await.unwrap_err();
        assert!(matches!(err, SignupError::DuplicateAccount));
    }

    #[tokio::test]
    async fn reviewer_cannot_review_own_request() {
        let h = harness();
        let reviewer = admin_session(&h).await;
        let err = h.service.approve(reviewer.uid, &reviewer).await.unwrap_err();
        assert!(matches!(err, ReviewError::SelfReview(_)));
    }

    /// Directory whose writes always fail.
    struct BrokenDirectory;

    #[async_trait]
    impl DirectoryStore for BrokenDirectory {
        async fn get_profile(&self, _uid: UserUid) -> Result<Option<Profile>, StoreError> {
            Ok(None)
        }

        async fn create_profile(&self, _profile: Profile, _request: Option<AdminRequest>) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".into()))
        }

        async fn get_admin_request(&self, _uid: UserUid) -> Result<Option<AdminRequest>, StoreError> {
            Ok(None)
        }

        async fn list_pending_requests(&self) -> Result<Vec<AdminRequest>, StoreError> {
            Ok(Vec::new())
        }

        async fn record_review(&self, _outcome: &ReviewOutcome) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".into()))
        }
    }

    #[tokio::test]
    async fn failed_profile_write_removes_the_new_identity() {
        let identity = Arc::new(InMemoryIdentityProvider::default());
        let service = AccountService::new(identity.clone(), Arc::new(BrokenDirectory), Duration::hours(1));

        let err = service.signup(&form("a@uni.edu", "admin")).await.unwrap_err();
        assert!(matches!(err, SignupError::ProfileWriteFailed(_)));
        assert_eq!(err.user_message(), "Registration failed. Please try again.");
        assert!(identity.is_empty());
    }
}
