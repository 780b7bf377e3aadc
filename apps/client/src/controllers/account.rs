//! Sign-in, registration and profile forms.
//!
//! Each form keeps the last failure as an inline message instead of
//! returning it, matching how the pages render errors under the submit button.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::errors::ClientError;
use crate::models::user::{PasswordChange, RegisterRequest};
use crate::models::{User, UserUpdate};
use crate::router::{Navigator, Route};
use crate::session::federated::FederatedOutcome;
use crate::session::SessionService;

use super::normalize::{optional, text_of};

pub const MIN_PASSWORD_LEN: usize = 6;

fn require(ok: bool, message: &str) -> Result<(), ClientError> {
    if ok {
        Ok(())
    } else {
        Err(ClientError::Validation(message.to_string()))
    }
}

fn long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub struct LoginForm {
    session: Arc<SessionService>,
    navigator: Arc<dyn Navigator>,
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new(session: Arc<SessionService>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            email: String::new(),
            password: String::new(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Signs in and moves to the dashboard. Returns whether it succeeded.
    pub async fn submit(&mut self) -> bool {
        self.error = None;
        let result = match require(
            !self.email.trim().is_empty() && !self.password.is_empty(),
            "Enter your email and password",
        ) {
            Ok(()) => self.session.login(self.email.trim(), &self.password).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Applies the result of a federated sign-in delivered by the binder.
    pub fn handle_federated(&mut self, outcome: FederatedOutcome) -> bool {
        match outcome {
            FederatedOutcome::SignedIn(user) => self.finish(Ok(user)),
            FederatedOutcome::Failed(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    fn finish(&mut self, result: Result<User, ClientError>) -> bool {
        match result {
            Ok(_) => {
                self.password.clear();
                self.navigator.navigate(&Route::Dashboard.path());
                true
            }
            Err(e) => {
                self.error = Some(e.user_message("Login failed. Please check your credentials."));
                false
            }
        }
    }
}

pub struct RegisterForm {
    session: Arc<SessionService>,
    navigator: Arc<dyn Navigator>,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub phone: String,
    error: Option<String>,
}

impl RegisterForm {
    pub fn new(session: Arc<SessionService>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            email: String::new(),
            username: String::new(),
            full_name: String::new(),
            password: String::new(),
            phone: String::new(),
            error: None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn request(&self) -> Result<RegisterRequest, ClientError> {
        require(
            !self.email.trim().is_empty()
                && !self.username.trim().is_empty()
                && !self.full_name.trim().is_empty(),
            "Fill in all required fields",
        )?;
        require(
            long_enough(&self.password),
            "Password must be at least 6 characters",
        )?;
        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            full_name: self.full_name.trim().to_string(),
            password: self.password.clone(),
            phone: optional(&self.phone),
        })
    }

    /// Creates the account and sends the user to the login page.
    pub async fn submit(&mut self) -> bool {
        self.error = None;
        let result = match self.request() {
            Ok(req) => self.session.register(&req).await,
            Err(e) => Err(e),
        };
        self.finish(result, Route::Login)
    }

    /// Creates the account and signs straight in.
    pub async fn submit_and_sign_in(&mut self) -> bool {
        self.error = None;
        let result = match self.request() {
            Ok(req) => self.session.register_and_login(&req).await,
            Err(e) => Err(e),
        };
        self.finish(result, Route::Dashboard)
    }

    fn finish(&mut self, result: Result<User, ClientError>, next: Route) -> bool {
        match result {
            Ok(user) => {
                info!("Registered {}", user.email);
                self.password.clear();
                self.navigator.navigate(&next.path());
                true
            }
            Err(e) => {
                self.error = Some(e.user_message("Registration failed"));
                false
            }
        }
    }
}

/// Editable copy of the signed-in user's profile.
pub struct ProfileForm {
    session: Arc<SessionService>,
    pub full_name: String,
    pub phone: String,
    pub bio: String,
}

impl ProfileForm {
    /// Prefills from the current session; empty when signed out.
    pub fn new(session: Arc<SessionService>) -> Self {
        let user = session.snapshot().user;
        let (full_name, phone, bio) = match &user {
            Some(u) => (u.full_name.clone(), text_of(&u.phone), text_of(&u.bio)),
            None => Default::default(),
        };
        Self {
            session,
            full_name,
            phone,
            bio,
        }
    }

    pub async fn save(&self) -> Result<User, ClientError> {
        require(!self.full_name.trim().is_empty(), "Full name is required")?;
        let update = UserUpdate {
            full_name: Some(self.full_name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            bio: Some(self.bio.trim().to_string()),
            avatar_url: None,
        };
        self.session.save_profile(&update).await
    }
}

pub struct PasswordForm {
    api: Arc<ApiClient>,
    pub old_password: String,
    pub new_password: String,
}

impl PasswordForm {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            old_password: String::new(),
            new_password: String::new(),
        }
    }

    /// Changes the password and clears both fields on success.
    pub async fn submit(&mut self) -> Result<String, ClientError> {
        require(!self.old_password.is_empty(), "Enter your current password")?;
        require(long_enough(&self.new_password), "Min 6 characters")?;

        let response = self
            .api
            .change_password(&PasswordChange {
                old_password: self.old_password.clone(),
                new_password: self.new_password.clone(),
            })
            .await?;
        self.old_password.clear();
        self.new_password.clear();
        Ok(response.message)
    }
}
