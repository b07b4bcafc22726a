//! Registration and login against the RemWaste backend

mod types;

use tracing::{debug, info};

use crate::contract;
use crate::error::{Error, Result};
use crate::fetch::{ApiResponse, HttpClient};
use crate::fixtures;

pub use types::*;

/// Client for the `/register` and `/login` endpoints
#[derive(Debug, Clone)]
pub struct AuthService {
    http: HttpClient,
}

impl AuthService {
    /// Create a new auth service
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Register a user, generating any credential that is not given
    ///
    /// Expects `201` with `{ message: "User created successfully", userId }`.
    pub async fn register_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<Registration> {
        let email = email
            .map(str::to_string)
            .unwrap_or_else(|| fixtures::unique_email("test.api"));
        let password = password.unwrap_or(fixtures::test_password()).to_string();

        let response = self
            .http
            .post("/register")
            .json(&UserPayload::new(&email, &password))?
            .send()
            .await?;

        contract::expect_json_response(&response, 201)?;
        contract::expect_str(&response.body, "message", "User created successfully")?;
        contract::expect_number(&response.body, "userId")?;

        let body: RegisterResponse = serde_json::from_value(response.body)?;
        info!("Registered {} as user {}", email, body.user_id);

        Ok(Registration {
            email,
            password,
            user_id: body.user_id,
        })
    }

    /// Register with a payload the backend must reject (400 or 409)
    pub async fn register_user_with_error(
        &self,
        payload: &UserPayload,
        expected_error: &str,
    ) -> Result<ApiResponse> {
        let response = self
            .http
            .post("/register")
            .json(payload)?
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_status_in(&response, &[400, 409])?;
        contract::expect_str(&response.body, "error", expected_error)?;
        Ok(response)
    }

    /// Log in and check the token and user echo
    pub async fn login_user(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response = self
            .http
            .post("/login")
            .json(&UserPayload::new(email, password))?
            .send()
            .await?;

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(&response.body, "message", "Login successful")?;
        contract::expect_keys(&response.body, &["token", "user"])?;

        let token = response.body["token"]
            .as_str()
            .ok_or_else(|| Error::contract("token is not a string"))?;
        if !contract::is_jwt_shaped(token) {
            return Err(Error::contract(format!(
                "token does not have three segments: {}",
                token
            )));
        }

        contract::expect_keys(&response.body["user"], &["id"])?;
        contract::expect_str(&response.body["user"], "email", email)?;

        let login: LoginResponse = serde_json::from_value(response.body)?;
        debug!("Logged in as user {}", login.user.id);
        Ok(login)
    }

    /// Log in with credentials the backend must reject (400 or 401)
    pub async fn login_user_with_error(
        &self,
        payload: &UserPayload,
        expected_error: &str,
    ) -> Result<ApiResponse> {
        let response = self
            .http
            .post("/login")
            .json(payload)?
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_status_in(&response, &[400, 401])?;
        contract::expect_str(&response.body, "error", expected_error)?;
        Ok(response)
    }

    /// Register a fresh user and log in as them
    pub async fn create_and_login_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthenticatedUser> {
        let registration = self.register_user(email, password).await?;
        let login = self
            .login_user(&registration.email, &registration.password)
            .await?;

        Ok(AuthenticatedUser {
            email: registration.email,
            password: registration.password,
            user_id: registration.user_id,
            session: Session {
                token: login.token,
                user_id: login.user.id,
            },
            user: login.user,
        })
    }
}
