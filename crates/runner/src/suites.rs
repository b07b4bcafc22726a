//! Contract suites run against a live backend
//!
//! Every case builds its own user and items, so cases can run in any order
//! and a failure never leaks state into the next one.

use std::time::Instant;

use clap::ValueEnum;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use remwaste_client::auth::{Session, UserPayload};
use remwaste_client::error::{Error, Result};
use remwaste_client::fixtures::{self, messages};
use remwaste_client::items::ItemStatus;
use remwaste_client::RemWaste;
use tracing::{debug, error, info};

use crate::report::{CaseResult, SuiteResult};

/// Which suites to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuiteSelection {
    Health,
    Auth,
    Items,
    All,
}

/// A named contract check
pub struct TestCase {
    pub name: &'static str,
    pub run: for<'a> fn(&'a RemWaste) -> BoxFuture<'a, Result<()>>,
}

/// An ordered list of cases
pub struct Suite {
    pub name: &'static str,
    pub cases: Vec<TestCase>,
}

impl Suite {
    /// Run every case in order; a failing case does not stop the others
    pub async fn run(&self, client: &RemWaste) -> SuiteResult {
        let start = Instant::now();
        info!("Running suite {} ({} case(s))", self.name, self.cases.len());

        let mut results = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            debug!("Running case: {}", case.name);
            let case_start = Instant::now();
            let outcome = (case.run)(client).await;
            let duration_ms = case_start.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(()) => {
                    info!("✓ {} ({} ms)", case.name, duration_ms);
                    CaseResult {
                        name: case.name.to_string(),
                        success: true,
                        duration_ms,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("✗ {} - {}", case.name, e);
                    CaseResult {
                        name: case.name.to_string(),
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        SuiteResult::new(self.name, results, start.elapsed().as_millis() as u64)
    }
}

/// Suites for `selection`, in run order
pub fn select(selection: SuiteSelection) -> Vec<Suite> {
    match selection {
        SuiteSelection::Health => vec![health_suite()],
        SuiteSelection::Auth => vec![auth_suite()],
        SuiteSelection::Items => vec![items_suite()],
        SuiteSelection::All => vec![health_suite(), auth_suite(), items_suite()],
    }
}

pub fn health_suite() -> Suite {
    Suite {
        name: "Health",
        cases: vec![
            TestCase {
                name: "health endpoint reports OK",
                run: health_status,
            },
            TestCase {
                name: "root lists the API endpoints",
                run: api_documentation,
            },
            TestCase {
                name: "unknown route answers 404",
                run: unknown_route,
            },
        ],
    }
}

pub fn auth_suite() -> Suite {
    Suite {
        name: "Authentication",
        cases: vec![
            TestCase {
                name: "register a new user",
                run: register_new_user,
            },
            TestCase {
                name: "duplicate registration conflicts",
                run: duplicate_registration,
            },
            TestCase {
                name: "register without email",
                run: register_without_email,
            },
            TestCase {
                name: "register without password",
                run: register_without_password,
            },
            TestCase {
                name: "login with valid credentials",
                run: login_valid,
            },
            TestCase {
                name: "login with wrong password",
                run: login_wrong_password,
            },
            TestCase {
                name: "login as unknown user",
                run: login_unknown_user,
            },
            TestCase {
                name: "login without password",
                run: login_without_password,
            },
        ],
    }
}

pub fn items_suite() -> Suite {
    Suite {
        name: "Items CRUD",
        cases: vec![
            TestCase {
                name: "items require a token",
                run: items_without_token,
            },
            TestCase {
                name: "items reject an invalid token",
                run: items_invalid_token,
            },
            TestCase {
                name: "new user has no items",
                run: new_user_has_no_items,
            },
            TestCase {
                name: "create and list items",
                run: create_and_list,
            },
            TestCase {
                name: "create with complete data",
                run: create_complete,
            },
            TestCase {
                name: "create with minimal data",
                run: create_minimal,
            },
            TestCase {
                name: "create without title",
                run: create_without_title,
            },
            TestCase {
                name: "update an item",
                run: update_item,
            },
            TestCase {
                name: "update a non-existent item",
                run: update_missing,
            },
            TestCase {
                name: "delete a non-existent item",
                run: delete_missing,
            },
            TestCase {
                name: "delete an item twice",
                run: delete_twice,
            },
            TestCase {
                name: "complete item workflow",
                run: complete_workflow,
            },
            TestCase {
                name: "every status is accepted",
                run: status_values,
            },
            TestCase {
                name: "create several items",
                run: bulk_create,
            },
        ],
    }
}

async fn fresh_session(client: &RemWaste) -> Result<Session> {
    let user = client.auth().create_and_login_user(None, None).await?;
    Ok(user.session)
}

fn health_status(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let health = client.health().get_health_status().await?;
        debug!("Backend time {}", health.timestamp);
        Ok(())
    }
    .boxed()
}

fn api_documentation(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        client.health().get_api_documentation().await?;
        Ok(())
    }
    .boxed()
}

fn unknown_route(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        client.health().check_invalid_endpoint().await?;
        Ok(())
    }
    .boxed()
}

fn register_new_user(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        client.auth().register_user(None, None).await?;
        Ok(())
    }
    .boxed()
}

fn duplicate_registration(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let registration = client.auth().register_user(None, None).await?;
        let again = UserPayload::new(&registration.email, &registration.password);
        client
            .auth()
            .register_user_with_error(&again, messages::USER_EXISTS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn register_without_email(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let data = fixtures::invalid_user_data();
        client
            .auth()
            .register_user_with_error(&data.missing_email, messages::MISSING_CREDENTIALS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn register_without_password(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let data = fixtures::invalid_user_data();
        client
            .auth()
            .register_user_with_error(&data.missing_password, messages::MISSING_CREDENTIALS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn login_valid(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        fresh_session(client).await?;
        Ok(())
    }
    .boxed()
}

fn login_wrong_password(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let registration = client.auth().register_user(None, None).await?;
        let wrong = UserPayload::new(&registration.email, "WrongPassword123!");
        client
            .auth()
            .login_user_with_error(&wrong, messages::INVALID_CREDENTIALS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn login_unknown_user(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let unknown = UserPayload::new(
            &fixtures::unique_email("unknown.user"),
            fixtures::test_password(),
        );
        client
            .auth()
            .login_user_with_error(&unknown, messages::INVALID_CREDENTIALS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn login_without_password(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let data = fixtures::invalid_user_data();
        client
            .auth()
            .login_user_with_error(&data.missing_password, messages::MISSING_CREDENTIALS)
            .await?;
        Ok(())
    }
    .boxed()
}

fn items_without_token(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        client.items().get_user_items_without_auth().await?;
        Ok(())
    }
    .boxed()
}

fn items_invalid_token(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        client
            .items()
            .get_user_items_with_invalid_token("invalid-token")
            .await?;
        Ok(())
    }
    .boxed()
}

fn create_and_list(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let created = client
            .items()
            .create_item(&session, fixtures::valid_item())
            .await?;

        let items = client.items().get_user_items(&session).await?;
        if !items.iter().any(|item| item.id == created.id) {
            return Err(Error::contract(format!(
                "item {} missing from the user's list",
                created.id
            )));
        }

        client.items().delete_item(&session, created.id).await?;
        Ok(())
    }
    .boxed()
}

fn new_user_has_no_items(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let items = client.items().get_user_items(&session).await?;
        if !items.is_empty() {
            return Err(Error::contract(format!(
                "new user already owns {} item(s)",
                items.len()
            )));
        }
        Ok(())
    }
    .boxed()
}

fn create_complete(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        // Description, location and status must be echoed back.
        let created = client
            .items()
            .create_item(&session, fixtures::complete_item())
            .await?;
        client.items().delete_item(&session, created.id).await?;
        Ok(())
    }
    .boxed()
}

fn create_minimal(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let created = client
            .items()
            .create_item_without_defaults(&session, &fixtures::minimal_item())
            .await?;
        client.items().delete_item(&session, created.id).await?;

        if created.status != ItemStatus::Pending {
            return Err(Error::contract(format!(
                "item without a status was stored as {}",
                created.status
            )));
        }
        Ok(())
    }
    .boxed()
}

fn create_without_title(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        client.items().create_item_without_title(&session).await?;
        Ok(())
    }
    .boxed()
}

fn update_item(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let items = client.items();

        let created = items.create_item(&session, fixtures::complete_item()).await?;
        let changes = fixtures::item_update_data();
        let expected_status = changes.status;
        let updated = items.update_item(&session, created.id, changes).await?;
        items.delete_item(&session, updated.id).await?;

        if Some(updated.status) != expected_status {
            return Err(Error::contract(format!(
                "item {} kept status {} after update",
                updated.id, updated.status
            )));
        }
        Ok(())
    }
    .boxed()
}

fn delete_missing(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        client
            .items()
            .delete_non_existent_item(&session, None)
            .await?;
        Ok(())
    }
    .boxed()
}

fn update_missing(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        client
            .items()
            .update_non_existent_item(&session, None)
            .await?;
        Ok(())
    }
    .boxed()
}

fn delete_twice(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let items = client.items();

        let workflow = fixtures::crud_workflow_data();
        let created = items.create_item(&session, workflow.create).await?;
        items
            .update_item(&session, created.id, workflow.update)
            .await?;
        items.delete_item(&session, created.id).await?;
        items
            .delete_non_existent_item(&session, Some(created.id))
            .await?;
        Ok(())
    }
    .boxed()
}

fn complete_workflow(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        client
            .items()
            .perform_complete_item_workflow(&session)
            .await?;
        Ok(())
    }
    .boxed()
}

fn status_values(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        client.items().verify_status_values(&session).await?;
        Ok(())
    }
    .boxed()
}

fn bulk_create(client: &RemWaste) -> BoxFuture<'_, Result<()>> {
    async move {
        let session = fresh_session(client).await?;
        let items = client.items();

        let mut ids = Vec::new();
        for payload in fixtures::generate_multiple_items(3) {
            ids.push(items.create_item(&session, payload).await?.id);
        }

        let listed = items.get_user_items(&session).await?;
        if listed.len() < ids.len() {
            return Err(Error::contract(format!(
                "expected at least {} items, got {}",
                ids.len(),
                listed.len()
            )));
        }

        for id in ids {
            items.delete_item(&session, id).await?;
        }
        Ok(())
    }
    .boxed()
}
