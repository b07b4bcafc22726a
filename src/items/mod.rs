//! CRUD on waste items
//!
//! Every call here is a single request/response exchange. The workflow helpers
//! chain independent calls without rollback: if a later step fails, whatever
//! the earlier steps created stays on the server.

mod types;

use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

use crate::auth::Session;
use crate::contract;
use crate::error::{Error, Result};
use crate::fetch::{ApiResponse, HttpClient};
use crate::fixtures::{messages, NON_EXISTENT_ITEM_ID};

pub use types::*;

/// Client for the `/items` endpoints
#[derive(Debug, Clone)]
pub struct ItemsService {
    http: HttpClient,
}

impl ItemsService {
    /// Create a new items service
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Defaults merged under every create payload
    pub fn create_defaults() -> ItemPayload {
        ItemPayload::titled("Test Item")
            .with_description("Test description")
            .with_location("Test location")
            .with_weight(1.0)
            .with_status(ItemStatus::Pending)
    }

    /// Defaults merged under every update payload
    pub fn update_defaults() -> ItemPayload {
        ItemPayload::titled("Updated Item")
            .with_description("Updated description")
            .with_location("Updated location")
            .with_weight(2.0)
            .with_status(ItemStatus::Collected)
    }

    fn item_path(id: i64) -> String {
        format!("/items/{}", id)
    }

    /// Items owned by the session's user
    pub async fn get_user_items(&self, session: &Session) -> Result<Vec<Item>> {
        let response = self
            .http
            .get("/items")
            .bearer_auth(&session.token)
            .send()
            .await?;

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(&response.body, "message", "Items retrieved successfully")?;
        contract::expect_array(&response.body, "items")?;

        let items: Vec<Item> = serde_json::from_value(response.body["items"].clone())?;
        for item in &items {
            expect_owned_by(item, session)?;
        }
        debug!("User {} has {} item(s)", session.user_id, items.len());
        Ok(items)
    }

    /// `/items` without a token must answer 401
    pub async fn get_user_items_without_auth(&self) -> Result<ApiResponse> {
        let response = self
            .http
            .get("/items")
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, 401, messages::TOKEN_REQUIRED)?;
        Ok(response)
    }

    /// `/items` with a bad token must answer 403
    pub async fn get_user_items_with_invalid_token(&self, token: &str) -> Result<ApiResponse> {
        let response = self
            .http
            .get("/items")
            .bearer_auth(token)
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, 403, messages::INVALID_TOKEN)?;
        Ok(response)
    }

    /// Create an item; unset fields come from [`ItemsService::create_defaults`]
    pub async fn create_item(&self, session: &Session, overrides: ItemPayload) -> Result<Item> {
        let payload = overrides.merge_over(Self::create_defaults());
        self.create_item_without_defaults(session, &payload).await
    }

    /// Create an item from `payload` exactly as given
    ///
    /// Fields left unset are omitted from the body, so the backend's own
    /// defaults apply.
    pub async fn create_item_without_defaults(
        &self,
        session: &Session,
        payload: &ItemPayload,
    ) -> Result<Item> {
        let response = self
            .http
            .post("/items")
            .bearer_auth(&session.token)
            .json(payload)?
            .send()
            .await?;

        contract::expect_json_response(&response, 201)?;
        contract::expect_str(&response.body, "message", "Item created successfully")?;
        contract::expect_keys(&response.body, &["item"])?;

        let item_body = &response.body["item"];
        contract::expect_keys(item_body, &["id", "created_at"])?;

        let item: Item = serde_json::from_value(item_body.clone())?;
        expect_echoed(&item, payload)?;
        expect_owned_by(&item, session)?;
        info!("Created item {} ({})", item.id, item.title);
        Ok(item)
    }

    /// Creating an item without a title must answer 400
    pub async fn create_item_without_title(&self, session: &Session) -> Result<ApiResponse> {
        let body = serde_json::json!({ "description": "Item without title" });
        self.create_item_with_error(session, &body, 400, messages::TITLE_REQUIRED)
            .await
    }

    /// Post a raw body that the backend must reject with `status` and `error`
    pub async fn create_item_with_error(
        &self,
        session: &Session,
        body: &Value,
        status: u16,
        error: &str,
    ) -> Result<ApiResponse> {
        let response = self
            .http
            .post("/items")
            .bearer_auth(&session.token)
            .json(body)?
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, status, error)?;
        Ok(response)
    }

    /// Update an item; unset fields come from [`ItemsService::update_defaults`]
    pub async fn update_item(
        &self,
        session: &Session,
        id: i64,
        overrides: ItemPayload,
    ) -> Result<Item> {
        let payload = overrides.merge_over(Self::update_defaults());

        let response = self
            .http
            .put(&Self::item_path(id))
            .bearer_auth(&session.token)
            .json(&payload)?
            .send()
            .await?;

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(&response.body, "message", "Item updated successfully")?;
        contract::expect_keys(&response.body, &["item"])?;

        let item_body = &response.body["item"];
        contract::expect_keys(item_body, &["id", "updated_at"])?;

        let item: Item = serde_json::from_value(item_body.clone())?;
        if item.id != id {
            return Err(Error::contract(format!(
                "updated item id {} does not match requested id {}",
                item.id, id
            )));
        }
        expect_echoed(&item, &payload)?;
        expect_owned_by(&item, session)?;
        info!("Updated item {} ({})", item.id, item.title);
        Ok(item)
    }

    /// Put a raw body that the backend must reject with `status` and `error`
    pub async fn update_item_with_error(
        &self,
        session: &Session,
        id: i64,
        body: &Value,
        status: u16,
        error: &str,
    ) -> Result<ApiResponse> {
        let response = self
            .http
            .put(&Self::item_path(id))
            .bearer_auth(&session.token)
            .json(body)?
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, status, error)?;
        Ok(response)
    }

    /// Updating an unknown id must answer 404
    pub async fn update_non_existent_item(
        &self,
        session: &Session,
        id: Option<i64>,
    ) -> Result<ApiResponse> {
        let body = serde_json::json!({ "title": "Non-existent Item" });
        self.update_item_with_error(
            session,
            id.unwrap_or(NON_EXISTENT_ITEM_ID),
            &body,
            404,
            messages::ITEM_NOT_FOUND,
        )
        .await
    }

    /// Delete an item and check the echoed id
    pub async fn delete_item(&self, session: &Session, id: i64) -> Result<DeletedItem> {
        let response = self
            .http
            .delete(&Self::item_path(id))
            .bearer_auth(&session.token)
            .send()
            .await?;

        contract::expect_json_response(&response, 200)?;
        contract::expect_str(&response.body, "message", "Item deleted successfully")?;
        contract::expect_str(&response.body, "deletedItemId", &id.to_string())?;

        let deleted: DeletedItem = serde_json::from_value(response.body)?;
        info!("Deleted item {}", deleted.deleted_item_id);
        Ok(deleted)
    }

    /// Deleting an unknown id must answer 404
    pub async fn delete_non_existent_item(
        &self,
        session: &Session,
        id: Option<i64>,
    ) -> Result<ApiResponse> {
        let response = self
            .http
            .delete(&Self::item_path(id.unwrap_or(NON_EXISTENT_ITEM_ID)))
            .bearer_auth(&session.token)
            .timeout(self.http.options().fail_timeout)
            .allow_failure()
            .send()
            .await?;

        contract::expect_error_message(&response, 404, messages::ITEM_NOT_FOUND)?;
        Ok(response)
    }

    /// Create, update and delete one item
    pub async fn perform_complete_item_workflow(&self, session: &Session) -> Result<ItemWorkflow> {
        let created = self
            .create_item(session, ItemPayload::titled("Workflow Test Item"))
            .await?;

        let updated = self
            .update_item(
                session,
                created.id,
                ItemPayload::titled("Updated Workflow Item").with_status(ItemStatus::Collected),
            )
            .await?;

        let deleted = self.delete_item(session, updated.id).await?;

        Ok(ItemWorkflow {
            created,
            updated,
            deleted,
        })
    }

    /// Create one item per status, check each is echoed back, then delete them
    pub async fn verify_status_values(&self, session: &Session) -> Result<Vec<Item>> {
        let mut created = Vec::with_capacity(ItemStatus::ALL.len());

        for (index, status) in ItemStatus::ALL.iter().enumerate() {
            let item = self
                .create_item(
                    session,
                    ItemPayload::titled(&format!("Status Test Item {}", index + 1))
                        .with_status(*status),
                )
                .await?;
            created.push(item);
        }

        for item in &created {
            self.delete_item(session, item.id).await?;
        }

        Ok(created)
    }
}

fn mismatch(id: i64, field: &str, got: &dyn fmt::Debug, sent: &dyn fmt::Debug) -> Error {
    Error::contract(format!("item {} has {} {:?}, expected {:?}", id, field, got, sent))
}

/// Every field set in `payload` must come back unchanged; weight is not compared
fn expect_echoed(item: &Item, payload: &ItemPayload) -> Result<()> {
    if let Some(title) = &payload.title {
        if &item.title != title {
            return Err(mismatch(item.id, "title", &item.title, title));
        }
    }
    if let Some(description) = &payload.description {
        if item.description.as_ref() != Some(description) {
            return Err(mismatch(item.id, "description", &item.description, description));
        }
    }
    if let Some(location) = &payload.location {
        if item.location.as_ref() != Some(location) {
            return Err(mismatch(item.id, "location", &item.location, location));
        }
    }
    if let Some(status) = payload.status {
        if item.status != status {
            return Err(mismatch(item.id, "status", &item.status, &status));
        }
    }
    Ok(())
}

fn expect_owned_by(item: &Item, session: &Session) -> Result<()> {
    match item.user_id {
        Some(owner) if owner != session.user_id => Err(Error::contract(format!(
            "item {} belongs to user {}, expected {}",
            item.id, owner, session.user_id
        ))),
        _ => Ok(()),
    }
}
