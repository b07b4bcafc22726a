//! Test data factory
//!
//! Pure constructors for user and item payloads. Emails are made unique with
//! a millisecond timestamp plus a process-wide sequence number, so separate
//! runs (and separate cases within a run) never collide on registration.

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::auth::UserPayload;
use crate::items::{ItemPayload, ItemStatus};

/// Literal error strings the backend returns
pub mod messages {
    pub const MISSING_CREDENTIALS: &str = "Email and password are required";
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const USER_EXISTS: &str = "User already exists";
    pub const TOKEN_REQUIRED: &str = "Access token required";
    pub const INVALID_TOKEN: &str = "Invalid or expired token";
    pub const TITLE_REQUIRED: &str = "Title is required";
    pub const ITEM_NOT_FOUND: &str = "Item not found";
    pub const ROUTE_NOT_FOUND: &str = "Route not found";
}

/// Domain used for every generated address
pub const TEST_EMAIL_DOMAIN: &str = "remwaste.test";

/// Id that never exists on the backend
pub const NON_EXISTENT_ITEM_ID: i64 = 99999;

static EMAIL_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// `<prefix>.<millis>.<seq>@remwaste.test`
pub fn unique_email(prefix: &str) -> String {
    let seq = EMAIL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}.{}.{}@{}",
        prefix,
        Utc::now().timestamp_millis(),
        seq,
        TEST_EMAIL_DOMAIN
    )
}

/// Password used for generated users
pub fn test_password() -> &'static str {
    "TestPassword123!"
}

/// A registrable user with a unique email
pub fn valid_user() -> UserPayload {
    UserPayload::new(&unique_email("valid.user"), "ValidPassword123!")
}

/// Payloads the backend should reject on register or login
#[derive(Debug, Clone)]
pub struct InvalidUserData {
    pub missing_email: UserPayload,
    pub missing_password: UserPayload,
    pub empty: UserPayload,
    pub invalid_email: UserPayload,
    pub weak_password: UserPayload,
}

pub fn invalid_user_data() -> InvalidUserData {
    InvalidUserData {
        missing_email: UserPayload {
            email: None,
            password: Some("password123".to_string()),
        },
        missing_password: UserPayload {
            email: Some("test@example.com".to_string()),
            password: None,
        },
        empty: UserPayload::default(),
        invalid_email: UserPayload::new("invalid-email", "password123"),
        weak_password: UserPayload::new("test@example.com", "123"),
    }
}

pub fn valid_item() -> ItemPayload {
    ItemPayload::titled("Test Plastic Bottle")
        .with_description("Empty water bottle for recycling")
        .with_location("Kitchen Counter")
        .with_weight(0.5)
        .with_status(ItemStatus::Pending)
}

pub fn minimal_item() -> ItemPayload {
    ItemPayload::titled("Minimal Test Item")
}

pub fn complete_item() -> ItemPayload {
    ItemPayload::titled("Complete Test Item")
        .with_description("This is a complete item with all fields")
        .with_location("Test Location - Basement")
        .with_weight(2.5)
        .with_status(ItemStatus::Collected)
}

/// Malformed item bodies; kept as raw JSON since they do not fit [`ItemPayload`]
#[derive(Debug, Clone)]
pub struct InvalidItemData {
    pub missing_title: Value,
    pub invalid_weight: Value,
    pub invalid_status: Value,
}

pub fn invalid_item_data() -> InvalidItemData {
    InvalidItemData {
        missing_title: json!({ "description": "Item without title" }),
        invalid_weight: json!({ "title": "Invalid Weight Item", "weight": "not-a-number" }),
        invalid_status: json!({ "title": "Invalid Status Item", "status": "invalid-status" }),
    }
}

pub fn item_update_data() -> ItemPayload {
    ItemPayload::titled("Updated Item Title")
        .with_description("Updated description")
        .with_location("Updated Location - Recycling Center")
        .with_weight(1.8)
        .with_status(ItemStatus::Processed)
}

pub fn valid_statuses() -> [ItemStatus; 3] {
    ItemStatus::ALL
}

pub fn invalid_statuses() -> [&'static str; 4] {
    ["invalid", "unknown", "completed", ""]
}

/// Create and update bodies for a full CRUD pass
#[derive(Debug, Clone)]
pub struct CrudWorkflowData {
    pub create: ItemPayload,
    pub update: ItemPayload,
}

pub fn crud_workflow_data() -> CrudWorkflowData {
    CrudWorkflowData {
        create: ItemPayload::titled("CRUD Workflow Item")
            .with_description("Item for testing complete CRUD workflow")
            .with_location("Test Environment")
            .with_weight(1.0)
            .with_status(ItemStatus::Pending),
        update: ItemPayload::titled("Updated CRUD Item")
            .with_description("Updated during CRUD workflow test")
            .with_location("Updated Test Environment")
            .with_weight(1.5)
            .with_status(ItemStatus::Collected),
    }
}

/// `count` numbered items with a random weight in [0, 5) and rotating status
pub fn generate_multiple_items(count: usize) -> Vec<ItemPayload> {
    let mut rng = rand::thread_rng();
    let statuses = valid_statuses();

    (1..=count)
        .map(|i| {
            let weight = (rng.gen_range(0.0..5.0_f64) * 100.0).round() / 100.0;
            ItemPayload::titled(&format!("Bulk Test Item {}", i))
                .with_description(&format!("Description for bulk test item {}", i))
                .with_location(&format!("Location {}", i))
                .with_weight(weight)
                .with_status(statuses[i % statuses.len()])
        })
        .collect()
}
