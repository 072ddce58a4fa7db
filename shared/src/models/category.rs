//! Category Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category entity (菜品分类)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Embedded category reference, as returned by `categories(name)` embeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
