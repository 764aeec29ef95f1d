//! Category endpoint payloads and responses.

use serde::{Deserialize, Serialize};

/// A category record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `GET /category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

/// Request body for `POST /category/new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategoryPayload {
    pub name: String,
}

/// Body of a successful category creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategoryResponse {
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        let json = r#"{"id":"c1","name":"jazz","createdAt":"2024-01-01","updatedAt":"2024-01-02"}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.name, "jazz");
        assert_eq!(category.created_at, "2024-01-01");
    }
}
