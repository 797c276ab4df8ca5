//! Category entity.

use crate::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description,
        }
    }
}
