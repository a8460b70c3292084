use crate::error::{CoreError, Result};
use crate::time::UtcDateTime;
use serde::{Deserialize, Serialize};

/// A surgeon roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub phone: String,
    #[serde(rename = "createdAt")]
    pub created_at: UtcDateTime,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UtcDateTime>,
}

/// Input payload for adding or updating a roster entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub phone: String,
}

impl DoctorDraft {
    pub fn build(self, created_at: UtcDateTime) -> Result<Doctor> {
        if self.name.is_empty() {
            return Err(CoreError::missing_field("name"));
        }
        Ok(Doctor {
            id: String::new(),
            name: self.name,
            specialization: self.specialization,
            phone: self.phone,
            created_at,
            updated_at: None,
        })
    }
}
