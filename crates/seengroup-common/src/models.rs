//! Domain records as the backend serves them, plus the filter sets used to
//! query them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Career ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub requirements: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: String,
    pub department: Option<String>,
    pub salary: Option<String>,
    pub responsibilities: Option<String>,
    pub posted_date: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn bool_true() -> bool { true }

/// Application record as returned by `GET /api/career/applications`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendApplication {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub resume_url: Option<String>,
    pub cover_letter: Option<String>,
    pub jobs: Option<BackendApplicationJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendApplicationJob {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
}

/// Application in the shape the admin table consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_url: String,
    pub cover_letter: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<ApplicationJob>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationJob {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub is_active: bool,
    pub description: String,
    pub requirements: String,
    pub benefits: Vec<String>,
    pub skills: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BackendApplication> for Application {
    fn from(app: BackendApplication) -> Self {
        let updated_at = app.updated_at.unwrap_or_else(|| app.created_at.clone());
        let job = app.jobs.map(|j| ApplicationJob {
            id: j.id,
            title: j.title,
            job_type: j.job_type,
            location: j.location,
            is_active: true,
            description: String::new(),
            requirements: String::new(),
            benefits: Vec::new(),
            skills: Vec::new(),
            created_at: app.created_at.clone(),
            updated_at: updated_at.clone(),
        });
        Application {
            id: app.id,
            name: app.name,
            email: app.email,
            phone: app.phone.unwrap_or_default(),
            resume_url: app.resume_url.unwrap_or_default(),
            cover_letter: app.cover_letter.unwrap_or_default(),
            status: app.status,
            created_at: app.created_at,
            updated_at,
            job,
        }
    }
}

/// Public job-board filters. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
}

impl JobFilters {
    /// Cache key: `search-department-location-type`.
    pub fn fingerprint(&self) -> String {
        format!("{}-{}-{}-{}", self.search, self.department, self.location, self.job_type)
    }

    /// Non-empty filters as query pairs, in a fixed order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("department", &self.department),
            ("location", &self.location),
            ("type", &self.job_type),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k, v.clone()))
        .collect()
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    #[serde(default = "bool_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub oem_number: Option<String>,
    pub manufacturer: Option<String>,
    /// Backend sends either a string or a number.
    pub price: Option<serde_json::Value>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: String,
    pub subcategory_id: Option<String>,
    #[serde(default = "bool_true")]
    pub is_active: bool,
    pub category: Option<CategoryRef>,
    pub subcategory: Option<CategoryRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category_id: String,
}

impl ProductFilters {
    pub fn fingerprint(&self) -> String {
        format!("{}-{}", self.search, self.category_id)
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [("search", &self.search), ("categoryId", &self.category_id)]
            .into_iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }
}
