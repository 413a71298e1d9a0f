use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Company record as exchanged with the rpel server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub id: i64,
    pub name: Option<String>,
    pub address: Option<String>,
    pub scope_id: Option<i64>,
    pub note: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<i64>,
    #[serde(default)]
    pub faxes: Vec<i64>,
    #[serde(default, skip_serializing)]
    pub practices: Vec<PracticeList>,
    #[serde(default, skip_serializing)]
    pub contacts: Vec<ContactShort>,
}

/// `{id, name}` pair used by select lists (scopes, kinds, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub id: i64,
    pub name: Option<String>,
}

impl SelectItem {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Training session referencing a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeList {
    pub id: i64,
    pub company_id: Option<i64>,
    pub company_name: Option<String>,
    pub kind_id: Option<i64>,
    pub kind_name: Option<String>,
    pub kind_short_name: Option<String>,
    pub topic: Option<String>,
    pub date_of_practice: Option<NaiveDate>,
    pub date_str: Option<String>,
}

impl PracticeList {
    /// Row text shown in the company form: `date - kind - topic`
    pub fn summary(&self) -> String {
        let date = match (&self.date_str, self.date_of_practice) {
            (Some(s), _) => s.clone(),
            (None, Some(d)) => d.format("%d.%m.%y").to_string(),
            (None, None) => String::new(),
        };
        format!(
            "{} - {} - {}",
            date,
            self.kind_name.as_deref().unwrap_or(""),
            self.topic.as_deref().unwrap_or("")
        )
    }

    pub fn link(&self) -> String {
        format!("/practice/{}", self.id)
    }
}

/// Staff member referencing a company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactShort {
    pub id: i64,
    pub name: Option<String>,
    pub department_name: Option<String>,
    pub post_name: Option<String>,
    pub post_go_name: Option<String>,
}

impl ContactShort {
    pub fn summary(&self) -> String {
        format!(
            "{} - {}",
            self.name.as_deref().unwrap_or(""),
            self.post_name.as_deref().unwrap_or("")
        )
    }

    pub fn link(&self) -> String {
        format!("/contact/{}", self.id)
    }
}
