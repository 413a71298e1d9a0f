//! JSON command envelope spoken by the rpel server
//!
//! Every request is a `ClientMessage` text frame; the server answers with a
//! `ServerMessage` carrying the same `id`. Enums use serde's default external
//! tagging, e.g. `{"Get": {"Item": {"name": "Company", "id": 5}}}`.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RpelError};
use crate::models::{Company, SelectItem};

/// Record kind handled by this client
pub const COMPANY: &str = "Company";
/// Select list holding every scope
pub const SCOPE_SELECT: &str = "ScopeSelect";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub id: i64,
}

impl Item {
    pub fn new(name: &str, id: i64) -> Self {
        Self {
            name: name.to_string(),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Object {
    Item(Item),
    List(String),
}

/// Payloads the server knows how to store or return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DbObject {
    Company(Box<Company>),
    SelectItem(Vec<SelectItem>),
}

impl DbObject {
    pub fn name(&self) -> &'static str {
        match self {
            DbObject::Company(_) => "Company",
            DbObject::SelectItem(_) => "SelectItem",
        }
    }

    pub fn into_company(self) -> Result<Company> {
        match self {
            DbObject::Company(company) => Ok(*company),
            other => Err(RpelError::UnexpectedPayload {
                expected: "Company",
                got: other.name().to_string(),
            }),
        }
    }

    pub fn into_select_items(self) -> Result<Vec<SelectItem>> {
        match self {
            DbObject::SelectItem(items) => Ok(items),
            other => Err(RpelError::UnexpectedPayload {
                expected: "SelectItem",
                got: other.name().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Get(Object),
    Insert(DbObject),
    Update(DbObject),
    Delete(Item),
}

impl Command {
    /// Short label used in logs and error messages
    pub fn label(&self) -> String {
        match self {
            Command::Get(Object::Item(item)) => format!("Get {} {}", item.name, item.id),
            Command::Get(Object::List(name)) => format!("Get {}", name),
            Command::Insert(object) => format!("Insert-{}", object.name()),
            Command::Update(object) => format!("Update-{}", object.name()),
            Command::Delete(item) => format!("Delete-{} {}", item.name, item.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub id: i64,
    pub command: Command,
    pub addon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageData {
    Null,
    DBData(DbObject),
    ResultInt(i64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerMessage {
    pub id: i64,
    pub command: String,
    pub data: MessageData,
    #[serde(default)]
    pub error: String,
}

impl ServerMessage {
    /// Turn the reply into its payload, or the server-reported error
    pub fn into_result(self) -> Result<MessageData> {
        if self.error.is_empty() {
            Ok(self.data)
        } else {
            Err(RpelError::Server {
                command: self.command,
                message: self.error,
            })
        }
    }
}

impl MessageData {
    pub fn into_object(self) -> Result<DbObject> {
        match self {
            MessageData::DBData(object) => Ok(object),
            other => Err(RpelError::UnexpectedPayload {
                expected: "DBData",
                got: format!("{:?}", other),
            }),
        }
    }

    pub fn into_int(self) -> Result<i64> {
        match self {
            MessageData::ResultInt(value) => Ok(value),
            other => Err(RpelError::UnexpectedPayload {
                expected: "ResultInt",
                got: format!("{:?}", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_item_envelope() {
        let message = ClientMessage {
            id: 3,
            command: Command::Get(Object::Item(Item::new(COMPANY, 12))),
            addon: "token".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "id": 3,
                "command": {"Get": {"Item": {"name": "Company", "id": 12}}},
                "addon": "token"
            })
        );
    }

    #[test]
    fn test_list_and_delete_envelopes() {
        let list = Command::Get(Object::List(SCOPE_SELECT.to_string()));
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!({"Get": {"List": "ScopeSelect"}})
        );

        let delete = Command::Delete(Item::new(COMPANY, 9));
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({"Delete": {"name": "Company", "id": 9}})
        );
        assert_eq!(delete.label(), "Delete-Company 9");
    }

    #[test]
    fn test_insert_envelope_wraps_company() {
        let company = Company {
            name: Some("Ромашка".to_string()),
            phones: vec![4951234567],
            ..Default::default()
        };
        let command = Command::Insert(DbObject::Company(Box::new(company)));
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["Insert"]["Company"]["name"], "Ромашка");
        assert_eq!(value["Insert"]["Company"]["id"], 0);
        assert_eq!(value["Insert"]["Company"]["phones"], json!([4951234567i64]));
    }

    #[test]
    fn test_server_message_with_company() {
        let raw = r#"{
            "id": 3,
            "command": "Company",
            "data": {"DBData": {"Company": {"id": 12, "name": "Ромашка", "address": null,
                "scope_id": 2, "note": null, "emails": [], "phones": [], "faxes": [],
                "practices": [], "contacts": []}}},
            "error": ""
        }"#;
        let message: ServerMessage = serde_json::from_str(raw).unwrap();
        let company = message
            .into_result()
            .unwrap()
            .into_object()
            .unwrap()
            .into_company()
            .unwrap();
        assert_eq!(company.id, 12);
        assert_eq!(company.scope_id, Some(2));
    }

    #[test]
    fn test_server_message_error() {
        let raw = r#"{"id": 5, "command": "Delete-Company", "data": "Null", "error": "not auth"}"#;
        let message: ServerMessage = serde_json::from_str(raw).unwrap();
        match message.into_result() {
            Err(RpelError::Server { command, message }) => {
                assert_eq!(command, "Delete-Company");
                assert_eq!(message, "not auth");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_result_int_and_payload_mismatch() {
        let raw = r#"{"id": 1, "command": "Insert-Company", "data": {"ResultInt": 42}, "error": ""}"#;
        let message: ServerMessage = serde_json::from_str(raw).unwrap();
        let data = message.into_result().unwrap();
        assert!(data.clone().into_object().is_err());
        assert_eq!(data.into_int().unwrap(), 42);

        let scopes = DbObject::SelectItem(vec![SelectItem::new(1, "Торговля")]);
        assert!(scopes.clone().into_company().is_err());
        assert_eq!(scopes.into_select_items().unwrap().len(), 1);
    }
}
