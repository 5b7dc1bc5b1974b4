use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{convert::Infallible, fmt, str::FromStr};

/// Record identifier, the backend uses both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(id) => write!(f, "{id}"),
            Id::Str(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => Id::Int(id),
            Err(_) => Id::Str(raw.trim().to_string()),
        }
    }
}

impl FromStr for Id {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Id::from(raw))
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Id::Int(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default, rename = "totalPages")]
    pub total_pages: u64,
}

/// List envelope shared by every paginated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Page {
            data: vec![],
            pagination: Pagination::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticated session. Created by login or register and handed to
/// [ApiClient](super::ApiClient) explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod test {
    use super::{Id, Page, Session};
    use crate::Result;
    use serde_json::json;

    #[test]
    fn id_forms() -> Result<()> {
        assert_eq!(Id::Int(7), serde_json::from_value(json!(7))?);
        assert_eq!(Id::Str("a1".into()), serde_json::from_value(json!("a1"))?);
        assert_eq!(Id::Int(12), Id::from(" 12 "));
        assert_eq!(Id::Str("abc-1".into()), Id::from("abc-1"));
        assert_eq!("12", Id::Int(12).to_string());
        Ok(())
    }

    #[test]
    fn page_defaults() -> Result<()> {
        let page: Page<Id> = serde_json::from_value(json!({}))?;
        assert!(page.data.is_empty());
        assert_eq!(0, page.pagination.total_pages);
        let page: Page<Id> = serde_json::from_value(json!({
            "data": [1, 2],
            "pagination": { "total": 12, "totalPages": 6 }
        }))?;
        assert_eq!(vec![Id::Int(1), Id::Int(2)], page.data);
        assert_eq!(12, page.pagination.total);
        assert_eq!(6, page.pagination.total_pages);
        Ok(())
    }

    #[test]
    fn session() -> Result<()> {
        let session: Session = serde_json::from_value(json!({
            "token": "jwt",
            "user": { "id": 1, "username": "ana", "role": "admin" }
        }))?;
        assert_eq!("jwt", session.token);
        let user = session.user.unwrap();
        assert_eq!(Some("ana".to_string()), user.username);
        assert_eq!(Some(&json!("admin")), user.extra.get("role"));
        Ok(())
    }
}
