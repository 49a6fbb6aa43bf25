//! Integration tests for the group management routes.
//!
//! These drive the router with `tower::ServiceExt::oneshot` against an
//! in-memory directory backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use adgroups_api::groups_router;
use adgroups_directory::{DirectoryError, DirectoryResult, GroupDirectory};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

const PEOPLE_BASE: &str = "OU=People,DC=example,DC=com";
const GROUP_OU: &str = "OU=Managed,OU=Groups,DC=example,DC=com";

fn user_dn(login: &str) -> String {
    format!("CN={login},{PEOPLE_BASE}")
}

/// In-memory stand-in for the live directory backend.
#[derive(Default)]
struct FakeDirectory {
    /// Existing group names (lowercased).
    groups: HashSet<String>,
    /// Flattened member DNs per group name.
    members: HashMap<String, Vec<String>>,
    /// E-mail lines per group name.
    emails: HashMap<String, Vec<String>>,
    /// Known user logins.
    users: HashSet<String>,
    /// Mutation calls received, for asserting what reached the backend.
    calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    fn with_group(mut self, name: &str, member_dns: Vec<String>) -> Self {
        self.groups.insert(name.to_lowercase());
        self.members.insert(name.to_lowercase(), member_dns);
        self
    }

    fn with_emails(mut self, name: &str, lines: Vec<String>) -> Self {
        self.emails.insert(name.to_lowercase(), lines);
        self
    }

    fn with_user(mut self, login: &str) -> Self {
        self.users.insert(login.to_string());
        self
    }

    fn require_group(&self, name: &str) -> DirectoryResult<()> {
        if self.groups.contains(&name.to_lowercase()) {
            Ok(())
        } else {
            Err(DirectoryError::GroupNotFound {
                name: name.to_string(),
            })
        }
    }

    fn require_users(&self, logins: &[String]) -> DirectoryResult<()> {
        for login in logins {
            if !self.users.contains(login) {
                return Err(DirectoryError::UserNotFound {
                    login: login.clone(),
                });
            }
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroupDirectory for FakeDirectory {
    async fn create_group(&self, name: &str) -> DirectoryResult<String> {
        let cn = name.to_uppercase();
        let dn = format!("CN={cn},{GROUP_OU}");
        if self.groups.contains(&name.to_lowercase()) {
            return Err(DirectoryError::AlreadyExists { dn });
        }
        self.record(format!("create:{cn}"));
        Ok(dn)
    }

    async fn delete_group(&self, name: &str) -> DirectoryResult<()> {
        self.require_group(name)?;
        self.record(format!("delete:{name}"));
        Ok(())
    }

    async fn members_of_group(&self, name: &str) -> DirectoryResult<Vec<String>> {
        self.require_group(name)?;
        Ok(self.members[&name.to_lowercase()].clone())
    }

    async fn emails_for_group(&self, name: &str) -> DirectoryResult<Vec<String>> {
        self.require_group(name)?;
        Ok(self.emails.get(&name.to_lowercase()).cloned().unwrap_or_default())
    }

    async fn add_users_to_group(&self, logins: &[String], name: &str) -> DirectoryResult<()> {
        self.require_group(name)?;
        self.require_users(logins)?;
        self.record(format!("add:{name}:{}", logins.join(",")));
        Ok(())
    }

    async fn remove_users_from_group(&self, logins: &[String], name: &str) -> DirectoryResult<()> {
        self.require_group(name)?;
        self.require_users(logins)?;
        self.record(format!("remove:{name}:{}", logins.join(",")));
        Ok(())
    }

    async fn add_group_to_group(&self, child: &str, parent: &str) -> DirectoryResult<()> {
        self.require_group(parent)?;
        self.require_group(child)?;
        self.record(format!("nest:{child}->{parent}"));
        Ok(())
    }
}

fn test_app(fake: Arc<FakeDirectory>) -> Router {
    Router::new().nest("/groups", groups_router(fake))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_create_group_returns_201() {
    let fake = Arc::new(FakeDirectory::default());
    let app = test_app(fake.clone());

    let response = app
        .oneshot(empty_request("POST", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(fake.calls(), vec!["create:INFRA"]);
}

#[tokio::test]
async fn test_create_duplicate_group_returns_409() {
    let fake = Arc::new(FakeDirectory::default().with_group("infra", vec![]));
    let app = test_app(fake);

    let response = app
        .oneshot(empty_request("POST", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_group_returns_204() {
    let fake = Arc::new(FakeDirectory::default().with_group("infra", vec![]));
    let app = test_app(fake.clone());

    let response = app
        .oneshot(empty_request("DELETE", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(fake.calls(), vec!["delete:infra"]);
}

#[tokio::test]
async fn test_list_members_plain_text_newline_joined() {
    let fake = Arc::new(
        FakeDirectory::default().with_group("infra", vec![user_dn("alice"), user_dn("bob")]),
    );
    let app = test_app(fake);

    let response = app
        .oneshot(empty_request("GET", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = body_string(response).await;
    assert_eq!(body, format!("{}\n{}", user_dn("alice"), user_dn("bob")));
}

#[tokio::test]
async fn test_list_members_empty_group_returns_empty_body() {
    let fake = Arc::new(FakeDirectory::default().with_group("infra", vec![]));
    let app = test_app(fake);

    let response = app
        .oneshot(empty_request("GET", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_unknown_group_returns_404_problem() {
    let fake = Arc::new(FakeDirectory::default());
    let app = test_app(fake);

    let response = app
        .oneshot(empty_request("GET", "/groups/ghost"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], 404);
    assert_eq!(json["title"], "Not Found");
    assert!(json["type"].as_str().unwrap().contains("not-found"));
}

#[tokio::test]
async fn test_list_emails() {
    let fake = Arc::new(
        FakeDirectory::default()
            .with_group("infra", vec![user_dn("alice")])
            .with_emails(
                "infra",
                vec![
                    "alice@example.com Alice Adams".to_string(),
                    "bob@example.com Bob Brown".to_string(),
                ],
            ),
    );
    let app = test_app(fake);

    let response = app
        .oneshot(empty_request("GET", "/groups/infra/emails"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "alice@example.com Alice Adams\nbob@example.com Bob Brown"
    );
}

#[tokio::test]
async fn test_add_users_returns_204() {
    let fake = Arc::new(
        FakeDirectory::default()
            .with_group("infra", vec![])
            .with_user("alice")
            .with_user("bob"),
    );
    let app = test_app(fake.clone());

    let response = app
        .oneshot(json_request(
            "PUT",
            "/groups/infra/users",
            r#"{"users": ["alice", "bob"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(fake.calls(), vec!["add:infra:alice,bob"]);
}

#[tokio::test]
async fn test_add_unknown_user_returns_404() {
    let fake = Arc::new(FakeDirectory::default().with_group("infra", vec![]));
    let app = test_app(fake);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/groups/infra/users",
            r#"{"users": ["ghost"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_users_list_returns_400_without_backend_call() {
    let fake = Arc::new(FakeDirectory::default().with_group("infra", vec![]));
    let app = test_app(fake.clone());

    let response = app
        .oneshot(json_request("PUT", "/groups/infra/users", r#"{"users": []}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_remove_users_returns_204() {
    let fake = Arc::new(
        FakeDirectory::default()
            .with_group("infra", vec![])
            .with_user("alice"),
    );
    let app = test_app(fake.clone());

    let response = app
        .oneshot(json_request(
            "DELETE",
            "/groups/infra/users",
            r#"{"users": ["alice"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(fake.calls(), vec!["remove:infra:alice"]);
}

#[tokio::test]
async fn test_nest_group_returns_204() {
    let fake = Arc::new(
        FakeDirectory::default()
            .with_group("parent", vec![])
            .with_group("child", vec![]),
    );
    let app = test_app(fake.clone());

    let response = app
        .oneshot(empty_request("PUT", "/groups/parent/sam/child"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(fake.calls(), vec!["nest:child->parent"]);
}

#[tokio::test]
async fn test_directory_unavailable_returns_502() {
    struct DownDirectory;

    #[async_trait]
    impl GroupDirectory for DownDirectory {
        async fn create_group(&self, _name: &str) -> DirectoryResult<String> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn delete_group(&self, _name: &str) -> DirectoryResult<()> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn members_of_group(&self, _name: &str) -> DirectoryResult<Vec<String>> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn emails_for_group(&self, _name: &str) -> DirectoryResult<Vec<String>> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn add_users_to_group(
            &self,
            _logins: &[String],
            _name: &str,
        ) -> DirectoryResult<()> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn remove_users_from_group(
            &self,
            _logins: &[String],
            _name: &str,
        ) -> DirectoryResult<()> {
            Err(DirectoryError::AuthenticationFailed)
        }
        async fn add_group_to_group(&self, _child: &str, _parent: &str) -> DirectoryResult<()> {
            Err(DirectoryError::AuthenticationFailed)
        }
    }

    let app = Router::new().nest("/groups", groups_router(Arc::new(DownDirectory)));

    let response = app
        .oneshot(empty_request("GET", "/groups/infra"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], 502);
}
