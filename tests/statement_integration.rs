//! Integration tests for statements and sessions.
//!
//! A small in-memory session stands in for the remote service so execution
//! paths can be checked without a network.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use trackql::prelude::*;
use trackql::{ErrorCode, Input, Values};

/// In-memory session returning canned results and recording every call.
#[derive(Default)]
struct MemorySession {
    results: Vec<EntityRef>,
    log: Mutex<Vec<String>>,
}

impl MemorySession {
    fn with_results(entity_type: &str, ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            results: ids.iter().map(|id| EntityRef::new(entity_type, *id)).collect(),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Session for MemorySession {
    fn query(&self, query: &str, page_size: Option<u32>) -> QueryResult<Vec<EntityRef>> {
        self.log
            .lock()
            .unwrap()
            .push(format!("query {query} [{page_size:?}]"));
        Ok(self.results.clone())
    }

    fn create(&self, entity_type: &str, values: &Values) -> QueryResult<EntityRef> {
        let keys: Vec<&str> = values.keys().map(|k| k.as_str()).collect();
        self.log
            .lock()
            .unwrap()
            .push(format!("create {entity_type} {}", keys.join(",")));
        Ok(EntityRef::new(entity_type, "created"))
    }

    fn update(&self, entity: &EntityRef, values: &Values) -> QueryResult<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("update {} {}", entity.id, values.len()));
        Ok(())
    }

    fn delete(&self, entity: &EntityRef) -> QueryResult<()> {
        self.log.lock().unwrap().push(format!("delete {}", entity.id));
        Ok(())
    }
}

/// Session whose queries always fail.
struct BrokenSession;

impl Session for BrokenSession {
    fn query(&self, query: &str, _page_size: Option<u32>) -> QueryResult<Vec<EntityRef>> {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "server down");
        Err(QueryError::session(query, io))
    }

    fn create(&self, _entity_type: &str, _values: &Values) -> QueryResult<EntityRef> {
        unreachable!("not used")
    }

    fn update(&self, _entity: &EntityRef, _values: &Values) -> QueryResult<()> {
        unreachable!("not used")
    }

    fn delete(&self, _entity: &EntityRef) -> QueryResult<()> {
        unreachable!("not used")
    }
}

#[test]
fn test_select_rendering() {
    let stmt = select(["Task.parent", "Task.children"])
        .unwrap()
        .where_(args![name = "Test"])
        .unwrap()
        .sort("id desc")
        .unwrap()
        .limit(1);
    assert_eq!(
        stmt.to_string(),
        r#"select parent, children from Task where name is "Test" order by id descending limit 1"#
    );
}

#[test]
fn test_select_execution_uses_raw_query() {
    let session = MemorySession::with_results("Task", &["1", "2", "3"]);
    let stmt = select(["Task"])
        .unwrap()
        .where_(attr("status.name").equals("wip"))
        .unwrap()
        .page_size(2)
        .bind(session.clone());

    let results = stmt.all().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(
        session.calls(),
        vec![r#"query Task where status.name is "wip" [Some(2)]"#.to_string()]
    );
}

#[test]
fn test_unbound_session() {
    let err = select(["Task"]).unwrap().one().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnboundSession);
    assert_eq!(err.context.entity_type.as_deref(), Some("Task"));

    let err = update("Task").execute().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnboundSession);
    let err = delete("Task").execute().unwrap_err();
    assert_eq!(err.code, ErrorCode::UnboundSession);
}

#[test]
fn test_session_failure_propagates() {
    let stmt = Select::new("Task").bind(Arc::new(BrokenSession));
    let err = stmt.all().unwrap_err();
    assert_eq!(err.code, ErrorCode::SessionFailed);
    assert!(!err.is_usage());
    assert_eq!(err.context.query.as_deref(), Some("Task"));
}

#[test]
fn test_keyword_subquery_resolves_one_entity() {
    let schemas = MemorySession::with_results("ProjectSchema", &["42"]);
    let schema = select(["ProjectSchema"])
        .unwrap()
        .where_(args![name = "VFX"])
        .unwrap()
        .bind(schemas.clone());

    let stmt = select(["Project"])
        .unwrap()
        .where_(Args::new().kw("name", "demo").kw_query("project_schema", schema))
        .unwrap();
    assert_eq!(
        stmt.raw_query(),
        r#"Project where name is "demo" and project_schema.id is "42""#
    );
    assert_eq!(
        schemas.calls(),
        vec![r#"query ProjectSchema where name is "VFX" [None]"#.to_string()]
    );
}

#[test]
fn test_keyword_subquery_must_match_once() {
    let none = select(["User"]).unwrap().bind(MemorySession::with_results("User", &[]));
    let err = and_(Args::new().kw_query("user", none)).unwrap_err();
    assert_eq!(err.code, ErrorCode::AmbiguousSubqueryResult);
}

#[test]
fn test_positional_subquery_flattens_filters() {
    let shots = select(["Shot"])
        .unwrap()
        .where_(args![attr("name").starts_with("sh"), status = "wip"])
        .unwrap();
    let f = or_!(shots, attr("name").equals("extra")).unwrap();
    assert_eq!(
        f.as_str(),
        r#"(name like "sh%" or status is "wip" or name is "extra")"#
    );
    let f = and_(Input::from(select(["Shot"]).unwrap())).unwrap();
    assert!(f.is_empty());
}

#[test]
fn test_in_query_projects_id() {
    let users = select(["User"]).unwrap().where_(args![username = "bob"]).unwrap();
    assert_eq!(
        attr("assignments.resource").in_query(&users).as_str(),
        r#"assignments.resource.id in (select id from User where username is "bob")"#
    );
}

#[test]
fn test_create_update_delete() {
    let session = MemorySession::with_results("Task", &["7", "8"]);

    let created = create("Task")
        .set("name", "New Task")
        .set("bid", 1.5)
        .bind(session.clone())
        .execute()
        .unwrap();
    assert_eq!(created.id, "created");

    let updated = update("Task")
        .where_(args![name = "Old Task"])
        .unwrap()
        .set("name", "New Task")
        .bind(session.clone())
        .execute()
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = delete("Task")
        .where_(args![name = "My Task"])
        .unwrap()
        .limit(1)
        .bind(session.clone())
        .execute()
        .unwrap();
    assert_eq!(deleted, 2);

    assert_eq!(
        session.calls(),
        vec![
            "create Task name,bid".to_string(),
            r#"query Task where name is "Old Task" [None]"#.to_string(),
            "update 7 1".to_string(),
            "update 8 1".to_string(),
            r#"query Task where name is "My Task" limit 1 [None]"#.to_string(),
            "delete 7".to_string(),
            "delete 8".to_string(),
        ]
    );
}

#[test]
fn test_statement_previews() {
    assert_eq!(
        create("Task").set("name", "New Task").to_string(),
        "create Task(name='New Task')"
    );
    assert_eq!(update("Task").to_string(), "update Task set ()");
    assert_eq!(
        update("Task")
            .where_(args![name = "Old Task"])
            .unwrap()
            .set("name", "New Task")
            .to_string(),
        r#"update Task where name is "Old Task" set (name='New Task')"#
    );
    assert_eq!(delete("Task").to_string(), "delete Task");
}
