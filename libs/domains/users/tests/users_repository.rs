use domain_users::{User, UserError, UserRepository};
use futures::future::join_all;
use repository::{Row, Value, identity_of};
use std::sync::Arc;
use test_utils::assertions::assert_some;
use test_utils::{StubSessionProvider, TestDataBuilder};

async fn users(provider: &Arc<StubSessionProvider>) -> UserRepository<StubSessionProvider> {
    UserRepository::new(identity_of("games", "users").unwrap(), Arc::clone(provider), 1)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_find_user_by_id() {
    let row = Row::from_pairs([("id", Value::from("u1")), ("password", Value::from("p"))]);
    let provider = Arc::new(StubSessionProvider::new().with_rows("SELECT", vec![row]));
    let repo = users(&provider).await;

    let user = repo.find_user_by_id("u1").await.unwrap();

    assert_eq!(user, User::new("u1", "p"));
    let select = assert_some(provider.executed().pop(), "select by id");
    assert_eq!(select.cql, "SELECT * FROM games.users WHERE id=?");
    assert_eq!(select.values, vec![Value::from("u1")]);
}

#[tokio::test]
async fn test_find_missing_user_is_not_found() {
    let provider = Arc::new(StubSessionProvider::new());
    let repo = users(&provider).await;

    let err = repo.find_user_by_id("u1").await.unwrap_err();

    assert!(matches!(err, UserError::NotFound(ref id) if id == "u1"));
    assert_eq!(err.to_string(), "User not found: u1");
    assert_eq!(provider.open_sessions(), 0);
}

#[tokio::test]
async fn test_find_with_malformed_row_is_row_transformation() {
    let row = Row::from_pairs([("id", Value::from("u1")), ("password", Value::Int(7))]);
    let provider = Arc::new(StubSessionProvider::new().with_rows("SELECT", vec![row]));
    let repo = users(&provider).await;

    let err = repo.find_user_by_id("u1").await.unwrap_err();

    match err {
        UserError::Repository(err) => assert!(err.is_row_transformation()),
        other => panic!("expected row transformation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_row_transformation_error_never_shows_password() {
    let row = Row::from_pairs([("id", Value::Int(1)), ("password", Value::from("hunter2"))]);
    let provider = Arc::new(StubSessionProvider::new().with_rows("SELECT", vec![row]));
    let repo = users(&provider).await;

    let err = repo.find_user_by_id("1").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to transform row Row { id: int, password: text }."
    );
    assert!(!format!("{err:?}").contains("hunter2"));
}

#[tokio::test]
async fn test_find_all_users() {
    let first = TestDataBuilder::new(1);
    let second = TestDataBuilder::new(2);
    let provider = Arc::new(
        StubSessionProvider::new().with_rows("SELECT", vec![first.user_row(), second.user_row()]),
    );
    let repo = users(&provider).await;

    let all = repo.find_all_users().await.unwrap();

    assert_eq!(
        all,
        vec![
            User::new(first.user_id(), first.password()),
            User::new(second.user_id(), second.password()),
        ]
    );
    assert_eq!(
        provider.executed_cql().last().map(String::as_str),
        Some("SELECT * FROM games.users")
    );
}

#[tokio::test]
async fn test_unavailable_cluster_is_repository_error() {
    let provider = Arc::new(StubSessionProvider::failing("no hosts available"));

    let result = UserRepository::new(identity_of("games", "users").unwrap(), provider, 1).await;

    match result {
        Err(UserError::Repository(err)) => assert!(err.is_session_operation()),
        Err(other) => panic!("expected session operation error, got {other:?}"),
        Ok(_) => panic!("construction should fail without sessions"),
    }
}

#[tokio::test]
async fn test_concurrent_lookups_release_every_session() {
    let provider = Arc::new(
        StubSessionProvider::new()
            .with_rows("SELECT", vec![TestDataBuilder::new(1).user_row()])
            .with_error("SELECT", "read timeout"),
    );
    let repo = users(&provider).await;
    let before = provider.acquired();

    let lookups = (0..4).map(|_| repo.find_user_by_id("any"));
    let results = join_all(lookups).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(UserError::NotFound(_))))
            .count(),
        2
    );
    assert_eq!(provider.acquired() - before, 4);
    assert_eq!(provider.open_sessions(), 0);
}

mod live {
    use super::*;
    use test_utils::TestCassandra;

    #[tokio::test]
    #[ignore] // Requires Docker
    async fn test_user_lifecycle_against_cassandra() {
        let cassandra = TestCassandra::new().await;
        let builder = TestDataBuilder::from_test_name("test_user_lifecycle_against_cassandra");
        let identity = identity_of(&builder.keyspace(), "users").unwrap();
        let repo = UserRepository::new(identity, cassandra.provider().await, 1)
            .await
            .unwrap();
        let user = User::new(builder.user_id(), builder.password());

        repo.insert_user(&user).await.unwrap();
        assert!(repo.insert_user(&user).await.unwrap_err().is_not_applied());
        assert_eq!(repo.find_user_by_id(&user.id).await.unwrap(), user);

        let changed = User::new(user.id.clone(), "rotated");
        repo.update_user(&changed).await.unwrap();
        assert_eq!(repo.find_all_users().await.unwrap(), vec![changed]);

        repo.delete_user(&user.id).await.unwrap();
        assert!(repo.find_user_by_id(&user.id).await.unwrap_err().is_not_found());
        assert!(repo.delete_user(&user.id).await.unwrap_err().is_not_applied());
    }
}
