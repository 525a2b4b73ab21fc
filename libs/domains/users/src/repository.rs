use repository::cql::{
    BuildableQuery, DataType, Identifier, OngoingWhereClause, Statement, bind_marker,
    create_keyspace,
};
use repository::{
    BaseRepository, CqlSession, RepositoryError, RepositoryIdentity, Row, SessionProvider, Value,
};
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Users stored in `<keyspace>.<table> (id text PRIMARY KEY, password text)`
///
/// Statements are built once at construction and executed with bound values.
pub struct UserRepository<P: SessionProvider> {
    base: BaseRepository<P, User>,
    insert: Statement,
    update: Statement,
    delete: Statement,
    select_by_id: Statement,
    select_all: Statement,
}

impl<P> UserRepository<P>
where
    P: SessionProvider,
    P::Session: CqlSession<Row = Row>,
{
    /// Create the keyspace (SimpleStrategy with `replication_factor`) and the table
    /// if they are missing
    pub async fn new(
        identity: RepositoryIdentity,
        provider: Arc<P>,
        replication_factor: u32,
    ) -> UserResult<Self> {
        let base: BaseRepository<P, User> = BaseRepository::with_keyspace_validation(
            identity,
            provider,
            Arc::new(User::from_row),
            &move |keyspace: &Identifier| {
                create_keyspace(keyspace)
                    .if_not_exists()
                    .with_simple_strategy(replication_factor)
            },
        )
        .await?;

        base.execute_statement(
            &base
                .create_table_statement()
                .if_not_exists()
                .with_partition_key("id", DataType::Text)
                .with_column("password", DataType::Text),
        )
        .await?;

        let insert = base
            .insert_statement()
            .value("id", bind_marker())
            .value("password", bind_marker())
            .if_not_exists()
            .build();
        let update = base
            .update_statement()
            .set_column("password", bind_marker())
            .where_column("id")
            .is_equal_to(bind_marker())
            .if_exists()
            .build();
        let delete = base
            .delete_statement()
            .where_column("id")
            .is_equal_to(bind_marker())
            .if_exists()
            .build();
        let select_by_id = base
            .select_statement()
            .all()
            .where_column("id")
            .is_equal_to(bind_marker())
            .build();
        let select_all = base.select_statement().all().build();

        Ok(Self {
            base,
            insert,
            update,
            delete,
            select_by_id,
            select_all,
        })
    }

    pub fn identity(&self) -> &RepositoryIdentity {
        self.base.identity()
    }

    /// Insert a user; fails with `OperationNotApplied` if the id is taken
    pub async fn insert_user(&self, user: &User) -> UserResult<()> {
        self.write(
            &self.insert,
            &[Value::from(&user.id), Value::from(&user.password)],
            format!("Couldn't insert user identified by id {}.", user.id),
        )
        .await?;
        tracing::info!(user_id = %user.id, "Created user");
        Ok(())
    }

    /// Replace a user's password; fails with `OperationNotApplied` if the user does not exist
    pub async fn update_user(&self, user: &User) -> UserResult<()> {
        self.write(
            &self.update,
            &[Value::from(&user.password), Value::from(&user.id)],
            format!("Couldn't update user identified by id {}.", user.id),
        )
        .await?;
        tracing::info!(user_id = %user.id, "Updated user");
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        self.write(
            &self.delete,
            &[Value::from(id)],
            format!("Couldn't delete user identified by id {id}."),
        )
        .await?;
        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    pub async fn find_user_by_id(&self, id: &str) -> UserResult<User> {
        self.base
            .apply_with_session(async |session| -> UserResult<User> {
                let result = session
                    .execute_with_values(&self.select_by_id, &[Value::from(id)])
                    .await?;
                let row = result
                    .one()
                    .ok_or_else(|| UserError::NotFound(id.to_string()))?;
                Ok(self.base.transform_row(&row)?)
            })
            .await
    }

    pub async fn find_all_users(&self) -> UserResult<Vec<User>> {
        self.base
            .apply_with_session(async |session| -> UserResult<Vec<User>> {
                let result = session.execute(&self.select_all).await?;
                Ok(self.base.transform_rows(result)?)
            })
            .await
    }

    /// Execute a conditional write, turning `[applied]=false` into `OperationNotApplied`
    async fn write(
        &self,
        statement: &Statement,
        values: &[Value],
        not_applied: String,
    ) -> UserResult<()> {
        self.base
            .execute_with_session(async |session| -> UserResult<()> {
                let result = session.execute_with_values(statement, values).await?;
                if !result.was_applied() {
                    return Err(RepositoryError::not_applied(not_applied).into());
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repository::identity_of;
    use test_utils::{StubSessionProvider, TestDataBuilder};

    async fn repository(provider: &Arc<StubSessionProvider>) -> UserRepository<StubSessionProvider> {
        UserRepository::new(identity_of("games", "users").unwrap(), Arc::clone(provider), 1)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_new_creates_keyspace_then_table() {
        let provider = Arc::new(StubSessionProvider::new());
        repository(&provider).await;

        assert_eq!(
            provider.executed_cql(),
            vec![
                "CREATE KEYSPACE IF NOT EXISTS games WITH replication={'class':'SimpleStrategy','replication_factor':1}",
                "CREATE TABLE IF NOT EXISTS games.users (id text PRIMARY KEY,password text)",
            ]
        );
        assert_eq!(provider.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_insert_binds_id_and_password() {
        let builder = TestDataBuilder::from_test_name("test_insert_binds_id_and_password");
        let provider = Arc::new(StubSessionProvider::new());
        let repo = repository(&provider).await;
        let user = User::new(builder.user_id(), builder.password());

        repo.insert_user(&user).await.unwrap();

        let insert = provider.executed().pop().unwrap();
        assert_eq!(
            insert.cql,
            "INSERT INTO games.users (id,password) VALUES (?,?) IF NOT EXISTS"
        );
        assert_eq!(
            insert.values,
            vec![Value::from(user.id.clone()), Value::from(user.password.clone())]
        );
    }

    #[tokio::test]
    async fn test_insert_existing_user_is_not_applied() {
        let provider = Arc::new(StubSessionProvider::new().with_not_applied("INSERT"));
        let repo = repository(&provider).await;

        let err = repo.insert_user(&User::new("u1", "p")).await.unwrap_err();

        assert!(err.is_not_applied());
        assert_eq!(
            err.to_string(),
            "Operation not applied: Couldn't insert user identified by id u1."
        );
    }

    #[tokio::test]
    async fn test_update_binds_password_before_id() {
        let provider = Arc::new(StubSessionProvider::new());
        let repo = repository(&provider).await;

        repo.update_user(&User::new("u1", "new")).await.unwrap();

        let update = provider.executed().pop().unwrap();
        assert_eq!(
            update.cql,
            "UPDATE games.users SET password=? WHERE id=? IF EXISTS"
        );
        assert_eq!(update.values, vec![Value::from("new"), Value::from("u1")]);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_applied() {
        let provider = Arc::new(StubSessionProvider::new().with_not_applied("DELETE"));
        let repo = repository(&provider).await;

        let err = repo.delete_user("u1").await.unwrap_err();

        assert!(err.is_not_applied());
        assert_eq!(provider.open_sessions(), 0);
    }
}
