use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::database::connection::DatabaseError;
use crate::schema::field::quote_identifier;
use crate::schema::{NewUser, SchemaDefinition, User};

type UserQuery<'q> = QueryAs<'q, Postgres, User, PgArguments>;

/// Reads and writes `User` rows through the registered schema's table and columns
#[derive(Debug, Clone, Copy)]
pub struct UserRepository<'a> {
    pool: &'a PgPool,
    schema: &'a SchemaDefinition,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool, schema: &'a SchemaDefinition) -> Self {
        Self { pool, schema }
    }

    /// Insert a user and return the row as stored. `created` defaults to the
    /// moment of persistence.
    pub async fn insert(&self, input: NewUser) -> Result<User, DatabaseError> {
        let user = User::create(input, persisted_now());

        let sql = self.schema.insert_sql();
        let mut query = sqlx::query_as::<_, User>(&sql).bind(user.id);
        for field in self.schema.fields() {
            query = bind_column(query, &user, field.column)?;
        }
        let stored = query.fetch_one(self.pool).await?;

        tracing::debug!("Inserted user {} into {}", stored.id, self.schema.table());
        Ok(stored)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            "{} WHERE {} = $1 ORDER BY {} LIMIT 1",
            self.schema.select_sql(),
            self.column("username")?,
            self.column("created")?
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        user.ok_or_else(|| DatabaseError::NotFound(format!("User '{}' not found", username)))
    }

    /// Most recently created first
    pub async fn list(&self, limit: i64) -> Result<Vec<User>, DatabaseError> {
        let sql = format!(
            "{} ORDER BY {} DESC LIMIT $1",
            self.schema.select_sql(),
            self.column("created")?
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit.max(0))
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    fn column(&self, field: &str) -> Result<String, DatabaseError> {
        self.schema
            .field(field)
            .map(|f| quote_identifier(f.column))
            .ok_or_else(|| DatabaseError::UnmappedColumn(field.to_string()))
    }
}

/// Postgres keeps microseconds, so stamp at that precision
fn persisted_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn bind_column<'q>(query: UserQuery<'q>, user: &'q User, column: &str) -> Result<UserQuery<'q>, DatabaseError> {
    Ok(match column {
        "first_name" => query.bind(&user.first_name),
        "last_name" => query.bind(&user.last_name),
        "email" => query.bind(&user.email),
        "username" => query.bind(&user.username),
        "password" => query.bind(&user.password),
        "created" => query.bind(user.created),
        "website" => query.bind(&user.website),
        other => return Err(DatabaseError::UnmappedColumn(other.to_string())),
    })
}
