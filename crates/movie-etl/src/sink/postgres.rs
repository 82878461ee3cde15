//! PostgreSQL bulk load through `COPY ... FROM STDIN`.
//!
//! One connection in autocommit mode; DDL, truncate, copy and each index
//! commit on their own.

use super::TableLoader;
use super::csv::write_csv_to;
use super::sql;
use crate::config::DatabaseConfig;
use crate::error::{EtlError, Result};
use crate::types::LoadReport;
use polars::prelude::*;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info};

/// Loads the cleaned table into `<schema>.<table>`.
#[derive(Debug, Clone)]
pub struct PostgresLoader {
    config: DatabaseConfig,
}

impl PostgresLoader {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .database(&self.config.database)
            .username(&self.config.user);

        match &self.config.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    async fn load_async(&self, table: &DataFrame) -> Result<LoadReport> {
        let schema = &self.config.schema;
        let name = &self.config.table;

        info!(
            "Connecting to PostgreSQL: {}@{}:{}/{}",
            self.config.user, self.config.host, self.config.port, self.config.database
        );
        let mut conn = PgConnection::connect_with(&self.connect_options())
            .await
            .map_err(db_error("connect"))?;

        let ddl = sql::create_table_sql(schema, name, table);
        debug!("DDL:\n{}", ddl);
        sqlx::query(&ddl)
            .execute(&mut conn)
            .await
            .map_err(db_error("create table"))?;

        sqlx::query(&sql::truncate_sql(schema, name))
            .execute(&mut conn)
            .await
            .map_err(db_error("truncate"))?;

        let mut payload = Vec::new();
        write_csv_to(table, &mut payload)?;

        let mut copy = conn
            .copy_in_raw(&sql::copy_sql(schema, name, table))
            .await
            .map_err(db_error("copy"))?;
        copy.send(payload).await.map_err(db_error("copy"))?;
        let rows_loaded = copy.finish().await.map_err(db_error("copy"))?;

        for statement in sql::index_sql(schema, name) {
            sqlx::query(&statement)
                .execute(&mut conn)
                .await
                .map_err(db_error("create index"))?;
        }

        conn.close().await.map_err(db_error("close"))?;

        info!(
            "Load complete: {} rows into {}",
            rows_loaded,
            sql::qualified_name(schema, name)
        );

        Ok(LoadReport {
            schema: schema.clone(),
            table: name.clone(),
            rows_loaded,
        })
    }
}

impl TableLoader for PostgresLoader {
    /// Drives the async client on a private current-thread runtime.
    fn load(&self, table: &DataFrame) -> Result<LoadReport> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.load_async(table))
    }
}

fn db_error(stage: &'static str) -> impl Fn(sqlx::Error) -> EtlError {
    move |e| EtlError::Database(format!("{stage} failed: {e}"))
}
