//! Scratch Postgres databases for integration tests.
//!
//! Point `ESTATE_PG_DSN` at a server the tests may create databases on. Each
//! [`TestDatabase`] lives on that server under a random name and is dropped when the handle is
//! cleaned up or goes out of scope.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

pub const DSN_ENV: &str = "ESTATE_PG_DSN";

const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}

pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(server_dsn: &str) -> Result<Self> {
		let server = PgConnectOptions::from_str(server_dsn).map_err(Error::InvalidDsn)?;
		let (maintenance, mut conn) = open_maintenance(&server).await?;
		let name = format!("estate_test_{}", Uuid::new_v4().simple());

		sqlx::raw_sql(&format!(r#"CREATE DATABASE "{name}""#))
			.execute(&mut conn)
			.await
			.map_err(|source| Error::Create { name: name.clone(), source })?;

		let dsn = server.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database now and reports failures instead of printing them.
	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = std::mem::take(&mut self.name);
		let maintenance = self.maintenance.clone();
		// The owning runtime may be shutting down, so the drop runs on a private one.
		let handle = thread::spawn(move || -> Result<()> {
			let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

			runtime.block_on(drop_database(&name, &maintenance))
		});

		match handle.join() {
			Ok(Err(err)) => eprintln!("Test database cleanup failed: {err}."),
			Err(_) => eprintln!("Test database cleanup thread panicked."),
			Ok(Ok(())) => {},
		}
	}
}

async fn open_maintenance(server: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failure = None;

	for database in MAINTENANCE_DATABASES {
		let options = server.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failure = Some(err),
		}
	}

	Err(Error::AdminUnavailable(failure.unwrap_or(sqlx::Error::PoolClosed)))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let drop_err = |source| Error::Drop { name: name.to_string(), source };
	let mut conn = PgConnection::connect_with(maintenance).await.map_err(drop_err)?;

	sqlx::raw_sql(&format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#))
		.execute(&mut conn)
		.await
		.map_err(drop_err)?;

	conn.close().await.map_err(drop_err)?;

	Ok(())
}
