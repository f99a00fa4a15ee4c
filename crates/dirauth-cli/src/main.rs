// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dirauth_config::{
	load_config, load_config_with_file, load_password_env, DirauthConfig, LogFormat,
};
use dirauth_core::{
	hash_password, Credential, DirectoryLoginBackend, GroupPolicyResolver, LeaseState,
	LoginOutcome, Password, RenewOutcome, RenewRequest, SessionState, StaticDirectory,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PASSWORD_ENV: &str = "DIRAUTH_PASSWORD";

/// dirauth - directory credential login and session renewal
#[derive(Parser, Debug)]
#[command(name = "dirauth", version, about, long_about = None)]
struct Args {
	/// Path to configuration file [default: /etc/dirauth/dirauth.toml]
	#[arg(short, long, env = "DIRAUTH_CONFIG")]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Authenticate against the directory and print the issued session
	Login {
		#[arg(short, long)]
		username: String,

		/// Password; falls back to DIRAUTH_PASSWORD or DIRAUTH_PASSWORD_FILE
		#[arg(short, long)]
		password: Option<String>,

		/// Write the session metadata here for a later `renew`
		#[arg(long)]
		session_out: Option<PathBuf>,
	},

	/// Renew a session previously written by `login --session-out`
	Renew {
		#[arg(short, long)]
		session: PathBuf,

		/// Override the session issue time (RFC 3339)
		#[arg(long)]
		issued_at: Option<DateTime<Utc>>,
	},

	/// Hash DIRAUTH_PASSWORD for use in a directory users file
	HashPassword,

	/// Print the resolved configuration
	Config,
}

/// What `login --session-out` persists.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct SessionFile {
	issued_at: DateTime<Utc>,
	metadata: BTreeMap<String, String>,
}

fn init_tracing(config: &DirauthConfig, args: &Args) {
	let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	let format = if args.json_logs {
		LogFormat::Json
	} else {
		config.logging.format
	};

	// Logs go to stderr; stdout carries command output.
	match format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

type Backend = DirectoryLoginBackend<GroupPolicyResolver<StaticDirectory>>;

fn build_backend(config: &DirauthConfig) -> Result<Backend> {
	let Some(users_file) = &config.directory.users_file else {
		bail!("no directory configured: set directory.users_file or DIRAUTH_DIRECTORY_USERS_FILE");
	};
	let directory = StaticDirectory::load(users_file).context("failed to load directory")?;
	let resolver =
		GroupPolicyResolver::new(directory).with_deny_unmapped(config.directory.deny_unmapped);
	Ok(DirectoryLoginBackend::new(
		Arc::new(resolver),
		config.backend_config(),
	))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!(
		"{}",
		serde_json::to_string_pretty(value).context("failed to encode output")?
	);
	Ok(())
}

async fn write_session_file(path: &Path, session: &SessionFile) -> Result<()> {
	let content = serde_json::to_vec_pretty(session).context("failed to encode session")?;

	#[cfg(unix)]
	{
		use tokio::fs::OpenOptions;
		use tokio::io::AsyncWriteExt;

		let mut file = OpenOptions::new()
			.write(true)
			.create(true)
			.truncate(true)
			.mode(0o600)
			.open(path)
			.await
			.with_context(|| format!("failed to open {}", path.display()))?;
		file.write_all(&content).await?;
	}

	#[cfg(not(unix))]
	{
		tokio::fs::write(path, &content)
			.await
			.with_context(|| format!("failed to write {}", path.display()))?;
	}

	Ok(())
}

async fn read_session_file(path: &Path) -> Result<SessionFile> {
	let content = tokio::fs::read(path)
		.await
		.with_context(|| format!("failed to read session file {}", path.display()))?;
	serde_json::from_slice(&content)
		.with_context(|| format!("invalid session file {}", path.display()))
}

async fn run_login(
	config: &DirauthConfig,
	username: String,
	password: Option<String>,
	session_out: Option<PathBuf>,
) -> Result<ExitCode> {
	let password = match password {
		Some(password) => Password::from(password),
		None => load_password_env(PASSWORD_ENV)?
			.with_context(|| format!("no password given: pass --password or set {PASSWORD_ENV}"))?,
	};

	let backend = build_backend(config)?;
	let outcome = backend.login(Credential::new(username, password)).await?;

	if let (LoginOutcome::Authenticated(auth), Some(path)) = (&outcome, &session_out) {
		let session = SessionFile {
			issued_at: Utc::now(),
			metadata: auth.metadata.to_map(),
		};
		write_session_file(path, &session).await?;
		info!(path = %path.display(), "session written");
	}

	let code = if outcome.is_authenticated() {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	};
	match outcome.into_response() {
		Some(response) => print_json(&response)?,
		None => eprintln!("login denied"),
	}
	Ok(code)
}

async fn run_renew(
	config: &DirauthConfig,
	session: &Path,
	issued_at: Option<DateTime<Utc>>,
) -> Result<ExitCode> {
	let stored = read_session_file(session).await?;
	let lease = LeaseState::issued_at(issued_at.unwrap_or(stored.issued_at));
	let request = RenewRequest::from_metadata(&stored.metadata, lease)
		.context("session file is missing login metadata")?;

	let backend = build_backend(config)?;
	let outcome: RenewOutcome = backend.renew(request).await?;
	let state = SessionState::Active.apply(&outcome);
	debug!(state = ?state, "renewal applied");

	match outcome.into_response() {
		Some(response) => print_json(&response)?,
		None => eprintln!("renewal denied"),
	}
	Ok(if state.is_terminal() {
		ExitCode::FAILURE
	} else {
		ExitCode::SUCCESS
	})
}

fn run_hash_password() -> Result<ExitCode> {
	let password = load_password_env(PASSWORD_ENV)?
		.with_context(|| format!("set {PASSWORD_ENV} or {PASSWORD_ENV}_FILE to the password to hash"))?;
	if password.is_empty() {
		bail!("refusing to hash an empty password");
	}
	println!("{}", hash_password(&password)?);
	Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;
	init_tracing(&config, &args);
	config.log_summary();

	match args.command {
		Command::Login {
			username,
			password,
			session_out,
		} => run_login(&config, username, password, session_out).await,
		Command::Renew { session, issued_at } => run_renew(&config, &session, issued_at).await,
		Command::HashPassword => run_hash_password(),
		Command::Config => {
			print_json(&config)?;
			Ok(ExitCode::SUCCESS)
		}
	}
}
