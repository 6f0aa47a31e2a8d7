use crate::core::client::StorageClient;
use crate::core::config::Config;
use crate::core::download::{Downloader, TransferReport};
use crate::core::dropbox::DropboxClient;
use crate::core::path::validate_path;
use crate::core::plan::{build_plan, default_destination};
use crate::error::{DbxError, Result};
use dialoguer::Password;
use indicatif::BinaryBytes;
use tracing::info;

/// Validated arguments of one `get` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub source: String,
    pub destination: String,
    pub recurse: bool,
}

impl GetRequest {
    /// Build a request from the positional `<source> [<destination>]` arguments.
    pub fn from_args(args: &[String], recurse: bool) -> Result<Self> {
        if args.is_empty() || args.len() > 2 {
            return Err(DbxError::argument_error(
                "`get` requires `src` and/or `dst` arguments",
            ));
        }

        let source = validate_path(&args[0])?;
        let destination = match args.get(1) {
            Some(destination) => destination.clone(),
            None => default_destination(&source),
        };

        Ok(Self {
            source,
            destination,
            recurse,
        })
    }
}

pub fn get(args: &[String], recurse: bool) -> Result<()> {
    let request = GetRequest::from_args(args, recurse)?;

    let mut config = Config::load()?;
    let token = access_token(&mut config)?;
    let client = DropboxClient::from_config(&config, token)?;

    run(&client, &request, true)?.status()
}

/// Plan and execute a `get` against `client`.
///
/// Planning errors abort before anything is written. Failures of single
/// files are collected in the returned report.
pub fn run<C: StorageClient + ?Sized>(
    client: &C,
    request: &GetRequest,
    show_progress: bool,
) -> Result<TransferReport> {
    info!(
        source = %request.source,
        destination = %request.destination,
        recurse = request.recurse,
        "get"
    );

    let plan = build_plan(client, &request.source, &request.destination, request.recurse)?;
    if request.recurse {
        println!("Found {} file(s) under {}", plan.len(), request.source);
    }

    let report = Downloader::new(client)
        .with_progress(show_progress)
        .execute(&plan, &request.destination);

    println!(
        "Downloaded {} of {} file(s) ({})",
        report.completed.len(),
        report.total(),
        BinaryBytes(report.bytes())
    );
    for failure in &report.failed {
        println!("  failed: {}", failure.source);
    }

    Ok(report)
}

fn access_token(config: &mut Config) -> Result<String> {
    if let Some(token) = config.resolve_token() {
        return Ok(token);
    }

    println!("No Dropbox access token configured.");
    let token = Password::new()
        .with_prompt("Enter your Dropbox access token")
        .interact()
        .map_err(|e| DbxError::config_error(format!("could not read access token: {e}")))?;

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(DbxError::config_error("an access token is required"));
    }

    config.set_access_token(token.clone())?;
    Ok(token)
}
