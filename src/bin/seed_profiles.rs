// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generate synthetic profiles, optionally embedding their answers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use url::Url;

use tact_server::config::{LogFormat, DEFAULT_GROUP_ID};
use tact_server::seed::{
    random_answers, random_gender, write_profile, RandomUserClient, SeedError, SyntheticProfile,
    DEFAULT_SOURCE_URL,
};
use tact_server::storage::pinata::{DEFAULT_API_URL, DEFAULT_UPLOADS_URL};
use tact_server::storage::{PinataClient, PinataConfig, StorageError};
use tact_server::telemetry::init_tracing;

/// `seed-profiles` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "seed-profiles",
    about = "Generate synthetic dating profiles with random questionnaire answers",
    version
)]
struct CliArgs {
    /// Number of profiles to generate.
    #[arg(long, default_value_t = 1000)]
    count: usize,
    /// Directory profiles are written to as `<username>.json`.
    #[arg(long = "out-dir", value_name = "path", default_value = "users")]
    out_dir: PathBuf,
    /// randomuser-compatible endpoint.
    #[arg(long = "source-url", value_name = "url", default_value = DEFAULT_SOURCE_URL)]
    source_url: Url,
    /// Upload each profile's answers into the vector group.
    #[arg(long)]
    upload: bool,
    /// Vector group to upload into.
    #[arg(long = "group-id", env = "PINATA_GROUP_ID", default_value = DEFAULT_GROUP_ID)]
    group_id: String,
    #[arg(long = "pinata-jwt", env = "PINATA_JWT", hide_env_values = true)]
    pinata_jwt: Option<String>,
    #[arg(long = "pinata-gateway", env = "PINATA_GATEWAY_URL")]
    pinata_gateway: Option<String>,
    /// Seed for answer and gender selection, for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing(LogFormat::Pretty);

    let args = CliArgs::parse();
    match run(args).await {
        Ok(written) => {
            info!(written, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "seeding failed");
            ExitCode::FAILURE
        }
    }
}

fn uploader(args: &CliArgs) -> Result<Option<PinataClient>, SeedError> {
    if !args.upload {
        return Ok(None);
    }
    let (Some(jwt), Some(gateway)) = (args.pinata_jwt.clone(), args.pinata_gateway.clone()) else {
        return Err(StorageError::Request(
            "--upload needs PINATA_JWT and PINATA_GATEWAY_URL".to_string(),
        )
        .into());
    };
    let parse = |raw: &str| {
        Url::parse(raw).map_err(|e| StorageError::Request(format!("invalid URL {raw}: {e}")))
    };
    let client = PinataClient::new(PinataConfig {
        jwt,
        gateway,
        api_url: parse(DEFAULT_API_URL)?,
        uploads_url: parse(DEFAULT_UPLOADS_URL)?,
    })?;
    Ok(Some(client))
}

async fn run(args: CliArgs) -> Result<usize, SeedError> {
    let source = RandomUserClient::new(args.source_url.clone())?;
    let uploader = uploader(&args)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for number in 0..args.count {
        let gender = random_gender(&mut rng);
        let person = source.fetch_person(gender).await?;
        let mut profile = SyntheticProfile::new(person, gender, random_answers(&mut rng));

        if let Some(pinata) = &uploader {
            let cid = profile.upload(pinata, &args.group_id).await?.clone();
            info!(username = %profile.username, %cid, "answers uploaded");
        }

        let path = write_profile(&args.out_dir, &profile).await?;
        info!(number, path = %path.display(), "profile written");
    }

    Ok(args.count)
}
