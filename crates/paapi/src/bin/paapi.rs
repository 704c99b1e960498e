//! Command-line access to the PA API.
//!
//! Run with: `paapi <command>`
//!
//! Results are printed to stdout as JSON, so `println!` is used for output;
//! diagnostics go through `tracing` to stderr.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;

use anyhow::{anyhow, Context};
use paapi::{config, ApiClient, Record};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let result = match args.as_slice() {
        ["jobtemplates"] => with_client(|client| client.get_all_jobtemplates()),
        ["testruns", jobtemplate] => {
            with_client(|client| client.get_testruns_for_jobtemplate(jobtemplate, None))
        }
        ["testruns", jobtemplate, from_date] => with_client(|client| {
            client.get_testruns_for_jobtemplate(jobtemplate, Some(*from_date))
        }),
        ["objects", testrun] => with_client(|client| client.get_pageobjects_for_testrun(testrun)),
        ["help"] | [] => {
            print_help();
            Ok(())
        }
        [unknown, ..] => {
            eprintln!("Unknown command or arguments: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow!("Invalid usage"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("paapi=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_help() {
    println!("PA API client");
    println!();
    println!("USAGE:");
    println!("    paapi <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    jobtemplates                          List all job templates");
    println!("    testruns <jobtemplate-uri> [from]     List test runs of a job template");
    println!("    objects <testrun-uri>                 List page objects of a test run");
    println!("    help                                  Show this help message");
    println!();
    println!("Configuration is read from PAAPI_* environment variables or paapi.{{json,toml}}.");
}

fn with_client<F>(fetch: F) -> anyhow::Result<()>
where
    F: FnOnce(&ApiClient) -> paapi::Result<Vec<Record>>,
{
    let config = config::load().context("Failed to load configuration")?;
    let client = ApiClient::from_config(&config).context("Failed to create API client")?;

    let records = fetch(&client).context("PA API request failed")?;
    let output = serde_json::to_string_pretty(&records).context("Failed to encode results")?;
    println!("{output}");
    Ok(())
}
