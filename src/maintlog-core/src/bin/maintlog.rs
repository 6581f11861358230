//! maintlog CLI - signature-gated device maintenance on an in-memory ledger.
//!
//! Runs the maintenance workflow end to end so its authorization rules can be
//! watched step by step.

use std::sync::Arc;

use base64::Engine;
use clap::{Parser, Subcommand};
use maintlog_core::{
    LedgerConfig, LedgerRuntime, MaintenanceError, Outcome, Participant, INVOKE_FUNCTIONS,
    QUERY_FUNCTIONS,
};
use maintlog_store::MemoryStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const TARGET: &str = env!("TARGET");

/// maintlog - multi-party device maintenance records.
///
/// An administrator enrolls devices, device owners open service cycles,
/// three check owners each complete one check, and the owner signs off.
/// Every step must be signed by the principal it requires.
#[derive(Parser)]
#[command(name = "maintlog")]
#[command(version = VERSION)]
#[command(about = "Signature-gated device maintenance workflow")]
#[command(long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enroll / start / check / signoff scenario on a fresh ledger
    Scenario {
        /// Device id to enroll
        #[arg(long, default_value = "D1")]
        device: String,

        /// Service cycle id to open
        #[arg(long, default_value = "S1")]
        service: String,

        /// Refuse unauthorized calls with an error instead of ignoring them
        #[arg(long)]
        reject_denials: bool,
    },

    /// Show version, build and ledger layout
    Info,
}

/// One scenario step as reported to the user.
#[derive(serde::Serialize)]
struct Step {
    actor: String,
    call: String,
    result: String,
    record: Option<serde_json::Value>,
}

struct Scenario<'a> {
    runtime: &'a LedgerRuntime,
    device: &'a str,
    service: &'a str,
    json: bool,
    steps: Vec<Step>,
}

impl Scenario<'_> {
    fn step(&mut self, actor: &Participant, function: &str, args: &[&str]) {
        let result = match actor.invoke(self.runtime, function, args.iter().copied()) {
            Ok(Outcome::Applied) => "applied".to_string(),
            Ok(Outcome::Denied { role }) => format!("ignored (caller is not the {role})"),
            Err(e) => format!("error: {e}"),
        };
        let record = self
            .runtime
            .query("deviceServiceRecord", [self.device, self.service])
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());

        let step = Step {
            actor: actor.name().to_string(),
            call: format!("{function}({})", args.join(", ")),
            result,
            record,
        };
        if !self.json {
            print_step(self.steps.len() + 1, &step);
        }
        self.steps.push(step);
    }
}

fn print_step(n: usize, step: &Step) {
    println!("{n:>2}. {} -> {}", step.actor, step.call);
    println!("    result: {}", step.result);
    match &step.record {
        Some(record) => println!(
            "    record: check1={} check2={} check3={} signoff={}",
            record["check1"], record["check2"], record["check3"], record["signoff"]
        ),
        None => println!("    record: <none>"),
    }
}

fn run_scenario(
    device: &str,
    service: &str,
    reject_denials: bool,
    json: bool,
) -> Result<(), MaintenanceError> {
    let admin = Participant::ed25519("admin");
    let owner = Participant::p256("OA");
    let checkers = [
        Participant::ed25519("C1"),
        Participant::ed25519("C2"),
        Participant::p256("C3"),
    ];
    let intruder = Participant::ed25519("mallory");

    let mut config = LedgerConfig::default();
    if reject_denials {
        config = config.with_denial_policy(maintlog_core::DenialPolicy::Reject);
    }
    let runtime = LedgerRuntime::deploy(Arc::new(MemoryStore::new()), config, admin.signer())?;

    if !json {
        println!("\nMAINTENANCE SCENARIO");
        println!("====================\n");
        println!("Device: {device}   Service cycle: {service}\n");
    }

    let mut device_key = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut device_key);
    let enroll_args = [
        device.to_string(),
        base64::engine::general_purpose::STANDARD.encode(device_key),
        owner.encoded_certificate()?,
        checkers[0].encoded_certificate()?,
        checkers[1].encoded_certificate()?,
        checkers[2].encoded_certificate()?,
    ];
    let enroll_args: Vec<&str> = enroll_args.iter().map(String::as_str).collect();

    let mut scenario = Scenario {
        runtime: &runtime,
        device,
        service,
        json,
        steps: Vec::new(),
    };

    scenario.step(&intruder, "enroll", &enroll_args);
    scenario.step(&admin, "enroll", &enroll_args);
    scenario.step(&checkers[0], "startServiceCycle", &[device, service]);
    scenario.step(&owner, "startServiceCycle", &[device, service]);
    scenario.step(&checkers[1], "markCheckComplete", &[device, service, "check1"]);
    scenario.step(&checkers[0], "markCheckComplete", &[device, service, "check1"]);
    scenario.step(&checkers[1], "markCheckComplete", &[device, service, "check2"]);
    scenario.step(&owner, "signoff", &[device, service]);
    scenario.step(&checkers[2], "markCheckComplete", &[device, service, "check3"]);
    scenario.step(&intruder, "signoff", &[device, service]);
    scenario.step(&owner, "signoff", &[device, service]);

    let enrolled: serde_json::Value = serde_json::from_slice(&runtime.query("device", [device])?)?;
    if json {
        let output = serde_json::json!({
            "device": enrolled,
            "steps": scenario.steps,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("\nEnrolled device:");
        println!("  id:     {}", enrolled["id"]);
        println!("  owner:  {}", enrolled["Owner"]);
        println!();
    }
    Ok(())
}

fn show_info(json: bool) {
    let config = LedgerConfig::default();
    let algorithms = ["ed25519", "ecdsa-p256"];

    if json {
        let output = serde_json::json!({
            "version": VERSION,
            "target": TARGET,
            "algorithms": algorithms,
            "tables": {
                "device": config.device_table,
                "service": config.service_table,
            },
            "invoke": INVOKE_FUNCTIONS,
            "query": QUERY_FUNCTIONS,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{e}"),
        }
        return;
    }

    println!("\nSYSTEM INFORMATION");
    println!("==================\n");
    println!("maintlog Version: {VERSION}");
    println!("Target: {TARGET}");
    println!();
    println!("Signature Algorithms: {}", algorithms.join(", "));
    println!();
    println!("Ledger Tables:");
    println!("  Devices:         {}", config.device_table);
    println!("  Service records: {}", config.service_table);
    println!();
    println!("Invoke functions: {}", INVOKE_FUNCTIONS.join(", "));
    println!("Query functions:  {}", QUERY_FUNCTIONS.join(", "));
}

fn main() {
    let cli = Cli::parse();

    let json_output = cli.format == "json";

    let level = if json_output {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Scenario {
            device,
            service,
            reject_denials,
        }) => {
            if let Err(e) = run_scenario(&device, &service, reject_denials, json_output) {
                if json_output {
                    println!("{}", serde_json::json!({"status": "error", "message": e.to_string()}));
                } else {
                    eprintln!("\x1b[31m[ERROR]\x1b[0m {e}");
                }
                std::process::exit(1);
            }
        },
        Some(Commands::Info) | None => show_info(json_output),
    }
}
