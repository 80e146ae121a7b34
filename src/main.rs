use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use swext::config::ConvertRequest;

mod cli;

#[derive(Parser)]
#[command(name = "swext")]
#[command(about = "Runs safari-web-extension-converter and repairs the project it generates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Enable verbose debug output")]
    verbose: bool,

    #[arg(long, global = true, help = "Perform a dry run without executing actions")]
    dry_run: bool,

    #[arg(long, global = true, help = "Print results as JSON")]
    json: bool,

    #[arg(long, global = true, default_value = "warn", help = "Log filter (e.g. info, swext=debug)")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Convert a web extension into a Safari web extension project")]
    Convert(ConvertArgs),

    #[command(about = "Correct the bundle identifiers of an already generated project")]
    Fix(FixArgs),

    #[command(about = "Parse saved converter output and print the values of a field")]
    Parse {
        #[arg(help = "File holding converter output, or - for standard input")]
        input: PathBuf,

        #[arg(long, help = "Field to print; all fields when omitted")]
        key: Option<String>,
    },
}

#[derive(Args)]
struct ConvertArgs {
    #[arg(long, help = "YAML file with conversion options; flags override its values")]
    options: Option<PathBuf>,

    #[arg(long, help = "The directory path of your web extension")]
    extension: Option<PathBuf>,

    #[arg(long, help = "Save the generated app and Xcode project to the file path")]
    project_location: Option<PathBuf>,

    #[arg(long, help = "Rebuild the existing Safari web extension Xcode project with different options or platforms")]
    rebuild_project: bool,

    #[arg(long, help = "Use the value to name the generated app and the Xcode project")]
    app_name: Option<String>,

    #[arg(long, help = "Bundle identifier for the generated app (for example, com.company.extensionName)")]
    bundle_identifier: Option<String>,

    #[arg(long, help = "Bundle identifier for the extension target; defaults to <bundle identifier>.extension")]
    extension_bundle_identifier: Option<String>,

    #[arg(long, help = "Use Swift in the generated app (default)")]
    swift: bool,

    #[arg(long, help = "Use Objective-C in the generated app")]
    objc: bool,

    #[arg(long, help = "Create an iOS only project")]
    ios_only: bool,

    #[arg(long, help = "Create a macOS only project")]
    mac_only: bool,

    #[arg(long, help = "Copy the extension files into the generated project")]
    copy_resources: bool,

    #[arg(long, help = "Overwrite the output directory, if one exists")]
    force: bool,

    #[arg(long, help = "Keep converter output and the report in a timestamped directory here")]
    run_log_dir: Option<PathBuf>,
}

impl ConvertArgs {
    fn into_request(self) -> Result<ConvertRequest> {
        let from_flags = ConvertRequest {
            extension: self.extension,
            project_location: self.project_location,
            rebuild_project: self.rebuild_project.then_some(true),
            app_name: self.app_name,
            bundle_identifier: self.bundle_identifier,
            extension_bundle_identifier: self.extension_bundle_identifier,
            swift: self.swift.then_some(true),
            objc: self.objc.then_some(true),
            ios_only: self.ios_only.then_some(true),
            mac_only: self.mac_only.then_some(true),
            copy_resources: self.copy_resources.then_some(true),
            force: self.force.then_some(true),
            run_log_dir: self.run_log_dir,
        };

        match &self.options {
            Some(path) => Ok(from_flags.or(ConvertRequest::from_file(path)?)),
            None => Ok(from_flags),
        }
    }
}

#[derive(Args)]
struct FixArgs {
    #[arg(long, help = "Directory the converter generated the project into")]
    project_location: PathBuf,

    #[arg(long, help = "App name the converter used for the project")]
    app_name: String,

    #[arg(long, help = "Bundle identifier the app should have")]
    bundle_identifier: String,

    #[arg(long, help = "Bundle identifier the extension should have")]
    extension_bundle_identifier: Option<String>,

    #[arg(long, help = "Path of the .xcodeproj bundle when it is not <project location>/<app name>.xcodeproj")]
    build_description: Option<PathBuf>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose { "debug" } else { cli.log_level.as_str() };
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli);

    let config = cli::Config {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
        json: cli.json,
    };

    match cli.command {
        Commands::Convert(args) => {
            cli::convert(args.into_request()?, &config).await?;
        }
        Commands::Fix(args) => {
            let request = cli::FixRequest {
                project_location: args.project_location,
                app_name: args.app_name,
                bundle_identifier: args.bundle_identifier,
                extension_bundle_identifier: args.extension_bundle_identifier,
                build_description: args.build_description,
            };
            cli::fix(request, &config).await?;
        }
        Commands::Parse { input, key } => {
            cli::parse_output(&input, key.as_deref(), &config)?;
        }
    }

    Ok(())
}
