use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use git_release::auth::AuthConfig;
use git_release::config::{self, CommonOverrides};
use git_release::git::Git2Repository;
use git_release::release;
use git_release::ui;
use git_release::version::ReleaseType;

#[derive(Parser)]
#[command(
    name = "git-release",
    about = "Prepare and finalize semantic-version releases of a git repository"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct CommonArgs {
    #[arg(long, help = "File containing the version entry")]
    version_file: Option<PathBuf>,

    #[arg(long, help = "Key of the version entry, e.g. \"version\"")]
    version_key: Option<String>,

    #[arg(
        long,
        help = "Regular expression the current branch must match for a release"
    )]
    required_branch_regex: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the version, commit it, and create the release tag
    Prepare {
        #[arg(
            long,
            value_enum,
            help = "The type of release. If manual is specified, --release-version must also be specified"
        )]
        release_type: ReleaseType,

        #[arg(
            long,
            help = "Only used with the manual release type. Specifies the version to set for the release"
        )]
        release_version: Option<String>,

        #[arg(long, help = "Optional prefix for created tags")]
        tag_prefix: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Move to the next snapshot version, commit, and push branch and tags
    Finalize {
        #[arg(
            long,
            help = "Overrides the next development version. Default bumps the patch and appends -SNAPSHOT"
        )]
        new_version: Option<String>,

        #[arg(long, help = "Remote to push to")]
        remote: Option<String>,

        #[arg(long, help = "HTTPS authentication user name")]
        username: Option<String>,

        #[arg(long, help = "HTTPS authentication password")]
        password: Option<String>,

        #[arg(long, help = "Inline SSH private key")]
        ssh_private_key: Option<String>,

        #[arg(long, help = "File containing the SSH private key")]
        ssh_private_key_file: Option<PathBuf>,

        #[arg(long, help = "Passphrase of the SSH private key")]
        ssh_passphrase: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn overrides_from(common: &CommonArgs) -> CommonOverrides {
    CommonOverrides {
        version_file: common.version_file.clone(),
        version_key: common.version_key.clone(),
        required_branch_regex: common.required_branch_regex.clone(),
    }
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        ui::display_error(&format!("{}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Prepare {
            release_type,
            release_version,
            tag_prefix,
            common,
        } => {
            let file_config = config::load_config(common.config.as_deref())?;
            let options = config::resolve_prepare(
                overrides_from(&common),
                release_type,
                release_version,
                tag_prefix,
                &file_config,
            );

            let repo = Git2Repository::open(".")?;

            ui::display_status("Preparing release...");
            let outcome = release::prepare(&repo, &options)?;

            ui::display_success(&format!("Committed: {}", outcome.commit_message));
            ui::display_success(&format!("Created tag {}", outcome.tag));
        }

        Command::Finalize {
            new_version,
            remote,
            username,
            password,
            ssh_private_key,
            ssh_private_key_file,
            ssh_passphrase,
            common,
        } => {
            let file_config = config::load_config(common.config.as_deref())?;
            let auth = AuthConfig {
                username,
                password,
                ssh_private_key,
                ssh_private_key_file,
                ssh_passphrase,
            };
            let options = config::resolve_finalize(
                overrides_from(&common),
                new_version,
                remote,
                auth,
                &file_config,
            );

            let repo = Git2Repository::open(".")?;

            ui::display_status("Finalizing release...");
            let outcome = release::finalize(&repo, &options)?;

            ui::display_success(&format!("Committed: {}", outcome.commit_message));
            ui::display_push_summary("branch", &outcome.branch, &outcome.branch_push);
            ui::display_push_summary("tags", &outcome.branch, &outcome.tags_push);
            ui::display_success(&format!(
                "Next development version is {}",
                outcome.version
            ));
        }
    }

    Ok(())
}
