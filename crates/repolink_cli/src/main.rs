//! `repolink` command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `RepositoryService` calls.
//! - Register the principal, VCS and project rows a repository link needs.
//! - Print results as JSON on stdout; errors go to stderr with exit code 1.

use clap::{Parser, Subcommand};
use log::error;
use repolink_core::db::open_db;
use repolink_core::{
    core_version, init_logging, AppConfig, PrincipalCreate, ProjectCreate, RepositoryCreate,
    RepositoryFind, RepositoryPatch, RepositoryService, SqliteReferenceStore,
    SqliteRepositoryStore, VcsCreate, VcsType,
};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage project repository links")]
struct Cli {
    /// TOML configuration file; `REPOLINK_*` variables still override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register principals usable as creator/updater
    #[command(subcommand)]
    Principal(PrincipalCommand),
    /// Register VCS links
    #[command(subcommand)]
    Vcs(VcsCommand),
    /// Register projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Link a repository to a project and print the stored row
    Create {
        #[arg(long)]
        creator_id: i64,
        #[arg(long)]
        vcs_id: i64,
        #[arg(long)]
        project_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        full_path: String,
        #[arg(long)]
        web_url: String,
        #[arg(long, default_value = "")]
        base_directory: String,
        #[arg(long, default_value = "")]
        branch_filter: String,
        #[arg(long)]
        external_id: String,
        #[arg(long)]
        webhook_id: String,
    },
    /// List repositories matching every given filter
    List {
        #[arg(long)]
        id: Option<i64>,
        #[arg(long)]
        project_id: Option<i64>,
        #[arg(long)]
        vcs_id: Option<i64>,
    },
    /// Print one repository by id
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Update base directory and/or branch filter
    Patch {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        updater_id: i64,
        #[arg(long)]
        base_directory: Option<String>,
        #[arg(long)]
        branch_filter: Option<String>,
    },
    /// Unlink a repository permanently
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Print the core library version
    Version,
}

#[derive(Subcommand, Debug)]
enum PrincipalCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
enum VcsCommand {
    Add {
        #[arg(long)]
        name: String,
        /// GITLAB_SELF_HOST or GITHUB_COM
        #[arg(long = "type", value_parser = parse_vcs_type)]
        vcs_type: VcsType,
        #[arg(long)]
        instance_url: String,
        #[arg(long)]
        api_url: String,
    },
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        key: String,
    },
}

fn parse_vcs_type(value: &str) -> Result<VcsType, String> {
    VcsType::parse(value).ok_or_else(|| {
        format!("unknown vcs type `{value}`; expected GITLAB_SELF_HOST|GITHUB_COM")
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Command::Version = cli.command {
        println!("{}", core_version());
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.database_path)?;
    let references = SqliteReferenceStore::new(&conn);
    let service = RepositoryService::new(SqliteRepositoryStore::try_new(&conn)?);

    match cli.command {
        Command::Principal(PrincipalCommand::Add { name, email }) => {
            print_json(&references.create_principal(&PrincipalCreate { name, email })?)
        }
        Command::Vcs(VcsCommand::Add {
            name,
            vcs_type,
            instance_url,
            api_url,
        }) => print_json(&references.create_vcs(&VcsCreate {
            name,
            vcs_type,
            instance_url,
            api_url,
        })?),
        Command::Project(ProjectCommand::Add { name, key }) => {
            print_json(&references.create_project(&ProjectCreate { name, key })?)
        }
        Command::Create {
            creator_id,
            vcs_id,
            project_id,
            name,
            full_path,
            web_url,
            base_directory,
            branch_filter,
            external_id,
            webhook_id,
        } => print_json(&service.create(&RepositoryCreate {
            creator_id,
            vcs_id,
            project_id,
            name,
            full_path,
            web_url,
            base_directory,
            branch_filter,
            external_id,
            webhook_id,
        })?),
        Command::List {
            id,
            project_id,
            vcs_id,
        } => print_json(&service.find_list(&RepositoryFind {
            id,
            project_id,
            vcs_id,
        })?),
        Command::Get { id } => print_json(&service.find_by_id(id)?),
        Command::Patch {
            id,
            updater_id,
            base_directory,
            branch_filter,
        } => print_json(&service.patch(&RepositoryPatch {
            id,
            updater_id,
            base_directory,
            branch_filter,
        })?),
        Command::Delete { id } => {
            service.delete(id)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }
        Command::Version => Ok(()),
    }
}

fn print_json(value: &impl Serialize) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::Parser;
    use repolink_core::db::open_db;
    use repolink_core::{RepositoryFind, RepositoryStore, SqliteRepositoryStore};
    use std::path::Path;

    fn run_args(db: &Path, args: &[&str]) {
        let db = db.to_str().unwrap();
        let argv = ["repolink", "--db", db].into_iter().chain(args.iter().copied());
        run(Cli::try_parse_from(argv).unwrap()).unwrap();
    }

    #[test]
    fn fresh_database_supports_full_repository_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("repolink.db");

        run_args(
            &db,
            &["principal", "add", "--name", "Alice", "--email", "alice@example.com"],
        );
        run_args(
            &db,
            &[
                "vcs",
                "add",
                "--name",
                "GitLab",
                "--type",
                "GITLAB_SELF_HOST",
                "--instance-url",
                "https://git",
                "--api-url",
                "https://git/api/v4",
            ],
        );
        run_args(&db, &["project", "add", "--name", "Project A", "--key", "PA"]);
        run_args(
            &db,
            &[
                "create",
                "--creator-id",
                "1",
                "--vcs-id",
                "1",
                "--project-id",
                "1",
                "--name",
                "repo-a",
                "--full-path",
                "org/repo-a",
                "--web-url",
                "https://git/org/repo-a",
                "--branch-filter",
                "main",
                "--external-id",
                "123",
                "--webhook-id",
                "wh1",
            ],
        );
        run_args(&db, &["get", "--id", "1"]);
        run_args(
            &db,
            &["patch", "--id", "1", "--updater-id", "1", "--branch-filter", "release"],
        );

        {
            let conn = open_db(&db).unwrap();
            let store = SqliteRepositoryStore::try_new(&conn).unwrap();
            let repository = store.find_repository(&RepositoryFind::by_id(1)).unwrap();
            assert_eq!(repository.project_id, 1);
            assert_eq!(repository.branch_filter, "release");
            assert_eq!(repository.base_directory, "");
        }

        run_args(&db, &["delete", "--id", "1"]);

        let conn = open_db(&db).unwrap();
        let store = SqliteRepositoryStore::try_new(&conn).unwrap();
        assert!(store
            .find_repository_list(&RepositoryFind::default())
            .unwrap()
            .is_empty());

        let argv = ["repolink", "--db", db.to_str().unwrap(), "get", "--id", "1"];
        let err = run(Cli::try_parse_from(argv).unwrap()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn unknown_vcs_type_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "repolink",
            "vcs",
            "add",
            "--name",
            "x",
            "--type",
            "BITBUCKET",
            "--instance-url",
            "https://x",
            "--api-url",
            "https://x/api",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn patch_accepts_optional_fields() {
        let cli = Cli::try_parse_from([
            "repolink",
            "--db",
            "/tmp/x.db",
            "patch",
            "--id",
            "3",
            "--updater-id",
            "2",
            "--branch-filter",
            "release",
        ])
        .unwrap();

        match cli.command {
            Command::Patch {
                id,
                updater_id,
                base_directory,
                branch_filter,
            } => {
                assert_eq!((id, updater_id), (3, 2));
                assert_eq!(base_directory, None);
                assert_eq!(branch_filter.as_deref(), Some("release"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_without_filters_parses() {
        let cli = Cli::try_parse_from(["repolink", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::List {
                id: None,
                project_id: None,
                vcs_id: None
            }
        ));
    }

    #[test]
    fn create_requires_external_ids() {
        let result = Cli::try_parse_from([
            "repolink",
            "create",
            "--creator-id",
            "1",
            "--vcs-id",
            "10",
            "--project-id",
            "5",
            "--name",
            "repo-a",
            "--full-path",
            "org/repo-a",
            "--web-url",
            "https://git/org/repo-a",
        ]);
        assert!(result.is_err());
    }
}
