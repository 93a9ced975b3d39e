//! Command-line argument definitions for `taskboard`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Taskboard - task lists in plain JSON files, optionally pulled from a
/// GitHub project board.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about = "Manage task lists and pull them from GitHub project boards", long_about = None)]
pub struct Cli {
    /// Preference file holding active directories and the GitHub login.
    /// Defaults to `<config dir>/taskboard/preferences.json`.
    #[arg(long = "prefs", global = true, env = "TASKBOARD_PREFS")]
    pub prefs: Option<PathBuf>,

    /// Format of diagnostic output on stderr
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// GraphQL endpoint used by the `github` commands.
    #[arg(
        long = "github-endpoint",
        global = true,
        hide = true,
        env = "TASKBOARD_GITHUB_ENDPOINT"
    )]
    pub github_endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Active directory management
    Dirs {
        #[command(subcommand)]
        command: DirCommands,
    },

    /// Show the task lists of a directory with their progress
    Lists {
        #[command(flatten)]
        dir: DirArg,
    },

    /// Task list commands
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Task commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// GitHub project board commands
    Github {
        #[command(subcommand)]
        command: GithubCommands,
    },
}

/// Directory a command works on. Defaults to the first active directory.
#[derive(Args, Debug, Clone, Default)]
pub struct DirArg {
    #[arg(long = "dir", short = 'd')]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum DirCommands {
    /// Show the active directories
    List,

    /// Add a directory to the active list
    Add { path: PathBuf },

    /// Remove a directory from the active list
    Remove { path: PathBuf },

    /// Show every directory below <root> that holds task lists
    Discover {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Create a list placed after the existing ones
    New {
        /// Title of the new list (default: "New Task List <n>")
        title: Option<String>,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Change a list's title and rename its file to match
    Rename {
        list: String,
        new_title: String,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Delete a list and its file
    Delete {
        list: String,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Print a list as JSON
    Export {
        list: String,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Overwrite the fields present in a JSON file onto a list
    Import {
        list: String,
        /// JSON file to read (`-` for stdin)
        file: PathBuf,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Sort tasks by progress, most advanced first
    Sort {
        list: String,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Show a list's tasks
    Show {
        list: String,
        #[command(flatten)]
        dir: DirArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Append a task to a list
    Add {
        list: String,
        /// Task title (default: "New Task")
        title: Option<String>,
        #[arg(long = "description", short = 'D')]
        description: Option<String>,
        #[command(flatten)]
        dir: DirArg,
    },

    /// Change a task's title or description
    Edit {
        #[command(flatten)]
        target: TaskRef,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "description", short = 'D')]
        description: Option<String>,
    },

    /// Mark a task done
    Done {
        #[command(flatten)]
        target: TaskRef,
    },

    /// Mark a task not started
    Undone {
        #[command(flatten)]
        target: TaskRef,
    },

    /// Set a task's progress (0-100), or `none` to stop tracking it
    Progress {
        #[command(flatten)]
        target: TaskRef,
        value: String,
    },

    /// Remove a task
    Remove {
        #[command(flatten)]
        target: TaskRef,
    },

    /// Insert a copy of a task right after it
    Duplicate {
        #[command(flatten)]
        target: TaskRef,
    },

    /// Move a task to the end of another list
    Move {
        #[command(flatten)]
        target: TaskRef,
        /// Title of the receiving list
        to: String,
    },

    /// Add a bullet point to a task
    Bullet {
        #[command(flatten)]
        target: TaskRef,
        description: String,
    },

    /// Flip a bullet point's done flag
    Toggle {
        #[command(flatten)]
        target: TaskRef,
        /// 1-based bullet point number
        bullet: usize,
    },

    /// Attach a named reference (path or URL) to a task
    Ref {
        #[command(flatten)]
        target: TaskRef,
        name: String,
        path: String,
    },
}

/// A task addressed by list title and 1-based position.
#[derive(Args, Debug, Clone)]
pub struct TaskRef {
    /// Title of the list holding the task
    pub list: String,
    /// 1-based task number
    pub task: usize,
    #[command(flatten)]
    pub dir: DirArg,
}

#[derive(Subcommand, Debug)]
pub enum GithubCommands {
    /// Store the GitHub username and token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// List the user's project boards
    Projects,

    /// Print the web URL of the <n>th listed project
    Open { number: usize },

    /// Fetch a board and overwrite a directory with one list per column
    Pull {
        /// Project node id, or its 1-based position in `github projects`
        project: String,
        #[command(flatten)]
        dir: DirArg,
        /// Write the files; without it the fetched items are only shown
        #[arg(long)]
        yes: bool,
    },
}
