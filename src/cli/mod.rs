use clap::{Parser, Subcommand};

pub mod flags;
pub mod router;
pub use flags::{extract_headless_args, has_list_flag, HeadlessArgs};

#[derive(Subcommand, Debug)]
pub enum ProvidersCommands {
    /// List configured providers
    #[command(alias = "ls")]
    List,

    /// Add a provider from a template
    Add {
        /// Template id (see 'mclaude templates')
        #[arg(long, short = 't', required_unless_present = "oauth")]
        template: Option<String>,

        /// Display name (defaults to the template description)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// API key (local templates fall back to a placeholder)
        #[arg(long)]
        api_key: Option<String>,

        /// Base URL override, mainly for local servers on another host
        #[arg(long)]
        base_url: Option<String>,

        /// Model to store with the provider (repeatable)
        #[arg(long = "model", short = 'm')]
        models: Vec<String>,

        /// Add an Anthropic account and log in with `claude login`
        #[arg(long, conflicts_with_all = ["template", "api_key", "base_url", "models"])]
        oauth: bool,
    },

    /// Remove a provider and its stored credentials
    #[command(alias = "rm")]
    Remove {
        /// Provider name, template id, slug or id
        provider: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Rename a provider
    Rename { provider: String, new_name: String },

    /// Replace a provider's API key
    SetKey { provider: String, api_key: String },

    /// Set or clear (when omitted) a provider's base URL override
    SetUrl {
        provider: String,
        base_url: Option<String>,
    },

    /// Log in again to an Anthropic account
    Login { provider: String },
}

#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List a provider's models and where they come from
    #[command(alias = "ls")]
    List { provider: String },

    /// Store models with a provider
    Add {
        provider: String,
        #[arg(required = true)]
        models: Vec<String>,
    },

    /// Remove stored models from a provider
    #[command(alias = "rm")]
    Remove {
        provider: String,
        #[arg(required = true)]
        models: Vec<String>,
    },

    /// Query the provider's API for available models
    Fetch {
        provider: String,

        /// Store every fetched model with the provider
        #[arg(long)]
        add: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum InstallationsCommands {
    /// List installations
    #[command(alias = "ls")]
    List,

    /// Create an isolated installation
    Add { name: String },

    /// Rename an installation and its directory
    Rename {
        installation: String,
        new_name: String,
    },

    /// Remove an installation and its directory
    #[command(alias = "rm")]
    Remove {
        installation: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "mclaude")]
#[command(about = "Run Claude Code against multiple providers, models and installations", long_about = None)]
#[command(version = env!("MCLAUDE_VERSION"))]
#[command(after_help = "\
INVOCATION PATTERNS:
  mclaude [claude-flags...]                      Pick provider and model interactively
  mclaude --provider <name> [claude-flags...]    Headless mode, no selector

HEADLESS FLAGS:
  --provider <name>       Provider name, template id, slug or id
  --model, -m <model>     Model to use (first known model if omitted)
  --installation <name>   Installation to use (default if omitted)
  --list                  Print providers, models and installations as JSON

EXAMPLES:
  mclaude --provider deepseek --model deepseek-chat -p \"explain this\"
  mclaude --provider ollama --model llama3 -c
  mclaude --list

All other arguments are forwarded to Claude Code.

ENVIRONMENT:
  MCLAUDE_HOME        Data directory (default ~/.multi-claude)
  MCLAUDE_LOG         Debug log filter (default multi_claude=debug)
  MCLAUDE_CLAUDE_BIN  Claude Code executable (default claude)
  MCLAUDE_SELECTOR    External selector program")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch Claude Code (the default command)
    #[command(hide = true, disable_help_flag = true)]
    Run(RunCmd),

    /// Manage providers
    Providers {
        #[command(subcommand)]
        command: ProvidersCommands,
    },

    /// Manage a provider's models
    Models {
        #[command(subcommand)]
        command: ModelsCommands,
    },

    /// Manage isolated installations
    Installations {
        #[command(subcommand)]
        command: InstallationsCommands,
    },

    /// List built-in provider templates
    Templates,

    /// Delete all providers, installations, credentials and logs
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Interactive selector spoken to by the launcher
    #[command(name = "__select", hide = true)]
    Select,
}

#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Headless flags and arguments for Claude Code
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
