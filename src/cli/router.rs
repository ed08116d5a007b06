use std::ffi::OsString;

/// Known subcommands that should NOT trigger `run` insertion.
/// These match the Commands enum variant names.
const KNOWN_SUBCOMMANDS: &[&str] = &[
    "run",
    "providers",
    "models",
    "installations",
    "templates",
    "reset",
    "__select",
];

/// Route CLI arguments to the appropriate command.
///
/// Launching Claude Code is the default: every argument the agent accepts
/// must pass through untouched, so anything that isn't a management
/// subcommand gets the hidden `run` subcommand inserted in front of it.
///
/// # Routing Logic
///
/// The router inspects only `args[1]` (the first argument after the program name):
///
/// - If `args[1]` is `--help`, `-h`, `--version`, or `-V`: unchanged (preserve main help/version)
/// - If `args[1]` is a known subcommand: unchanged
/// - Anything else, flags included: insert "run" after program name
///
/// # Examples
///
/// ```text
/// mclaude                          -> mclaude run
/// mclaude -c                       -> mclaude run -c
/// mclaude --provider zai -p "hi"   -> mclaude run --provider zai -p "hi"
/// mclaude providers list           -> mclaude providers list (unchanged)
/// mclaude --help                   -> mclaude --help (unchanged)
/// ```
///
/// # Known Trade-off
///
/// A prompt whose first word is a subcommand name (`mclaude models`) is
/// parsed as that subcommand. Use `mclaude run models` to forward it.
pub fn route_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // If no args provided (just program name), default to run
    if args.len() < 2 {
        let mut routed = Vec::with_capacity(2);
        if !args.is_empty() {
            routed.push(args[0].clone());
        }
        routed.push("run".into());
        return routed;
    }

    let first_arg = args[1].to_string_lossy();

    // Preserve main --help and --version
    if first_arg == "--help" || first_arg == "-h" || first_arg == "--version" || first_arg == "-V" {
        return args;
    }

    if KNOWN_SUBCOMMANDS.contains(&first_arg.as_ref()) {
        return args;
    }

    let mut routed = Vec::with_capacity(args.len() + 1);
    routed.push(args[0].clone());
    routed.push("run".into());
    routed.extend_from_slice(&args[1..]);
    routed
}
