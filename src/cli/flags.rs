use crate::error::{MultiClaudeError, Result};

/// Flags that select headless mode, split from the arguments forwarded to
/// the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessArgs {
    pub provider: String,
    pub model: Option<String>,
    pub installation: Option<String>,
    /// Forwarded verbatim, model flags included (the launcher strips them)
    pub claude_args: Vec<String>,
}

/// Whether `--list` appears anywhere in the arguments.
pub fn has_list_flag(args: &[String]) -> bool {
    args.iter().any(|a| a == "--list")
}

/// Pull `--provider` and `--installation` out of `args` and peek at
/// `--model`/`-m`, which stays in the forwarded arguments.
///
/// Returns `Ok(None)` when no `--provider` is present: the caller then runs
/// the interactive selector with the untouched arguments.
pub fn extract_headless_args(args: &[String]) -> Result<Option<HeadlessArgs>> {
    let mut provider = None;
    let mut model = None;
    let mut installation = None;
    let mut claude_args = Vec::with_capacity(args.len());

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = flag_value(arg, "--provider", &mut iter)? {
            if value.is_empty() {
                return Err(missing_value("--provider"));
            }
            provider = Some(value);
            continue;
        }
        if let Some(value) = flag_value(arg, "--installation", &mut iter)? {
            // `--installation=` means the default installation
            installation = Some(value).filter(|v| !v.is_empty());
            continue;
        }

        if arg == "--model" || arg == "-m" {
            claude_args.push(arg.clone());
            if let Some(value) = iter.next() {
                model = Some(value.clone());
                claude_args.push(value.clone());
            }
            continue;
        }
        if let Some(value) = arg.strip_prefix("--model=") {
            model = Some(value.to_string());
        }
        claude_args.push(arg.clone());
    }

    Ok(provider.map(|provider| HeadlessArgs {
        provider,
        model,
        installation,
        claude_args,
    }))
}

/// `--flag value` or `--flag=value`. `Ok(None)` when `arg` is another flag.
fn flag_value<'a>(
    arg: &str,
    flag: &str,
    rest: &mut impl Iterator<Item = &'a String>,
) -> Result<Option<String>> {
    let value = if arg == flag {
        rest.next().cloned()
    } else if let Some(value) = arg.strip_prefix(flag).and_then(|v| v.strip_prefix('=')) {
        Some(value.to_string())
    } else {
        return Ok(None);
    };

    value.map(Some).ok_or_else(|| missing_value(flag))
}

fn missing_value(flag: &str) -> MultiClaudeError {
    MultiClaudeError::InvalidArgs(format!(
        "{} requires a value.\nUsage: mclaude --provider <name> [--model <model>] [--installation <name>] [claude-flags...]",
        flag
    ))
}
