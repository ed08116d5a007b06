use crate::error::Result;
use crate::providers::{supports_model_fetch, ProviderTemplate, TEMPLATES};

pub fn execute() -> Result<()> {
    println!("{:<12} {:<28} {}", "TEMPLATE", "DESCRIPTION", "BASE URL");
    println!("{}", "-".repeat(80));
    for template in TEMPLATES {
        println!("{}", row(template));
    }
    println!();
    println!("Add one with: mclaude providers add --template <TEMPLATE> --api-key <KEY>");
    println!("Anthropic accounts: mclaude providers add --oauth");
    Ok(())
}

fn row(template: &ProviderTemplate) -> String {
    let base_url = if template.base_url.is_empty() {
        "(OAuth login)"
    } else {
        template.base_url
    };
    let mut line = format!("{:<12} {:<28} {}", template.id, template.description, base_url);
    if supports_model_fetch(template.id) {
        line.push_str("  [fetch]");
    }
    line
}
