use crate::cli::PlaygroundArgs;
use crate::playground::{self, RenderRequest, TASK_VARIABLE};
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::OutputStyle;
use crate::utils::print_warning;
use std::collections::HashMap;

fn parse_vars(vars: &[String]) -> AppResult<HashMap<String, String>> {
    vars.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| AppError::Validation(format!("Expected NAME=VALUE, got '{}'", pair)))
        })
        .collect()
}

pub fn handle_playground_command(args: &PlaygroundArgs) -> AppResult<()> {
    let Some(pattern) = &args.pattern else {
        OutputStyle::print_header("🧪 Pattern templates");
        for info in playground::templates() {
            let vars: Vec<String> = info
                .variables
                .iter()
                .map(|v| match &v.default {
                    Some(default) => format!("<{}={}>", v.name, default.lines().next().unwrap_or_default()),
                    None => format!("<{}>", v.name),
                })
                .collect();
            println!(
                "{} {} {}",
                OutputStyle::description(&info.pattern),
                OutputStyle::content(&info.name),
                OutputStyle::command(&vars.join(" "))
            );
        }
        return Ok(());
    };

    let mut inputs = parse_vars(&args.vars)?;
    if let Some(task) = &args.task {
        inputs.insert(TASK_VARIABLE.to_string(), task.clone());
    }

    let rendered = playground::render(&RenderRequest {
        pattern: pattern.clone(),
        inputs,
    })?;

    println!("\n{}:", OutputStyle::header("📤 Rendered Prompt"));
    println!("{}", OutputStyle::header_separator());
    println!("{}", OutputStyle::content(&rendered.prompt));
    println!("{}", OutputStyle::header_separator());

    if !rendered.missing.is_empty() {
        print_warning(&format!("No value for: {}", rendered.missing.join(", ")));
    }
    Ok(())
}
