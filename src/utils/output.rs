use crate::cli::ListFormat;
use crate::core::data::{AiModel, AiTool, ListingStatus, Pattern, Prompt, PromptStats, Workflow, WorkflowStatus};
use crate::utils::error::AppResult;
use crate::utils::format::{format_datetime, format_tags_comma, format_tags_hash, truncate_string};
use colored::*;
use serde::Serialize;

pub struct OutputStyle;

impl OutputStyle {
    pub fn description(text: &str) -> ColoredString {
        text.bright_green()
    }

    pub fn command(text: &str) -> ColoredString {
        text.bright_yellow()
    }

    pub fn content(text: &str) -> ColoredString {
        text.clear()
    }

    pub fn tags(text: &str) -> ColoredString {
        text.bright_cyan()
    }

    pub fn tag(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn title(text: &str) -> ColoredString {
        text.bright_blue().bold()
    }

    pub fn header(text: &str) -> ColoredString {
        text.bold()
    }

    pub fn label(text: &str) -> ColoredString {
        text.cyan()
    }

    pub fn success(text: &str) -> ColoredString {
        text.green()
    }

    pub fn error(text: &str) -> ColoredString {
        text.red()
    }

    pub fn warning(text: &str) -> ColoredString {
        text.yellow()
    }

    pub fn info(text: &str) -> ColoredString {
        text.blue()
    }

    pub fn muted(text: &str) -> ColoredString {
        text.dimmed()
    }

    pub fn separator() -> String {
        "─".repeat(50)
    }

    pub fn header_separator() -> String {
        "═".repeat(50)
    }

    pub fn print_header(title: &str) {
        println!("{}", Self::title(title));
        println!("{}", Self::header_separator());
    }

    pub fn print_field_colored(label: &str, value: &str, color_fn: impl Fn(&str) -> ColoredString) {
        println!("{:>12}: {}", Self::label(label), color_fn(value));
    }

    fn visibility(listed: bool) -> ColoredString {
        if listed { Self::success("public") } else { Self::muted("private") }
    }

    /// One line per prompt: slug, category, tags, visibility
    pub fn format_prompt_line(prompt: &Prompt) -> String {
        format!(
            "{} {} {}{} {}",
            Self::description(&prompt.slug),
            Self::tag(&format!("[{}]", prompt.category)),
            Self::content(&truncate_string(&prompt.title, 60)),
            Self::tags(&format_tags_hash(&prompt.tags)),
            Self::visibility(prompt.is_public),
        )
    }

    pub fn print_prompt_detailed(prompt: &Prompt) {
        Self::print_field_colored("Title", &prompt.title, Self::description);
        Self::print_field_colored("ID", &prompt.id, Self::muted);
        Self::print_field_colored("Slug", &prompt.slug, Self::content);
        Self::print_field_colored("Category", prompt.category.as_str(), Self::tag);
        if let Some(role) = &prompt.role {
            Self::print_field_colored("Role", role.as_str(), Self::tag);
        }
        if let Some(pattern) = &prompt.pattern {
            Self::print_field_colored("Pattern", pattern, Self::tag);
        }
        let tags = format_tags_comma(&prompt.tags);
        if !tags.is_empty() {
            Self::print_field_colored("Tags", &tags, Self::tags);
        }
        Self::print_field_colored("Public", &prompt.is_public.to_string(), Self::content);
        Self::print_field_colored("Revision", &prompt.revision.to_string(), Self::content);
        Self::print_field_colored("Updated", &format_datetime(&prompt.updated_at), Self::muted);

        let lines: Vec<&str> = prompt.content.lines().take(3).collect();
        if !lines.is_empty() {
            println!("   {}:", Self::label("Preview"));
            for line in lines {
                println!("     {}", Self::content(line));
            }
            if prompt.content.lines().count() > 3 {
                println!("     {}", Self::muted("..."));
            }
        }
    }

    pub fn format_pattern_line(pattern: &Pattern) -> String {
        format!(
            "{} {} {} {}",
            Self::description(&pattern.slug),
            Self::tag(&format!("[{}/{}]", pattern.category, pattern.level)),
            Self::content(&pattern.name),
            Self::muted(&truncate_string(&pattern.description, 60)),
        )
    }

    pub fn print_pattern_detailed(pattern: &Pattern) {
        Self::print_field_colored("Name", &pattern.name, Self::description);
        Self::print_field_colored("Slug", &pattern.slug, Self::content);
        Self::print_field_colored("Category", pattern.category.as_str(), Self::tag);
        Self::print_field_colored("Level", pattern.level.as_str(), Self::tag);
        Self::print_field_colored("Description", &pattern.description, Self::content);
        if !pattern.related_patterns.is_empty() {
            Self::print_field_colored("Related", &pattern.related_patterns.join(", "), Self::tags);
        }
        Self::print_field_colored("Revision", &pattern.revision.to_string(), Self::content);
    }

    pub fn format_workflow_line(workflow: &Workflow) -> String {
        format!(
            "{} {} {} {}",
            Self::description(&format!("{}/{}", workflow.category, workflow.slug)),
            Self::content(&truncate_string(&workflow.title, 60)),
            Self::muted(&format!("({} steps)", workflow.steps.len())),
            Self::visibility(workflow.status == WorkflowStatus::Published),
        )
    }

    pub fn print_workflow_detailed(workflow: &Workflow) {
        Self::print_field_colored("Title", &workflow.title, Self::description);
        Self::print_field_colored("Slug", &workflow.slug, Self::content);
        Self::print_field_colored("Category", &workflow.category, Self::tag);
        Self::print_field_colored("Status", workflow.status.as_str(), Self::content);
        for (i, step) in workflow.steps.iter().enumerate() {
            println!("     {}. {}", i + 1, Self::content(&step.title));
        }
        Self::print_field_colored("Revision", &workflow.revision.to_string(), Self::content);
    }

    pub fn format_model_line(model: &AiModel) -> String {
        format!(
            "{} {} {}",
            Self::description(&model.slug),
            Self::tag(&format!("[{}]", model.provider)),
            Self::visibility(model.status == ListingStatus::Active),
        )
    }

    pub fn format_tool_line(tool: &AiTool) -> String {
        format!(
            "{} {} {}",
            Self::description(&tool.slug),
            Self::tag(&format!("[{}]", tool.category)),
            Self::visibility(tool.status == ListingStatus::Active),
        )
    }
}

pub fn print_count(kind: &str, count: usize) {
    if count == 0 {
        println!("{}", OutputStyle::muted(&format!("No {} found.", kind)));
    } else {
        println!(
            "📝 {} ({} found)",
            OutputStyle::header(kind),
            OutputStyle::info(&count.to_string())
        );
    }
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", OutputStyle::warning(message));
}

pub fn print_success(message: &str) {
    println!("✅ {}", OutputStyle::success(message));
}

/// Renders catalog listings in the format chosen on the command line
pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn format_list<T: Serialize>(
        kind: &str,
        items: &[T],
        format: &ListFormat,
        line: impl Fn(&T) -> String,
        detailed: impl Fn(&T),
    ) -> AppResult<()> {
        if let ListFormat::Json = format {
            println!("{}", serde_json::to_string_pretty(items)?);
            return Ok(());
        }

        print_count(kind, items.len());
        if items.is_empty() {
            return Ok(());
        }

        match format {
            ListFormat::Simple => {
                println!("{}", OutputStyle::separator());
                for item in items {
                    println!("{}", line(item));
                }
            }
            ListFormat::Detailed => {
                for (i, item) in items.iter().enumerate() {
                    println!("\n{}.", i + 1);
                    detailed(item);
                    if i < items.len() - 1 {
                        println!("{}", OutputStyle::separator());
                    }
                }
            }
            ListFormat::Json => {}
        }
        Ok(())
    }

    pub fn print_stats(stats: &PromptStats) {
        OutputStyle::print_header("📊 Prompt Statistics");
        println!("Total prompts: {}", stats.total_prompts);
        println!("Public prompts: {}", stats.public_prompts);
        println!("Total tags: {}", stats.total_tags);
        println!("Categories used: {}", stats.total_categories);

        if !stats.tag_counts.is_empty() {
            println!("\n🏷️  Most used tags:");
            let mut sorted_tags: Vec<_> = stats.tag_counts.iter().collect();
            sorted_tags.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (tag, count) in sorted_tags.iter().take(10) {
                println!("  {}: {}", OutputStyle::tag(tag), count);
            }
        }

        if !stats.category_counts.is_empty() {
            println!("\n📁 Categories:");
            let mut sorted_categories: Vec<_> = stats.category_counts.iter().collect();
            sorted_categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (category, count) in sorted_categories {
                println!("  {}: {}", category, count);
            }
        }
    }
}
