use super::ready_storage;
use crate::cli::{ContentKind, ListArgs};
use crate::config::Config;
use crate::core::data::{MAX_PAGE_SIZE, PatternCategory, PromptCategory, PromptFilter, WorkflowStatus};
use crate::manager::{CatalogService, PatternService, PromptService, WorkflowFilter, WorkflowService};
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::{DisplayFormatter, OutputStyle};

fn parse_category<T: std::str::FromStr<Err = String>>(category: Option<&str>) -> AppResult<Option<T>> {
    category
        .map(|c| c.parse::<T>().map_err(AppError::Validation))
        .transpose()
}

pub async fn handle_list_command(config: Config, args: &ListArgs) -> AppResult<()> {
    let storage = ready_storage(&config).await?;
    let format = &args.format;

    match args.kind {
        ContentKind::Prompts => {
            let service = PromptService::new(&storage);
            let mut filter = PromptFilter {
                q: args.query.clone(),
                category: parse_category::<PromptCategory>(args.category.as_deref())?,
                tag: args.tag.clone(),
                limit: Some(MAX_PAGE_SIZE),
                ..Default::default()
            };

            let mut prompts = Vec::new();
            let mut page = 1;
            loop {
                filter.page = Some(page);
                let result = service.search(&filter, !args.all).await?;
                let done = prompts.len() + result.items.len() >= result.total || result.items.is_empty();
                prompts.extend(result.items);
                if done {
                    break;
                }
                page += 1;
            }

            DisplayFormatter::format_list(
                "Prompts",
                &prompts,
                format,
                OutputStyle::format_prompt_line,
                OutputStyle::print_prompt_detailed,
            )
        }
        ContentKind::Patterns => {
            let category = parse_category::<PatternCategory>(args.category.as_deref())?;
            let patterns = PatternService::new(&storage).list(category).await?;
            DisplayFormatter::format_list(
                "Patterns",
                &patterns,
                format,
                OutputStyle::format_pattern_line,
                OutputStyle::print_pattern_detailed,
            )
        }
        ContentKind::Workflows => {
            let filter = WorkflowFilter {
                category: args.category.clone(),
                status: if args.all { None } else { Some(WorkflowStatus::Published) },
                ..Default::default()
            };
            let workflows = WorkflowService::new(&storage).matching(&filter, false).await?;
            DisplayFormatter::format_list(
                "Workflows",
                &workflows,
                format,
                OutputStyle::format_workflow_line,
                OutputStyle::print_workflow_detailed,
            )
        }
        ContentKind::Models => {
            let models = CatalogService::new(&storage).models(args.all).await?;
            DisplayFormatter::format_list("AI models", &models, format, OutputStyle::format_model_line, |m| {
                println!("{}", OutputStyle::format_model_line(m))
            })
        }
        ContentKind::Tools => {
            let tools = CatalogService::new(&storage)
                .tools(args.category.as_deref(), args.all)
                .await?;
            DisplayFormatter::format_list("AI tools", &tools, format, OutputStyle::format_tool_line, |t| {
                println!("{}", OutputStyle::format_tool_line(t))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        let parsed = parse_category::<PromptCategory>(Some("debugging")).unwrap();
        assert_eq!(parsed, Some(PromptCategory::Debugging));
        assert!(parse_category::<PromptCategory>(None).unwrap().is_none());
        assert!(matches!(
            parse_category::<PatternCategory>(Some("vibes")),
            Err(AppError::Validation(_))
        ));
    }
}
