//! Read tool - Read file contents under the project root

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use crate::constants::tools::MAX_TOOL_TEXT_CHARS;
use crate::tools::path_utils::validate_path;
use crate::tools::registry::Tool;
use crate::tools::truncation::truncate_head_to_fit;
use crate::tools::{parse_params, ToolContext, ToolResult};

const DEFAULT_LINE_LIMIT: usize = 2000;

pub struct ReadTool;

#[derive(Deserialize)]
struct Params {
    path: String,
    #[serde(default)]
    offset: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

fn human_size(size: usize) -> String {
    match size {
        0..1024 => format!("{} bytes", size),
        1024..1_048_576 => format!("{:.1} KB", size as f64 / 1024.0),
        _ => format!("{:.1} MB", size as f64 / 1_048_576.0),
    }
}

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a text file from the project. Paths are relative to the project root. Supports line offset/limit for large files."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path of the file, relative to the project root"
                },
                "offset": {
                    "type": "number",
                    "description": "The line number to start reading from (1-indexed)"
                },
                "limit": {
                    "type": "number",
                    "description": "The number of lines to read"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let path = match validate_path(&params.path, &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return e,
        };

        if !path.is_file() {
            return ToolResult::error(format!("Path is not a file: {}", params.path));
        }

        let content = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => return ToolResult::error(format!("Failed to read file: {}", e)),
        };

        let check_len = content.len().min(8192);
        if content[..check_len].contains(&0) {
            return ToolResult::success(format!(
                "Binary file: {} ({})",
                params.path,
                human_size(content.len())
            ));
        }

        let content = match String::from_utf8(content) {
            Ok(s) => s,
            Err(e) => return ToolResult::error(format!("File is not valid UTF-8: {}", e)),
        };

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        if total_lines == 0 {
            return ToolResult::success("");
        }

        let start = params.offset.unwrap_or(1).saturating_sub(1);
        let limit = params.limit.unwrap_or(DEFAULT_LINE_LIMIT).max(1);
        if start >= total_lines {
            return ToolResult::error(format!(
                "Start line {} is beyond file length ({})",
                start + 1,
                total_lines
            ));
        }
        let end = start.saturating_add(limit).min(total_lines);

        let suffix = if end < total_lines {
            format!("\n[Showing lines {}-{} of {}]", start + 1, end, total_lines)
        } else {
            String::new()
        };

        let window = lines[start..end].join("\n");
        let budget = MAX_TOOL_TEXT_CHARS.saturating_sub(suffix.chars().count());
        let mut output = truncate_head_to_fit(&window, budget);
        output.push_str(&suffix);

        ToolResult::success(output)
    }
}
