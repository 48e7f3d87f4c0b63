use async_trait::async_trait;
use chrono::Local;

use super::{Tool, ToolResult, ToolSpec};

/// `current_time()`: local date and time
pub struct CurrentTimeTool {
    spec: ToolSpec,
}

impl CurrentTimeTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "current_time",
                &[],
                "Get the current local date and time",
                "ToolUsage: current_time()",
            ),
        }
    }
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn invoke(&self, _args: &[String]) -> ToolResult {
        Ok(Local::now().format("%Y-%m-%d %H:%M:%S (%A)").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_time_format() {
        let out = CurrentTimeTool::new().invoke(&[]).await.unwrap();
        // 2024-01-31 09:05:00 (Wednesday)
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[10..11], " ");
        assert!(out.ends_with("day)"));
    }
}
