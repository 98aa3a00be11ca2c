use crate::Result;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Function name under which a granted lookup is offered to a model.
pub const SEARCH_TOOL_NAME: &str = "google_search";

/// Web lookup port: a query in, search results as plain text out.
#[async_trait]
pub trait WebLookup: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, query: &str) -> Result<String>;
}

/// Function declaration describing a granted lookup to tool-calling models.
pub fn search_tool_declaration() -> Value {
    json!({
        "name": SEARCH_TOOL_NAME,
        "description": "Performs a Google search to retrieve information from the web.",
        "parameters": {
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query."
                }
            },
            "required": ["query"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_requires_query() {
        let decl = search_tool_declaration();
        assert_eq!(decl["name"], SEARCH_TOOL_NAME);
        assert_eq!(decl["parameters"]["required"], json!(["query"]));
    }
}
