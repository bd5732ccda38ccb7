//! REST client for the global tagging service.

use serde::Deserialize;

use super::context::StratusContext;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    items: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

/// Client for the global tagging service.
#[derive(Debug, Clone)]
pub struct TagsClient {
    ctx: StratusContext,
    base: String,
}

impl TagsClient {
    pub fn new(ctx: &StratusContext) -> Self {
        let base = ctx.tags_endpoint();
        Self {
            ctx: ctx.clone(),
            base,
        }
    }

    /// Names of the tags attached to the entity identified by `crn`.
    pub async fn attached_tags(&self, crn: &str) -> Result<Vec<String>, ApiError> {
        let query = [("attached_to", crn.to_string())];
        let list: TagList = self
            .ctx
            .get_json(&format!("{}/tags", self.base), &query)
            .await?;
        Ok(list.items.into_iter().map(|tag| tag.name).collect())
    }
}
