//! JSON deck renderer.
//!
//! Lays a deck out into pages and saves the result as a JSON document that
//! the follower front end displays page by page. Each item expands into one
//! page per content block, in the item's `order` when one is given.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::deck::{DeckItem, DeckRequest};
use crate::domain::foundation::AuthenticatedUser;
use crate::ports::{DeckRenderer, FileStore, RenderError, RenderedDeck};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderedDocument<'a> {
    date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a str>,
    options: RenderOptions<'a>,
    pages: Vec<Page<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions<'a> {
    hints: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    ratio: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertical_align: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Page<'a> {
    item: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Renders decks to `{uuid}.json` through a [`FileStore`].
#[derive(Clone)]
pub struct JsonDeckRenderer {
    files: Arc<dyn FileStore>,
}

impl JsonDeckRenderer {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }
}

fn item_pages<'a>(item: &'a DeckItem) -> Result<Vec<Page<'a>>, RenderError> {
    if item.contents.is_empty() {
        return Ok(vec![Page {
            item: &item.id,
            kind: &item.kind,
            text: None,
        }]);
    }

    let page = |text: &'a String| Page {
        item: &item.id,
        kind: &item.kind,
        text: Some(text.as_str()),
    };

    if item.order.is_empty() {
        return Ok(item.contents.iter().map(page).collect());
    }

    item.order
        .iter()
        .map(|&index| {
            item.contents.get(index as usize).map(page).ok_or_else(|| {
                RenderError::InvalidDeck(format!(
                    "item {:?} orders block {} but has {}",
                    item.id,
                    index,
                    item.contents.len()
                ))
            })
        })
        .collect()
}

fn layout(deck: &DeckRequest) -> Result<Vec<Page<'_>>, RenderError> {
    let mut pages = Vec::new();
    if deck.contents {
        pages.extend(deck.items.iter().map(|item| Page {
            item: &item.id,
            kind: "CONTENTS",
            text: None,
        }));
    }
    for item in &deck.items {
        pages.extend(item_pages(item)?);
    }
    Ok(pages)
}

#[async_trait]
impl DeckRenderer for JsonDeckRenderer {
    async fn render(
        &self,
        deck: &DeckRequest,
        user: Option<&AuthenticatedUser>,
    ) -> Result<RenderedDeck, RenderError> {
        let document = RenderedDocument {
            date: &deck.date,
            author: user.map(AuthenticatedUser::label),
            options: RenderOptions {
                hints: deck.hints,
                ratio: deck.ratio.as_deref(),
                font_size: deck.font_size,
                vertical_align: deck.vertical_align.as_deref(),
                format: deck.format.as_deref(),
            },
            pages: layout(deck)?,
        };
        let bytes =
            serde_json::to_vec(&document).map_err(|e| RenderError::Failed(e.to_string()))?;

        let file_name = format!("{}.json", Uuid::new_v4());
        self.files.save(&file_name, bytes).await?;

        tracing::debug!(file_name = %file_name, pages = document.pages.len(), "Rendered deck");
        Ok(RenderedDeck {
            url: self.files.public_url(&file_name),
            file_name,
        })
    }
}

impl std::fmt::Debug for JsonDeckRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDeckRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryFileStore;
    use crate::domain::foundation::UserId;
    use serde_json::Value;

    fn item(id: &str, contents: &[&str], order: &[u32]) -> DeckItem {
        DeckItem {
            id: id.to_string(),
            kind: "SONG".to_string(),
            contents: contents.iter().map(|s| s.to_string()).collect(),
            order: order.to_vec(),
        }
    }

    fn deck(items: Vec<DeckItem>) -> DeckRequest {
        DeckRequest {
            date: "2024-03-17".to_string(),
            items,
            hints: false,
            ratio: None,
            font_size: Some(42),
            vertical_align: None,
            format: None,
            contents: false,
        }
    }

    async fn render(deck: &DeckRequest) -> (Result<RenderedDeck, RenderError>, InMemoryFileStore) {
        let files = InMemoryFileStore::new("http://localhost/public");
        let renderer = JsonDeckRenderer::new(Arc::new(files.clone()));
        let user = AuthenticatedUser::new(UserId::new("u1").unwrap(), None, Some("Anna".into()));
        (renderer.render(deck, Some(&user)).await, files)
    }

    #[tokio::test]
    async fn saves_document_and_returns_public_url() {
        let (rendered, files) = render(&deck(vec![item("s1", &["v1", "v2"], &[])])).await;
        let rendered = rendered.unwrap();

        assert!(rendered.file_name.ends_with(".json"));
        assert_eq!(
            rendered.url,
            format!("http://localhost/public/{}", rendered.file_name)
        );

        let doc: Value = serde_json::from_slice(&files.get(&rendered.file_name).await.unwrap()).unwrap();
        assert_eq!(doc["author"], "Anna");
        assert_eq!(doc["options"]["fontSize"], 42);
        assert_eq!(doc["pages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn order_selects_and_repeats_blocks() {
        let song = item("s1", &["verse", "chorus"], &[0, 1, 1]);
        let texts: Vec<_> = item_pages(&song)
            .unwrap()
            .into_iter()
            .map(|p| p.text.unwrap())
            .collect();
        assert_eq!(texts, vec!["verse", "chorus", "chorus"]);
    }

    #[test]
    fn contents_flag_prepends_overview() {
        let mut d = deck(vec![item("a", &[], &[]), item("b", &[], &[])]);
        d.contents = true;
        let pages = layout(&d).unwrap();
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].kind, "CONTENTS");
    }

    #[tokio::test]
    async fn out_of_range_order_is_invalid_and_saves_nothing() {
        let (rendered, files) = render(&deck(vec![item("s1", &["v1"], &[3])])).await;

        assert!(matches!(rendered, Err(RenderError::InvalidDeck(_))));
        assert_eq!(files.file_count().await, 0);
    }
}
