//! GIPHY response bodies and their conversion into core [`Page`]s.

use std::collections::BTreeMap;

use gifgrid::{Item, Page, Pagination, Rendition};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<WireGif>,
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    pagination: Option<WirePagination>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default = "ok_status")]
    status: u16,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    response_id: String,
}

fn ok_status() -> u16 {
    200
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    count: u64,
    #[serde(default)]
    offset: u64,
}

#[derive(Debug, Deserialize)]
struct WireGif {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    images: BTreeMap<String, WireImage>,
}

#[derive(Debug, Deserialize)]
struct WireImage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    webp: Option<String>,
    #[serde(default)]
    mp4: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    width: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    height: u32,
}

/// Error bodies come either in the envelope shape or as a bare `{"message": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    meta: Option<Meta>,
    #[serde(default)]
    message: Option<String>,
}

/// Dimensions arrive as decimal strings; numbers are accepted too. Anything else is 0.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        _ => 0,
    })
}

impl WireGif {
    fn into_item(self) -> Item {
        let mut item = Item::new(self.id, self.title);
        for (name, image) in self.images {
            let variants = [
                ("image/gif", image.url),
                ("image/webp", image.webp),
                ("video/mp4", image.mp4),
            ];
            for (mime, url) in variants {
                let Some(url) = url.filter(|u| !u.is_empty()) else {
                    continue;
                };
                item.renditions.push(Rendition::new(
                    name.as_str(),
                    url,
                    mime,
                    image.width,
                    image.height,
                ));
            }
        }
        item
    }
}

/// Decodes a successful response body into a [`Page`].
///
/// `requested_offset` stands in for a missing `pagination` block, in which case the page is
/// reported as the last one.
pub fn parse_page(body: &[u8], requested_offset: u64) -> Result<Page> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    if let Some(meta) = &envelope.meta {
        if !(200..300).contains(&meta.status) {
            return Err(ClientError::Api {
                status: meta.status,
                message: meta.msg.clone(),
            });
        }
        tracing::trace!(response_id = %meta.response_id, items = envelope.data.len(), "parse_page");
    }

    let items: Vec<Item> = envelope.data.into_iter().map(WireGif::into_item).collect();
    let pagination = match envelope.pagination {
        Some(p) => Pagination {
            offset: p.offset,
            count: p.count,
            total_count: p.total_count,
        },
        None => {
            let count = items.len() as u64;
            Pagination {
                offset: requested_offset,
                count,
                total_count: requested_offset + count,
            }
        }
    };
    Ok(Page::new(items, pagination))
}

/// Builds the error for a non-success HTTP response, using the body's message when present.
pub fn api_error(status: u16, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| {
            b.meta
                .map(|m| m.msg)
                .filter(|m| !m.is_empty())
                .or(b.message)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_owned());
    ClientError::Api { status, message }
}
