use xxhash_rust::xxh3::Xxh3;

use crate::foundation::error::{StoryError, StoryResult};

const XXH3_SEED: u64 = 0x5b0a_7d1e_c3f2_9a41;

/// How a generated asset is produced.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    /// A filled rectangle written as PNG.
    Solid {
        width: u32,
        height: u32,
        rgba: [u8; 4],
    },
    /// A single line of text rasterized to PNG with a font from the resource root.
    Text {
        text: String,
        /// Font file path relative to the resource root.
        font: String,
        size_px: f32,
        #[serde(default = "default_text_rgba")]
        rgba: [u8; 4],
    },
}

fn default_text_rgba() -> [u8; 4] {
    [255, 255, 255, 255]
}

impl AssetSource {
    /// Identity key: a kind tag, a type-specific identifier and canonical parameters.
    pub fn key(&self) -> AssetKey {
        match self {
            Self::Solid {
                width,
                height,
                rgba,
            } => AssetKey::new(
                b'S',
                "solid".to_string(),
                vec![
                    ("width".to_string(), width.to_string()),
                    ("height".to_string(), height.to_string()),
                    ("rgba".to_string(), format!("{rgba:?}")),
                ],
            ),
            Self::Text {
                text,
                font,
                size_px,
                rgba,
            } => AssetKey::new(
                b'T',
                text.clone(),
                vec![
                    ("font".to_string(), font.replace('\\', "/")),
                    ("size_px".to_string(), size_px.to_bits().to_string()),
                    ("rgba".to_string(), format!("{rgba:?}")),
                ],
            ),
        }
    }
}

/// Normalized identity of an asset's content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub kind: u8,
    pub identifier: String,
    /// Parameters sorted by key.
    pub params: Vec<(String, String)>,
}

impl AssetKey {
    /// Build a key with lexicographically sorted `params`.
    pub fn new(kind: u8, identifier: String, mut params: Vec<(String, String)>) -> Self {
        params.sort();
        Self {
            kind,
            identifier,
            params,
        }
    }

    /// Stable content hash as 32 lowercase hex digits.
    pub fn content_hash(&self) -> String {
        let mut h = Xxh3::with_seed(XXH3_SEED);
        h.update(&[self.kind]);
        h.update(self.identifier.as_bytes());
        h.update(&[0]);
        for (k, v) in &self.params {
            h.update(k.as_bytes());
            h.update(&[0]);
            h.update(v.as_bytes());
            h.update(&[0]);
        }
        format!("{:032x}", h.digest128())
    }
}

/// A generated file destined for `path` under the resource root.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Asset {
    /// Destination path relative to the resource root, `/`-separated.
    pub path: String,
    pub source: AssetSource,
    pub content_hash: String,
}

impl Asset {
    /// Fails when `path` is not a valid resource-relative path (see [`normalize_rel_path`]).
    pub fn new(path: impl AsRef<str>, source: AssetSource) -> StoryResult<Self> {
        let path = normalize_rel_path(path.as_ref())?;
        let content_hash = source.key().content_hash();
        Ok(Self {
            path,
            source,
            content_hash,
        })
    }
}

/// Normalize and validate resource-relative paths.
///
/// The result uses `/` separators, drops `.` segments, and rejects absolute paths and parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> StoryResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StoryError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StoryError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StoryError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StoryError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/asset.rs"]
mod tests;
