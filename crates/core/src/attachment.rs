//! Attachment kinds and upload file naming.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length kept from an uploaded file's original name.
pub const MAX_FILE_NAME_LENGTH: usize = 200;

/// Kind of document attached to a claim. Stored as TEXT in `attachments.attachment_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentType {
    DamageImage,
    EstimateDoc,
    OtherDocument,
    UserConfirmDoc,
}

impl AttachmentType {
    pub const ALL: [AttachmentType; 4] = [
        AttachmentType::DamageImage,
        AttachmentType::EstimateDoc,
        AttachmentType::OtherDocument,
        AttachmentType::UserConfirmDoc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentType::DamageImage => "DAMAGE_IMAGE",
            AttachmentType::EstimateDoc => "ESTIMATE_DOC",
            AttachmentType::OtherDocument => "OTHER_DOCUMENT",
            AttachmentType::UserConfirmDoc => "USER_CONFIRM_DOC",
        }
    }

    /// Map a multipart file field name to the attachment kind it carries.
    pub fn from_form_field(name: &str) -> Option<Self> {
        match name {
            "damageFiles" => Some(AttachmentType::DamageImage),
            "estimateFiles" => Some(AttachmentType::EstimateDoc),
            "otherFiles" => Some(AttachmentType::OtherDocument),
            "userConfirmFiles" => Some(AttachmentType::UserConfirmDoc),
            _ => None,
        }
    }
}

impl fmt::Display for AttachmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttachmentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Invalid attachment type '{s}'")))
    }
}

/// Reduce an uploaded file's original name to a safe single path component.
///
/// Directory parts are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// and leading dots are stripped so the result is never hidden or `..`.
/// Returns `None` when nothing usable is left.
pub fn sanitize_file_name(original: &str) -> Option<String> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return None;
    }

    Some(trimmed.chars().take(MAX_FILE_NAME_LENGTH).collect())
}
