//! Image attachment encoding
//!
//! Files are read fully into memory and base64 encoded before they are
//! attached to a chat turn. The only check is the one a file picker with an
//! `image/*` filter would do: the guessed MIME type must be an image.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};
use crate::state::ImageAttachment;

impl ImageAttachment {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Approximate size of the decoded image in bytes.
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }
}

/// Guess an image MIME type from the file extension.
pub fn image_mime_type(path: &Path) -> Option<String> {
    let mime = mime_guess::from_path(path).first()?;
    if mime.type_() == mime_guess::mime::IMAGE {
        Some(mime.essence_str().to_string())
    } else {
        None
    }
}

/// Read an image file and encode it for inclusion in a request.
pub async fn encode_file(path: &Path) -> Result<ImageAttachment> {
    let mime_type = image_mime_type(path).ok_or_else(|| {
        Error::attachment(format!("{} is not an image file", path.display()))
    })?;

    let bytes = tokio::fs::read(path).await?;
    tracing::debug!(
        path = %path.display(),
        mime = %mime_type,
        bytes = bytes.len(),
        "encoded image attachment"
    );
    Ok(ImageAttachment::from_bytes(mime_type, &bytes))
}
