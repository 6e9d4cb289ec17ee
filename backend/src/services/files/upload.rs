use crate::error::ServiceError;
use crate::files::FileFormat;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use md5::Context;

const FILE_FIELD: &str = "file";

/// The `file` part of a multipart request, read into memory.
pub(crate) struct Upload {
    pub file_name: String,
    pub format: FileFormat,
    pub bytes: Vec<u8>,
    /// Hex MD5 of `bytes`, used to recognize a file that was already
    /// processed.
    pub md5: String,
}

/// Reads the `file` part of `payload`. Other parts are skipped.
///
/// - Fails with `Parse(Unsupported)` before reading the body when the file
///   name is not `.csv` or `.xlsx`.
/// - Fails with `FileTooLarge` as soon as more than `max_bytes` arrive.
pub(crate) async fn read_upload(
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<Upload, ServiceError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ServiceError::Upload(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if name.as_deref() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .filter(|f| !f.trim().is_empty())
            .ok_or(ServiceError::MissingFile)?;
        let format = FileFormat::from_file_name(&file_name)?;

        let mut bytes = Vec::new();
        let mut hasher = Context::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ServiceError::Upload(e.to_string()))?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ServiceError::FileTooLarge(max_bytes));
            }
            hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Upload {
            file_name,
            format,
            bytes,
            md5: format!("{:x}", hasher.finalize()),
        });
    }

    Err(ServiceError::MissingFile)
}
