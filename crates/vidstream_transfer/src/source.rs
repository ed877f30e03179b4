use std::{
    io::SeekFrom,
    ops::Range,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

#[derive(Debug, Clone)]
enum SourceData {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// The file selected for upload.
#[derive(Debug, Clone)]
pub struct UploadSource {
    file_name: String,
    size: u64,
    content_type: String,
    data: SourceData,
}

impl UploadSource {
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            content_type: guess_content_type(&file_name),
            file_name,
            size: metadata.len(),
            data: SourceData::File(path.to_path_buf()),
        })
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let file_name = file_name.into();
        let bytes: Vec<u8> = bytes.into();
        Self {
            content_type: guess_content_type(&file_name),
            file_name,
            size: bytes.len() as u64,
            data: SourceData::Memory(bytes.into()),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub async fn read_range(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        let len = usize::try_from(range.end.saturating_sub(range.start)).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "chunk too large")
        })?;

        match &self.data {
            SourceData::Memory(bytes) => {
                let start = range.start as usize;
                bytes
                    .get(start..start + len)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::UnexpectedEof,
                            "range beyond end of source",
                        )
                    })
            }
            SourceData::File(path) => {
                let mut file = tokio::fs::File::open(path).await?;
                file.seek(SeekFrom::Start(range.start)).await?;
                let mut buffer = vec![0u8; len];
                file.read_exact(&mut buffer).await?;
                Ok(buffer)
            }
        }
    }
}

fn guess_content_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
        .essence_str()
        .to_string()
}
