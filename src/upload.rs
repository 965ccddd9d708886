//! Upload files and ordered image batches
//!
//! A conversation can be submitted as one file (screenshot, audio recording or
//! text export) or as a batch of up to four screenshots. The batch order is the
//! reading order of the conversation and can be rearranged before sending.

use std::path::Path;
use thiserror::Error;

/// Maximum number of images in one batch
pub const MAX_BATCH_FILES: usize = 4;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "ogg", "aac"];
const TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("At most {max} files can be analyzed together")]
    TooManyFiles { max: usize },

    #[error("No files to upload")]
    Empty,

    #[error("Unsupported file type: {name}")]
    Unsupported { name: String },

    #[error("Only images can be combined into a batch: {name}")]
    NotAnImage { name: String },

    #[error("No file at position {index} (batch has {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the backend will do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Screenshot, read with OCR
    Image,
    /// Recording, transcribed
    Audio,
    /// Plain text export
    Text,
}

impl FileKind {
    /// Detect by extension, then by MIME type
    pub fn detect(name: &str, mime: &str) -> Option<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) || mime.starts_with("image/") {
            Some(FileKind::Image)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) || mime.starts_with("audio/") {
            Some(FileKind::Audio)
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) || mime.starts_with("text/") {
            Some(FileKind::Text)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Audio => "audio",
            FileKind::Text => "text",
        }
    }
}

/// A file ready to be sent as a multipart part
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    name: String,
    mime: String,
    kind: FileKind,
    bytes: Vec<u8>,
}

impl UploadFile {
    /// Wrap in-memory bytes; the MIME type is guessed from the name
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let kind = FileKind::detect(&name, &mime)
            .ok_or_else(|| UploadError::Unsupported { name: name.clone() })?;

        Ok(Self {
            name,
            mime,
            kind,
            bytes,
        })
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        // Reject before reading a potentially large file
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if FileKind::detect(&name, mime.essence_str()).is_none() {
            return Err(UploadError::Unsupported { name });
        }

        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(name, bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Ordered set of up to [`MAX_BATCH_FILES`] screenshots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadBatch {
    files: Vec<UploadFile>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a screenshot at the end of the reading order
    pub fn push(&mut self, file: UploadFile) -> Result<(), UploadError> {
        if file.kind != FileKind::Image {
            return Err(UploadError::NotAnImage { name: file.name });
        }
        if self.files.len() >= MAX_BATCH_FILES {
            return Err(UploadError::TooManyFiles {
                max: MAX_BATCH_FILES,
            });
        }
        self.files.push(file);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<UploadFile, UploadError> {
        self.check_index(index)?;
        Ok(self.files.remove(index))
    }

    /// Move the file at `from` so it ends up at position `to`
    pub fn move_file(&mut self, from: usize, to: usize) -> Result<(), UploadError> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from != to {
            let file = self.files.remove(from);
            self.files.insert(to, file);
        }
        Ok(())
    }

    pub fn files(&self) -> &[UploadFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.files.len() >= MAX_BATCH_FILES
    }

    /// Names in reading order
    pub fn order(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), UploadError> {
        if index >= self.files.len() {
            return Err(UploadError::OutOfRange {
                index,
                len: self.files.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<UploadFile>> for UploadBatch {
    type Error = UploadError;

    fn try_from(files: Vec<UploadFile>) -> Result<Self, Self::Error> {
        if files.is_empty() {
            return Err(UploadError::Empty);
        }
        let mut batch = UploadBatch::new();
        for file in files {
            batch.push(file)?;
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> UploadFile {
        UploadFile::from_bytes(name, vec![0x89, b'P', b'N', b'G']).unwrap()
    }

    #[test]
    fn test_kind_detection() {
        assert_eq!(FileKind::detect("chat.PNG", ""), Some(FileKind::Image));
        assert_eq!(FileKind::detect("voice.m4a", ""), Some(FileKind::Audio));
        assert_eq!(FileKind::detect("export.txt", ""), Some(FileKind::Text));
        assert_eq!(FileKind::detect("blob", "image/heic"), Some(FileKind::Image));
        assert_eq!(FileKind::detect("report.pdf", "application/pdf"), None);
    }

    #[test]
    fn test_from_bytes_guesses_mime() {
        let file = png("one.png");
        assert_eq!(file.mime(), "image/png");
        assert_eq!(file.kind(), FileKind::Image);
        assert_eq!(file.len(), 4);

        assert!(matches!(
            UploadFile::from_bytes("slides.pdf", vec![1]),
            Err(UploadError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_batch_rejects_fifth_file() {
        let mut batch = UploadBatch::new();
        for i in 0..MAX_BATCH_FILES {
            batch.push(png(&format!("{i}.png"))).unwrap();
        }
        assert!(batch.is_full());
        assert!(matches!(
            batch.push(png("extra.png")),
            Err(UploadError::TooManyFiles { max: 4 })
        ));
    }

    #[test]
    fn test_batch_rejects_non_images() {
        let mut batch = UploadBatch::new();
        let audio = UploadFile::from_bytes("voice.mp3", vec![1, 2]).unwrap();
        assert!(matches!(batch.push(audio), Err(UploadError::NotAnImage { .. })));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_reorder_keeps_every_file() {
        let mut batch =
            UploadBatch::try_from(vec![png("a.png"), png("b.png"), png("c.png")]).unwrap();

        batch.move_file(0, 2).unwrap();
        assert_eq!(batch.order(), vec!["b.png", "c.png", "a.png"]);

        batch.move_file(2, 0).unwrap();
        assert_eq!(batch.order(), vec!["a.png", "b.png", "c.png"]);

        assert!(matches!(
            batch.move_file(0, 3),
            Err(UploadError::OutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_remove_and_empty_batch() {
        let mut batch = UploadBatch::try_from(vec![png("a.png"), png("b.png")]).unwrap();
        let removed = batch.remove(0).unwrap();
        assert_eq!(removed.name(), "a.png");
        assert_eq!(batch.order(), vec!["b.png"]);

        assert!(matches!(
            UploadBatch::try_from(Vec::new()),
            Err(UploadError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chat.txt");
        std::fs::write(&path, "Alice: hi\nBob: hello").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "chat.txt");
        assert_eq!(file.kind(), FileKind::Text);

        let missing = UploadFile::from_path(dir.path().join("gone.png")).await;
        assert!(matches!(missing, Err(UploadError::Io(_))));
    }
}
