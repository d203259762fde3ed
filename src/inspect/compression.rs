//! Transparent decompression for schema input files.

use std::io::Read;
use std::path::Path;

/// Compression format detected from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Detect compression format from file extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("bz2" | "bzip2") => Compression::Bzip2,
            Some("xz" | "lzma") => Compression::Xz,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }

    /// Wrap a reader with the appropriate decompressor
    pub fn wrap_reader<'a>(&self, reader: Box<dyn Read + 'a>) -> std::io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Compression::None => reader,
            Compression::Gzip => Box::new(flate2::read::GzDecoder::new(reader)),
            Compression::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
            Compression::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::new(reader)?),
        })
    }
}

impl std::fmt::Display for Compression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Bzip2 => write!(f, "bzip2"),
            Compression::Xz => write!(f, "xz"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

/// File name without its compression extension, e.g. `dumps/schema.sql.gz` -> `schema.sql`
pub fn strip_compression_ext(path: &Path) -> &Path {
    match Compression::from_path(path) {
        Compression::None => path,
        _ => path.file_stem().map(Path::new).unwrap_or(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_from_path() {
        assert_eq!(Compression::from_path(Path::new("a.sql.gz")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.sql.ZST")), Compression::Zstd);
        assert_eq!(Compression::from_path(Path::new("a.sql")), Compression::None);
    }

    #[test]
    fn test_gzip_round_trip_through_reader() {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"CREATE TABLE t (id INT);").unwrap();
        let bytes = encoder.finish().unwrap();

        let mut reader = Compression::Gzip
            .wrap_reader(Box::new(std::io::Cursor::new(bytes)))
            .unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text, "CREATE TABLE t (id INT);");
    }

    #[test]
    fn test_strip_compression_ext() {
        assert_eq!(strip_compression_ext(Path::new("dump.sql.gz")), Path::new("dump.sql"));
        assert_eq!(strip_compression_ext(Path::new("dump.sql")), Path::new("dump.sql"));
    }
}
