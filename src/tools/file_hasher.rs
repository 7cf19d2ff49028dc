use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

/// 內容雜湊長度（128 bit）
pub const CONTENT_HASH_BYTES: usize = 16;

/// 檔案大小與內容雜湊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub size_bytes: u64,
    pub content_hash: String,
}

/// 讀取磁碟上的檔案，計算大小與 128-bit BLAKE3 雜湊
pub fn digest_file(path: &Path) -> io::Result<FileDigest> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut size_bytes = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        size_bytes += bytes_read as u64;
    }

    Ok(FileDigest {
        size_bytes,
        content_hash: finalize_hex(&hasher),
    })
}

/// 計算記憶體內資料的內容雜湊，與 [`digest_file`] 的結果一致
#[must_use]
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(data);
    finalize_hex(&hasher)
}

fn finalize_hex(hasher: &blake3::Hasher) -> String {
    let mut digest = [0u8; CONTENT_HASH_BYTES];
    hasher.finalize_xof().fill(&mut digest);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
