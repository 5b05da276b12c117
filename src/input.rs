use crate::freq::is_cjk;
use encoding_rs::{Encoding, BIG5, GB18030, GBK, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// How much of the file feeds the detector. Large enough that a truncated
// multi-byte sequence at the cut barely moves the score.
const SNIFF_LIMIT: usize = 100 * 1024;

/// Picks an encoding for raw book bytes: BOMs win outright, otherwise the
/// candidate whose trial decode of the leading bytes has the fewest
/// replacement characters and the highest CJK ratio. UTF-8 is the fallback
/// when nothing scores acceptably.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return UTF_8;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return UTF_16LE;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return UTF_16BE;
    }

    let sample = &bytes[..bytes.len().min(SNIFF_LIMIT)];
    let candidates: [&'static Encoding; 4] = [UTF_8, GBK, GB18030, BIG5];

    let mut best = UTF_8;
    let mut best_score = -1.0f64;

    for encoding in candidates {
        let (text, _, _) = encoding.decode(sample);
        let total = text.chars().count();
        if total == 0 {
            continue;
        }
        let replaced = text.chars().filter(|&c| c == '\u{FFFD}').count();
        let cjk = text.chars().filter(|&c| is_cjk(c)).count();
        let success = (total - replaced) as f64 / total as f64;
        let cjk_ratio = cjk as f64 / total as f64;
        let score = success * 0.6 + cjk_ratio * 0.4;

        if success > 0.95 && score > best_score {
            best = encoding;
            best_score = score;
        }
    }

    best
}

/// Reads a book file, detecting the encoding and decoding lossily (bad
/// sequences become U+FFFD, which the frequency counter ignores). Returns
/// the text and the encoding it was decoded with.
pub fn read_book(path: &Path) -> io::Result<(String, &'static Encoding)> {
    let bytes = fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    let (text, _, _) = encoding.decode(&bytes);
    Ok((text.into_owned(), encoding))
}

// Reference-list assets that may sit next to the books.
const EXCLUDED_FILES: [&str; 3] = ["dict.txt", "dict_simple.txt", "前1500.txt"];

/// Lists the `.txt` book files in a directory, skipping dictionary assets.
/// Sorted by file name for a stable processing order.
pub fn find_book_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "txt") {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if EXCLUDED_FILES.contains(&name.as_str()) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}
