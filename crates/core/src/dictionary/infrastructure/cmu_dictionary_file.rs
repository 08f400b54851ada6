use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dictionary::domain::arpabet::check_transcription;
use crate::dictionary::domain::dictionary_checker::DictionaryMiss;
use crate::dictionary::domain::dictionary_error::DictionaryError;
use crate::dictionary::domain::pronunciation_dictionary::PronunciationDictionary;

/// File collecting every imported or prompted entry, kept next to the output.
pub const ADDITIONS_FILE_NAME: &str = "added_dict_entries.txt";

const COMMENT_PREFIX: &str = ";;;";

/// Read a CMU-style dictionary (`WORD  PH1 PH2 ...`, Latin-1 encoded).
pub fn read_dictionary(path: &Path) -> Result<PronunciationDictionary, DictionaryError> {
    log::info!("Reading dictionary {}", path.display());
    let bytes = fs::read(path).map_err(|e| DictionaryError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let dictionary = parse_dictionary(&decode_latin1(&bytes));
    if dictionary.is_empty() {
        log::warn!("Dictionary {} is empty", path.display());
    }
    Ok(dictionary)
}

pub fn parse_dictionary(contents: &str) -> PronunciationDictionary {
    let mut dictionary = PronunciationDictionary::new();
    for line in contents.lines() {
        if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let phones: Vec<String> = fields.map(str::to_string).collect();
        if phones.is_empty() {
            log::debug!("Dictionary entry '{word}' has no phones, skipping");
            continue;
        }
        dictionary.add(word, phones);
    }
    dictionary
}

/// Write one `WORD  PH1 PH2` line per pronunciation, sorted by word.
pub fn write_dictionary(
    path: &Path,
    dictionary: &PronunciationDictionary,
) -> Result<(), DictionaryError> {
    let mut out = String::new();
    for (word, prons) in dictionary.iter() {
        if !is_latin1(word) {
            return Err(DictionaryError::NotLatin1 {
                path: path.to_path_buf(),
                word: word.to_string(),
            });
        }
        for pron in prons {
            out.push_str(word);
            out.push_str("  ");
            out.push_str(&pron.join(" "));
            out.push('\n');
        }
    }
    fs::write(path, encode_latin1(&out)).map_err(|e| DictionaryError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::debug!(
        "Wrote {} dictionary entries to {}",
        dictionary.len(),
        path.display()
    );
    Ok(())
}

/// Read user-supplied entries: `WORD<TAB>PH PH, ALT PH PH` per line.
/// Every pronunciation is validated against the ARPAbet.
pub fn read_import_file(path: &Path) -> Result<PronunciationDictionary, DictionaryError> {
    let contents = fs::read_to_string(path).map_err(|e| DictionaryError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut dictionary = PronunciationDictionary::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let malformed = || DictionaryError::MalformedEntry {
            path: path.to_path_buf(),
            line: index + 1,
            text: line.to_string(),
        };

        let mut columns = line.trim().split('\t');
        let word = columns.next().map(str::trim).unwrap_or_default();
        let transcriptions = columns.next().ok_or_else(malformed)?;
        if word.is_empty() {
            return Err(malformed());
        }

        for transcription in transcriptions.replace('"', "").split(',') {
            if transcription.trim().is_empty() {
                continue;
            }
            dictionary.add(word, check_transcription(transcription)?);
        }
    }

    log::info!(
        "Imported {} dictionary entries from {}",
        dictionary.len(),
        path.display()
    );
    Ok(dictionary)
}

/// Merge `additions` into the additions file in `dir`, creating it if needed.
pub fn record_additions(
    dir: &Path,
    additions: &PronunciationDictionary,
) -> Result<(), DictionaryError> {
    if additions.is_empty() {
        return Ok(());
    }
    let path = dir.join(ADDITIONS_FILE_NAME);
    let mut recorded = if path.exists() {
        read_dictionary(&path)?
    } else {
        PronunciationDictionary::new()
    };
    let added = recorded.merge(additions);
    write_dictionary(&path, &recorded)?;
    log::info!("Recorded {added} new entries in {}", path.display());
    Ok(())
}

/// Write the unknown-word report for a transcript check, one line per
/// distinct word: `WORD<TAB><TAB>CLUE<TAB>TEXT`.
pub fn write_unknown_words(path: &Path, misses: &[DictionaryMiss]) -> Result<(), DictionaryError> {
    let mut seen = HashSet::new();
    let mut out = String::new();
    for miss in misses {
        if !seen.insert(miss.word.as_str()) {
            continue;
        }
        out.push_str(&format!(
            "{}\t\t{}\t{}\n",
            miss.word,
            miss.clue.as_deref().unwrap_or_default(),
            miss.text
        ));
    }
    fs::write(path, out).map_err(|e| DictionaryError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!(
        "Wrote {} unknown word(s) to {}",
        seen.len(),
        path.display()
    );
    Ok(())
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xFF)
}

/// Callers check `is_latin1` first.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .filter_map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CMU_EXCERPT: &str = "\
;;; excerpt
TEST  T EH1 S T
TEST'S  T EH1 S T S
TESTA  T EH1 S T AH0

TESTERS  T EH1 S T ER0 Z
TESTERS  T EH1 S T AH0 Z
";

    #[test]
    fn test_parse_dictionary_groups_pronunciations() {
        let dict = parse_dictionary(CMU_EXCERPT);
        assert_eq!(dict.len(), 4);
        assert_eq!(dict.lookup("TESTERS").unwrap().len(), 2);
        assert_eq!(dict.lookup("TEST'S").unwrap()[0], vec!["T", "EH1", "S", "T", "S"]);
    }

    #[test]
    fn test_read_dictionary_decodes_latin1() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dict");
        fs::write(&path, b"CAF\xc9  K AE0 F EY1\n").unwrap();

        let dict = read_dictionary(&path).unwrap();
        assert!(dict.contains("CAF\u{c9}"));
    }

    #[test]
    fn test_read_missing_dictionary_is_read_error() {
        let err = read_dictionary(Path::new("/nonexistent/dict")).unwrap_err();
        assert!(matches!(err, DictionaryError::Read { .. }));
    }

    #[test]
    fn test_write_then_read_preserves_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dict");
        let dict = parse_dictionary(CMU_EXCERPT);

        write_dictionary(&path, &dict).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("TEST  T EH1 S T\n"));
        assert_eq!(read_dictionary(&path).unwrap(), dict);
    }

    #[test]
    fn test_word_outside_latin1_is_not_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dict");
        let mut dict = parse_dictionary(CMU_EXCERPT);
        dict.add("ŁÓDŹ", vec!["W".to_string(), "UW1".to_string(), "CH".to_string()]);

        match write_dictionary(&path, &dict) {
            Err(DictionaryError::NotLatin1 { word, .. }) => assert_eq!(word, "ŁÓDŹ"),
            other => panic!("expected encoding error, got {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_read_import_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new_words.txt");
        fs::write(
            &path,
            "linguistics\tL IH0 NG G W IH1 S T IH0 K S \ngonna\t\"G AA1 N AH0, G AH1 N AH0\"\n",
        )
        .unwrap();

        let dict = read_import_file(&path).unwrap();
        assert_eq!(dict.lookup("LINGUISTICS").unwrap().len(), 1);
        assert_eq!(dict.lookup("GONNA").unwrap().len(), 2);
    }

    #[test]
    fn test_read_import_file_without_tab_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new_words.txt");
        fs::write(&path, "\nLINGUISTICS L IH0 NG\n").unwrap();

        match read_import_file(&path) {
            Err(DictionaryError::MalformedEntry { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed entry, got {other:?}"),
        }
    }

    #[test]
    fn test_read_import_file_rejects_bad_phone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("new_words.txt");
        fs::write(&path, "FOO\tF UW\n").unwrap();

        assert!(matches!(
            read_import_file(&path),
            Err(DictionaryError::MissingStress { .. })
        ));
    }

    #[test]
    fn test_record_additions_merges_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(ADDITIONS_FILE_NAME), "OLD  OW1 L D\n").unwrap();
        let additions = parse_dictionary("LINGUISTICS  L IH0 NG G W IH1 S T IH0 K S\n");

        record_additions(tmp.path(), &additions).unwrap();

        let recorded = read_dictionary(&tmp.path().join(ADDITIONS_FILE_NAME)).unwrap();
        assert!(recorded.contains("OLD"));
        assert!(recorded.contains("LINGUISTICS"));
    }

    #[test]
    fn test_write_unknown_words_lists_each_word_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("unknown.txt");
        let misses = vec![
            DictionaryMiss {
                word: "TRUNC-".to_string(),
                clue: Some("TRUNCATED".to_string()),
                line: 3,
                text: "trunc- +truncated".to_string(),
            },
            DictionaryMiss {
                word: "TRUNC-".to_string(),
                clue: None,
                line: 9,
                text: "trunc-".to_string(),
            },
            DictionaryMiss {
                word: "ZOOM".to_string(),
                clue: None,
                line: 4,
                text: "zoom".to_string(),
            },
        ];

        write_unknown_words(&path, &misses).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "TRUNC-\t\tTRUNCATED\ttrunc- +truncated\nZOOM\t\t\tzoom\n"
        );
    }
}
