use super::dictionary_error::DictionaryError;
use super::pronunciation_dictionary::Pronunciation;

pub const CONSONANTS: &[&str] = &[
    "B", "CH", "D", "DH", "F", "G", "HH", "JH", "K", "L", "M", "N", "NG", "P", "R", "S", "SH", "T",
    "TH", "V", "W", "Y", "Z", "ZH",
];

pub const VOWELS: &[&str] = &[
    "AA", "AE", "AH", "AO", "AW", "AY", "EH", "ER", "EY", "IH", "IY", "OW", "OY", "UH", "UW",
];

const STRESS_DIGITS: &[char] = &['0', '1', '2'];

/// Validate a space-separated ARPAbet transcription and return its phones,
/// upper-cased.
pub fn check_transcription(transcription: &str) -> Result<Pronunciation, DictionaryError> {
    let trimmed = transcription.trim();
    let phones: Pronunciation = trimmed
        .to_uppercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    // a single phone is at most three characters long
    if trimmed.len() > 3 && phones.len() < 2 {
        return Err(DictionaryError::MissingSpaces {
            transcription: trimmed.to_string(),
        });
    }

    for (index, phone) in phones.iter().enumerate() {
        check_phone(phone, trimmed, index)?;
    }
    Ok(phones)
}

/// Check that one phone belongs to the ARPAbet: a consonant, or a vowel
/// followed by a stress digit.
pub fn check_phone(phone: &str, transcription: &str, index: usize) -> Result<(), DictionaryError> {
    let position = index + 1;
    let chars: Vec<char> = phone.chars().collect();

    if chars.len() == 3 {
        let stress = chars[2];
        let vowel: String = chars[..2].iter().collect();
        if !STRESS_DIGITS.contains(&stress) {
            return Err(DictionaryError::UnknownStress {
                stress,
                phone: phone.to_string(),
                transcription: transcription.to_string(),
            });
        }
        if !VOWELS.contains(&vowel.as_str()) {
            return Err(DictionaryError::UnknownPhone {
                phone: vowel,
                position,
                transcription: transcription.to_string(),
            });
        }
        return Ok(());
    }

    if chars.len() <= 2 {
        if VOWELS.contains(&phone) {
            return Err(DictionaryError::MissingStress {
                vowel: phone.to_string(),
                position,
                transcription: transcription.to_string(),
            });
        }
        if CONSONANTS.contains(&phone) {
            return Ok(());
        }
    }

    Err(DictionaryError::UnknownPhone {
        phone: phone.to_string(),
        position,
        transcription: transcription.to_string(),
    })
}
