pub mod arpabet;
pub mod dictionary_checker;
pub mod dictionary_error;
pub mod pronunciation_dictionary;
