pub mod tab_transcript_reader;
