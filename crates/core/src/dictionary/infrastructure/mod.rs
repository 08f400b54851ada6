pub mod cmu_dictionary_file;
