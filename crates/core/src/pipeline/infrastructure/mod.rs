pub mod threaded_alignment_executor;
