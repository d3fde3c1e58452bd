mod document_test;
mod lifecycle_test;
