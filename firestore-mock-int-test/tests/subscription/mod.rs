mod document_listener_test;
mod query_listener_test;
